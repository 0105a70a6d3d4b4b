use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use prodscrape::WebScraper;
use prodscrape::cleaner::CleanPolicy;
use prodscrape::pipeline::{AnalysisOptions, run_analysis, run_scrape};

#[derive(Parser)]
#[command(name = "prodscrape")]
#[command(about = "A product listing scraper and price analyser", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the product page, extract every listing and save them as a table
    Scrape {
        #[arg(long, default_value = prodscrape::BASE_URL, help = "Page to scrape")]
        url: String,

        #[arg(
            long,
            default_value = prodscrape::RAW_PRODUCTS_PATH,
            help = "Where to write the scraped table (.csv or .xlsx)"
        )]
        output: PathBuf,

        #[arg(
            short = 'o',
            long = "format",
            value_enum,
            default_value = "text",
            help = "Console output format"
        )]
        format: OutputFormat,
    },
    /// Load a product table, clean its prices, print statistics and save the result
    Analyze {
        #[arg(
            long,
            default_value = prodscrape::RAW_PRODUCTS_PATH,
            help = "Table to analyse (.csv or .xlsx)"
        )]
        input: PathBuf,

        #[arg(
            long,
            default_value = prodscrape::CLEANED_PRODUCTS_PATH,
            help = "Where to write the cleaned table (.csv or .xlsx)"
        )]
        output: PathBuf,

        #[arg(
            long,
            default_value_t = prodscrape::DEFAULT_TOP_N,
            help = "Number of most expensive products to list"
        )]
        top: usize,

        #[arg(long, help = "Drop rows whose price cannot be parsed instead of failing")]
        skip_invalid: bool,

        #[arg(
            short = 'o',
            long = "format",
            value_enum,
            default_value = "text",
            help = "Console output format"
        )]
        format: OutputFormat,
    },
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Scrape {
            url,
            output,
            format,
        } => {
            let scraper = WebScraper::new().unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let outcome = run_scrape(&scraper, &url, &output).unwrap_or_else(|e| {
                log::error!("Error scraping {}: {}", url, e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => serialize_json(&outcome.records),
                OutputFormat::Text => {
                    if outcome.records.is_empty() {
                        println!("No products found.");
                    } else {
                        print!("{}", outcome.table);
                    }
                    println!(
                        "\n{} products saved to {}",
                        outcome.records.len(),
                        output.display()
                    );
                }
            }
        }

        Commands::Analyze {
            input,
            output,
            top,
            skip_invalid,
            format,
        } => {
            let options = AnalysisOptions {
                top_n: top,
                policy: if skip_invalid {
                    CleanPolicy::SkipInvalid
                } else {
                    CleanPolicy::Strict
                },
            };

            let outcome = run_analysis(&input, &output, &options).unwrap_or_else(|e| {
                log::error!("Error analysing {}: {}", input.display(), e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => serialize_json(&outcome.report),
                OutputFormat::Text => {
                    print!("{}", outcome.report);
                    if !outcome.clean.skipped.is_empty() {
                        println!(
                            "\nSkipped {} rows with unparsable prices:",
                            outcome.clean.skipped.len()
                        );
                        for skipped in &outcome.clean.skipped {
                            println!("  row {}: '{}'", skipped.row, skipped.value);
                        }
                    }
                    println!("\nClean data saved to {}", output.display());
                }
            }
        }
    }
}
