//! The two end-to-end runs: scrape a page into a raw CSV, and load, clean,
//! analyze and re-save a table. Each step is logged with its duration.

use std::path::Path;
use std::time::Instant;

use crate::analysis::{AnalysisError, Report, analyze};
use crate::cleaner::{CleanError, CleanPolicy, CleanReport, clean_prices};
use crate::codec::{CodecError, load_table, save_table};
use crate::scraper::{ScraperError, WebScraper};
use crate::table::Table;
use crate::types::Record;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Clean(#[from] CleanError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

fn timed<T, E>(step: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    log::info!("Running {}", step);
    let start = Instant::now();
    let result = f();
    match &result {
        Ok(_) => log::info!("{} finished in {:.3?}", step, start.elapsed()),
        Err(_) => log::info!("{} failed after {:.3?}", step, start.elapsed()),
    }
    result
}

#[derive(Debug)]
pub struct ScrapeOutcome {
    pub records: Vec<Record>,
    pub table: Table,
}

/// fetch → parse → collect → save. Nothing is written unless every product
/// on the page was extracted.
pub fn run_scrape(
    scraper: &WebScraper,
    url: &str,
    output: &Path,
) -> Result<ScrapeOutcome, PipelineError> {
    let records = timed("scrape", || scraper.scrape(url))?;
    log::info!("Extracted {} products from {}", records.len(), url);

    let table = Table::from_records(&records);
    timed("save_table", || save_table(&table, output))?;

    Ok(ScrapeOutcome { records, table })
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub table: Table,
    pub clean: CleanReport,
    pub report: Report,
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub top_n: usize,
    pub policy: CleanPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_n: crate::DEFAULT_TOP_N,
            policy: CleanPolicy::Strict,
        }
    }
}

/// load → clean → analyze → save.
pub fn run_analysis(
    input: &Path,
    output: &Path,
    options: &AnalysisOptions,
) -> Result<AnalysisOutcome, PipelineError> {
    let mut table = timed("load_table", || load_table(input))?;
    let clean = timed("clean_prices", || clean_prices(&mut table, options.policy))?;
    log::info!(
        "Cleaned {} prices ({} missing, {} rows skipped)",
        clean.cleaned,
        clean.missing,
        clean.skipped.len()
    );

    let report = timed("analyze", || {
        analyze(&table, crate::PRICE_COLUMN, options.top_n)
    })?;
    timed("save_table", || save_table(&table, output))?;

    Ok(AnalysisOutcome {
        table,
        clean,
        report,
    })
}
