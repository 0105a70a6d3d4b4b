pub mod analysis;
pub mod cleaner;
pub mod codec;
mod parser;
pub mod pipeline;
pub mod scraper;
pub mod table;
pub mod types;

pub use parser::{ParseError, parse_product, parse_products};
pub use scraper::{ScraperError, WebScraper};
pub use table::{Table, Value};
pub use types::Record;

/// The single page the scraper pipeline targets by default.
pub const BASE_URL: &str = "https://webscraper.io/test-sites/e-commerce/allinone";

pub const RAW_PRODUCTS_PATH: &str = "data/raw/products.csv";
pub const CLEANED_PRODUCTS_PATH: &str = "data/processed/cleaned_products.csv";

pub const PRICE_COLUMN: &str = "price";
pub const DEFAULT_TOP_N: usize = 5;
