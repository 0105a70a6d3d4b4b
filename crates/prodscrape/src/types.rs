use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One scraped product. `price` is kept exactly as it appears on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub description: String,
    pub price: String,
}

impl Record {
    pub const COLUMNS: [&'static str; 3] = ["title", "description", "price"];
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {} ({})", self.title, self.price, self.description)
    }
}
