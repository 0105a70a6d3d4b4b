use std::sync::LazyLock;

use crate::types::Record;

use scraper::{ElementRef, Html, Selector};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Empty field '{0}' in product container")]
    EmptyField(&'static str),
}

static SEL_PRODUCT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.thumbnail").expect("invalid selector: product"));
static SEL_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.title").expect("invalid selector: title"));
static SEL_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.description").expect("invalid selector: description"));
static SEL_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4.price").expect("invalid selector: price"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn field(
    product: ElementRef,
    selector: &Selector,
    css: &str,
    name: &'static str,
) -> Result<String, ParseError> {
    let element = product
        .select(selector)
        .next()
        .ok_or_else(|| ParseError::MissingField(css.to_string()))?;
    let text = elem_text(element);
    if text.is_empty() {
        return Err(ParseError::EmptyField(name));
    }
    Ok(text)
}

/// Extracts every product container on the page, in document order.
///
/// Containers are expected to be well formed: the first one missing a field
/// aborts the whole page.
pub fn parse_products(html: &str) -> Result<Vec<Record>, ParseError> {
    let document = Html::parse_document(html);

    let records = document
        .select(&SEL_PRODUCT)
        .map(parse_product)
        .collect::<Result<Vec<_>, _>>()?;

    for record in &records {
        log::debug!("Parsed product: {}", record);
    }
    log::debug!("Parsed {} product containers", records.len());
    Ok(records)
}

pub fn parse_product(product: ElementRef) -> Result<Record, ParseError> {
    let title = field(product, &SEL_TITLE, "a.title", "title")?;
    let description = field(product, &SEL_DESCRIPTION, "p.description", "description")?;
    let price = field(product, &SEL_PRICE, "h4.price", "price")?;

    Ok(Record {
        title,
        description,
        price,
    })
}
