//! Extraction of machine-readable data embedded in listing pages
//!
//! Listing pages carry their data twice: once as rendered HTML and once as a
//! JSON payload inside a `<script>` element. Only the JSON is read:
//! - Search result pages: `<script id="__NEXT_DATA__">{...}</script>`
//! - Detail pages: `<script data-json="{...}"></script>`

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use thiserror::Error;

/// Why an embedded data block could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddedDataError {
    #[error("embedded data block not found")]
    Missing,

    #[error("embedded data block is not valid JSON: {0}")]
    Malformed(String),
}

/// Extracts the Next.js data payload of a search result page
///
/// # Example
///
/// ```
/// use ad_watcher::page::extract_next_data;
///
/// let html = r#"<html><body><script id="__NEXT_DATA__" type="application/json">{"props":{}}</script></body></html>"#;
/// let data = extract_next_data(html).unwrap();
/// assert!(data.get("props").is_some());
/// ```
pub fn extract_next_data(html: &str) -> Result<Value, EmbeddedDataError> {
    let document = Html::parse_document(html);
    let element =
        select_first(&document, "script#__NEXT_DATA__").ok_or(EmbeddedDataError::Missing)?;
    let text = element.text().collect::<String>();
    decode(&text)
}

/// Extracts the `data-json` attribute payload of a detail page
///
/// Only the first `<script>` carrying the attribute is considered.
pub fn extract_data_json(html: &str) -> Result<Value, EmbeddedDataError> {
    let document = Html::parse_document(html);
    let element =
        select_first(&document, "script[data-json]").ok_or(EmbeddedDataError::Missing)?;
    let raw = element
        .value()
        .attr("data-json")
        .ok_or(EmbeddedDataError::Missing)?;
    decode(raw)
}

/// Returns the raw listing records inside a Next.js payload
///
/// The records live under `props.pageProps.ads`; anything else (missing key,
/// not an array) means the page is not a search result page we understand.
pub fn listing_records(data: &Value) -> Option<&Vec<Value>> {
    data.pointer("/props/pageProps/ads")?.as_array()
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn decode(text: &str) -> Result<Value, EmbeddedDataError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EmbeddedDataError::Malformed("empty payload".to_string()));
    }
    serde_json::from_str(text).map_err(|e| EmbeddedDataError::Malformed(e.to_string()))
}
