//! Page access for the listing site
//!
//! This module contains everything that touches raw pages:
//! - HTTP fetching behind the [`PageFetcher`] trait
//! - Extraction of the JSON data blocks embedded in search and detail pages

mod fetcher;
mod parser;

pub use fetcher::{build_http_client, fetch_url, FetchError, HttpFetcher, PageFetcher};
pub use parser::{extract_data_json, extract_next_data, listing_records, EmbeddedDataError};
