//! Listing entity
//!
//! A [`Listing`] is one classified ad as seen on a search result page. It is
//! built from the raw JSON record of that page and may later be enriched,
//! exactly once, with data that only exists on the ad's own detail page.
//!
//! # Components
//!
//! - `mod.rs`: construction from raw records and identity fingerprints
//! - `detail.rs`: detail page enrichment
//! - `render.rs`: the human-readable notification body

mod detail;
mod render;

pub use detail::{EnrichError, EnrichOutcome};
pub use render::{escape_html, truncate_description, MAX_DESCRIPTION_LENGTH};

use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// One classified ad, optionally enriched with detail page fields
#[derive(Debug, Clone)]
pub struct Listing {
    /// Ad title (`subject` in the raw record)
    pub title: String,

    /// Current price, currency prefix stripped
    pub price: Option<String>,

    /// Previous price when the seller lowered it recently
    pub old_price: Option<String>,

    /// Full-size image URLs in page order
    pub image_urls: Vec<String>,

    /// Location as found in the summary record, not interpreted
    pub raw_location: Value,

    /// Detail page URL; empty means the ad cannot be enriched
    pub detail_url: String,

    // Filled in by enrichment
    pub postal_code: String,
    pub municipality: String,
    pub district: String,
    pub description: String,
    pub phone: Option<String>,
    pub condominium_fee: Option<String>,
    pub garage_spaces: Option<String>,
    pub bathrooms: Option<String>,
    pub rooms: Option<String>,
    pub size: Option<String>,
    pub property_tax: Option<String>,
    pub full_price_value: Option<String>,
    pub full_price_label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawListing {
    subject: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    old_price: Option<String>,
    #[serde(default)]
    images: Option<Vec<RawImage>>,
    #[serde(default)]
    location: Value,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    #[serde(default)]
    original: Option<String>,
}

impl Listing {
    /// Builds a listing from a raw search result record
    ///
    /// Returns `None` when the record has no `subject`: such entries are
    /// promotional cards and other non-ad content, not errors. Records that
    /// do have a subject but cannot be decoded are skipped as well.
    ///
    /// # Example
    ///
    /// ```
    /// use ad_watcher::listing::Listing;
    /// use serde_json::json;
    ///
    /// let record = json!({
    ///     "subject": "Surf skate",
    ///     "price": "R$ 350",
    ///     "oldPrice": null,
    ///     "images": [{"original": "https://img.example/1.jpg"}],
    ///     "location": "Curitiba, Centro",
    ///     "url": "https://example.com/ad/1"
    /// });
    /// let listing = Listing::from_record(&record).unwrap();
    /// assert_eq!(listing.price.as_deref(), Some("350"));
    /// assert!(Listing::from_record(&json!({"price": "R$ 1"})).is_none());
    /// ```
    pub fn from_record(record: &Value) -> Option<Self> {
        record.get("subject")?;

        let raw = match RawListing::deserialize(record) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable listing record");
                return None;
            }
        };

        Some(Self::from_raw(raw))
    }

    fn from_raw(raw: RawListing) -> Self {
        let image_urls = raw
            .images
            .unwrap_or_default()
            .into_iter()
            .filter_map(|image| image.original)
            .collect();

        Self {
            title: raw.subject,
            price: parse_price(raw.price.as_deref()),
            old_price: parse_price(raw.old_price.as_deref()),
            image_urls,
            raw_location: raw.location,
            detail_url: raw.url.unwrap_or_default(),
            postal_code: String::new(),
            municipality: String::new(),
            district: String::new(),
            description: String::new(),
            phone: None,
            condominium_fee: None,
            garage_spaces: None,
            bathrooms: None,
            rooms: None,
            size: None,
            property_tax: None,
            full_price_value: None,
            full_price_label: None,
        }
    }

    /// Identity fingerprint: hex SHA-256 of detail URL followed by price
    ///
    /// Title or description edits keep the fingerprint; a price change
    /// produces a new one, so a re-priced ad is notified again.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.detail_url.as_bytes());
        hasher.update(self.price.as_deref().unwrap_or("").as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PartialEq for Listing {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Eq for Listing {}

/// Fingerprint of a whole ordered list of listings
///
/// Hash of the concatenated per-listing fingerprints, so both content and
/// order changes are detected.
pub fn aggregate_fingerprint(listings: &[Listing]) -> String {
    let mut hasher = Sha256::new();
    for listing in listings {
        hasher.update(listing.fingerprint().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Keeps only the last whitespace separated token of a price
///
/// `"R$ 1.200"` becomes `"1.200"`. Blank input yields `None`.
pub fn parse_price(price: Option<&str>) -> Option<String> {
    price?.split_whitespace().last().map(str::to_string)
}
