//! Detail page enrichment
//!
//! Search result records lack location details, the description and the
//! real-estate properties of an ad. Those are read from the `data-json`
//! block of the ad's own page.

use crate::listing::Listing;
use crate::page::{extract_data_json, EmbeddedDataError, FetchError, PageFetcher};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Result of a successful [`Listing::enrich`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// The listing has no detail URL; nothing was fetched
    Skipped,

    /// Every detail field present on the page was copied
    Enriched,
}

/// Per-listing enrichment failures
///
/// None of these is fatal: the listing keeps whatever fields were set
/// before the failure and is still delivered.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("detail page data: {0}")]
    Data(#[from] EmbeddedDataError),

    #[error("detail page has no usable ad object: {0}")]
    MalformedAd(String),

    #[error("detail page has no description")]
    MissingDescription,
}

impl EnrichError {
    /// True when some detail fields were applied before the failure
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::MissingDescription)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdDetail {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location_properties: Option<Vec<LocationProperty>>,
    #[serde(default)]
    properties: Option<Vec<AdProperty>>,
    #[serde(default)]
    phone: Option<PhoneInfo>,
    #[serde(default)]
    location: Option<DetailLocation>,
}

#[derive(Debug, Deserialize)]
struct LocationProperty {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct AdProperty {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhoneInfo {
    #[serde(default)]
    phone: Value,
}

#[derive(Debug, Deserialize)]
struct DetailLocation {
    #[serde(default)]
    zipcode: Value,
}

impl Listing {
    /// Fetches the detail page and fills in the enrichment fields
    ///
    /// A listing without a detail URL is left untouched and no request is
    /// made. The fetch is bounded by `timeout`; expiry is reported as
    /// [`FetchError::Timeout`].
    ///
    /// When the page parses but lacks a description, every other field is
    /// still applied and [`EnrichError::MissingDescription`] is returned.
    pub async fn enrich(
        &mut self,
        fetcher: &dyn PageFetcher,
        timeout: Duration,
    ) -> Result<EnrichOutcome, EnrichError> {
        if self.detail_url.is_empty() {
            return Ok(EnrichOutcome::Skipped);
        }

        let body = match tokio::time::timeout(timeout, fetcher.fetch(&self.detail_url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: self.detail_url.clone(),
                }
                .into())
            }
        };

        let data = extract_data_json(&body)?;
        self.apply_detail_data(&data)?;

        tracing::debug!(title = %self.title, "Got detailed data");
        Ok(EnrichOutcome::Enriched)
    }

    /// Copies the fields of a decoded `data-json` block onto this listing
    fn apply_detail_data(&mut self, data: &Value) -> Result<(), EnrichError> {
        let ad = data
            .get("ad")
            .ok_or_else(|| EnrichError::MalformedAd("missing `ad` key".to_string()))?;
        let detail =
            AdDetail::deserialize(ad).map_err(|e| EnrichError::MalformedAd(e.to_string()))?;

        if let Some(phone) = detail.phone.as_ref().and_then(|p| value_text(&p.phone)) {
            self.phone = Some(phone);
        }

        // The zipcode of the location object is only a fallback; a CEP
        // location property overrides it below.
        if let Some(zipcode) = detail.location.as_ref().and_then(|l| value_text(&l.zipcode)) {
            self.postal_code = zipcode;
        }

        for property in detail.properties.iter().flatten() {
            let value = value_text(&property.value);
            let Some(name) = property.name.as_deref() else {
                continue;
            };
            match name {
                "condominio" => self.condominium_fee = value,
                "garage_spaces" => self.garage_spaces = value,
                "bathrooms" => self.bathrooms = value,
                "rooms" => self.rooms = value,
                "size" => self.size = value,
                "iptu" => self.property_tax = value,
                "re_rent_full_price" => {
                    self.full_price_value = value;
                    self.full_price_label = property.label.clone();
                }
                _ => {}
            }
        }

        for property in detail.location_properties.iter().flatten() {
            let value = value_text(&property.value).unwrap_or_default();
            let Some(label) = property.label.as_deref() else {
                continue;
            };
            match label {
                "CEP" => self.postal_code = value,
                "Município" => self.municipality = value,
                "Bairro" => self.district = value,
                _ => {}
            }
        }

        match detail.description {
            Some(description) => {
                self.description = description;
                Ok(())
            }
            None => Err(EnrichError::MissingDescription),
        }
    }
}

/// Renders scalar JSON values as text; null and containers have no text
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
