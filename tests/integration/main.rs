//! Integration tests for ad-watcher
//!
//! These tests use wiremock to stand in for the classifieds site and the
//! Telegram Bot API.

mod fetch_tests;
mod notify_tests;
mod scan_tests;

use serde_json::{json, Value};

/// Builds a search result page embedding the given ad records
pub fn search_page(ads: &[Value]) -> String {
    let data = json!({"props": {"pageProps": {"ads": ads}}});
    format!(
        r#"<html><head></head><body>
        <div id="root">rendered markup</div>
        <script id="__NEXT_DATA__" type="application/json">{}</script>
        </body></html>"#,
        data
    )
}

/// Builds a detail page carrying `ad` in a `data-json` attribute
pub fn detail_page(ad: Value) -> String {
    let payload = json!({ "ad": ad })
        .to_string()
        .replace('&', "&amp;")
        .replace('"', "&quot;");
    format!(
        r#"<html><body><script data-json="{}"></script></body></html>"#,
        payload
    )
}

/// A minimal ad record pointing at `base_url/ad/<id>`
pub fn ad_record(base_url: &str, id: u32, price: &str) -> Value {
    json!({
        "subject": format!("Apartment {}", id),
        "price": price,
        "oldPrice": null,
        "images": [{"original": format!("{}/img/{}.jpg", base_url, id)}],
        "location": "Curitiba, Centro",
        "url": format!("{}/ad/{}", base_url, id)
    })
}
