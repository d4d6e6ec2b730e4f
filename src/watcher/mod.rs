//! Change detection for a single listing page
//!
//! A [`Watcher`] polls one search result page and reports the listings that
//! appeared since it last looked. Each scan:
//!
//! 1. Fetches the page and reads the listing records embedded in it
//! 2. Keeps the first `max_listings` records that are real ads
//! 3. Stops early when the aggregate fingerprint of that list is unchanged
//! 4. Enriches every listing not delivered before, concurrently
//! 5. Remembers the delivered fingerprints and returns those listings
//!
//! Failures never escape a scan. A failed page fetch or an unreadable page
//! is a scan-level failure: nothing is returned and no state changes. A
//! failed detail fetch only costs that one listing its detail fields.

mod seen;

pub use seen::{
    seen_store_from_config, RecentSeenStore, SeenStore, UnboundedSeenStore, WindowedSeenStore,
};

use crate::listing::{aggregate_fingerprint, EnrichError, Listing};
use crate::page::{extract_next_data, listing_records, FetchError, PageFetcher};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Listings considered per scan unless configured otherwise
///
/// Pages reporting more new ads than this within one scan interval lose
/// the overflow; scan more often instead of raising the cap.
pub const DEFAULT_MAX_LISTINGS: usize = 10;

/// Per-fetch timeout unless configured otherwise
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Why a scan produced no result at all
#[derive(Debug, Error)]
pub enum ScanFailure {
    #[error("transport failure: {0}")]
    Transport(#[from] FetchError),

    #[error("listing data unavailable: {0}")]
    ListingData(String),
}

impl ScanFailure {
    /// Short machine-friendly failure class for logs
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::ListingData(_) => "parse",
        }
    }
}

/// Detailed result of one scan
#[derive(Debug)]
pub enum ScanOutcome {
    /// The page could not be fetched or read; state is untouched
    Failed(ScanFailure),

    /// The bounded listing list is identical to the previous scan
    Unchanged,

    /// The list changed; `new_listings` were never delivered before
    Scanned {
        new_listings: Vec<Listing>,
        considered: usize,
    },
}

impl ScanOutcome {
    /// Listings to deliver; empty for failures and unchanged pages
    pub fn into_new_listings(self) -> Vec<Listing> {
        match self {
            Self::Scanned { new_listings, .. } => new_listings,
            Self::Failed(_) | Self::Unchanged => Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Watches one search result page for new listings
pub struct Watcher {
    url: String,
    fetcher: Arc<dyn PageFetcher>,
    current_listings: Option<Vec<Listing>>,
    seen: Box<dyn SeenStore>,
    max_listings: usize,
    timeout: Duration,
}

impl Watcher {
    /// Creates a watcher with an unbounded seen store and default limits
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ad_watcher::config::HttpConfig;
    /// use ad_watcher::page::HttpFetcher;
    /// use ad_watcher::watcher::{Watcher, DEFAULT_FETCH_TIMEOUT};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> ad_watcher::Result<()> {
    /// let http = HttpConfig::default();
    /// let fetcher = Arc::new(HttpFetcher::from_config(&http, DEFAULT_FETCH_TIMEOUT)?);
    /// let mut watcher = Watcher::new("https://www.olx.com.br/imoveis/aluguel", fetcher);
    /// for listing in watcher.scan().await {
    ///     println!("{}", listing.to_display_string());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
            current_listings: None,
            seen: Box::new(UnboundedSeenStore::new()),
            max_listings: DEFAULT_MAX_LISTINGS,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Replaces the seen store
    pub fn with_seen_store(mut self, seen: Box<dyn SeenStore>) -> Self {
        self.seen = seen;
        self
    }

    /// Sets how many listings of the page are considered per scan (at least one)
    pub fn with_max_listings(mut self, max_listings: usize) -> Self {
        self.max_listings = max_listings.max(1);
        self
    }

    /// Sets the timeout applied to every page and detail fetch
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The bounded listing list of the last changed scan
    pub fn current_listings(&self) -> Option<&[Listing]> {
        self.current_listings.as_deref()
    }

    /// Number of fingerprints the seen store currently remembers
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Scans the page and returns the listings not delivered before
    ///
    /// An empty result means either "nothing new" or "the scan failed";
    /// use [`Watcher::poll`] to tell them apart.
    pub async fn scan(&mut self) -> Vec<Listing> {
        self.poll().await.into_new_listings()
    }

    /// Scans the page and reports what happened
    pub async fn poll(&mut self) -> ScanOutcome {
        let listings = match self.fetch_listings().await {
            Ok(listings) => listings,
            Err(failure) => {
                tracing::error!(
                    url = %self.url,
                    reason = failure.reason(),
                    error = %failure,
                    "Scan failed"
                );
                return ScanOutcome::Failed(failure);
            }
        };

        let aggregate = aggregate_fingerprint(&listings);
        let previous = self.current_listings.as_deref().map(aggregate_fingerprint);
        if previous.as_deref() == Some(aggregate.as_str()) {
            tracing::debug!(url = %self.url, "Listing page unchanged");
            return ScanOutcome::Unchanged;
        }

        // Same fingerprint twice on one page is enriched and delivered once.
        let mut scheduled = HashSet::new();
        let mut pending: Vec<Listing> = listings
            .iter()
            .filter(|listing| {
                let fingerprint = listing.fingerprint();
                !self.seen.contains(&fingerprint) && scheduled.insert(fingerprint)
            })
            .cloned()
            .collect();

        tracing::info!(
            url = %self.url,
            considered = listings.len(),
            unseen = pending.len(),
            "Preparing detail requests"
        );

        self.enrich_all(&mut pending).await;

        for listing in &pending {
            self.seen.add(listing.fingerprint());
        }

        let considered = listings.len();
        self.current_listings = Some(listings);

        tracing::info!(
            url = %self.url,
            new = pending.len(),
            seen = self.seen.len(),
            "Scan finished"
        );

        ScanOutcome::Scanned {
            new_listings: pending,
            considered,
        }
    }

    /// Fetches the page and builds the bounded listing list
    async fn fetch_listings(&self) -> Result<Vec<Listing>, ScanFailure> {
        let body = match tokio::time::timeout(self.timeout, self.fetcher.fetch(&self.url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: self.url.clone(),
                }
                .into())
            }
        };

        let data =
            extract_next_data(&body).map_err(|e| ScanFailure::ListingData(e.to_string()))?;
        let records = listing_records(&data).ok_or_else(|| {
            ScanFailure::ListingData("no listing records at props.pageProps.ads".to_string())
        })?;

        let mut listings: Vec<Listing> = records.iter().filter_map(Listing::from_record).collect();
        tracing::debug!(
            url = %self.url,
            records = records.len(),
            ads = listings.len(),
            "Parsed listing page"
        );

        listings.truncate(self.max_listings);
        Ok(listings)
    }

    /// Enriches every listing concurrently; failures stay per listing
    async fn enrich_all(&self, listings: &mut [Listing]) {
        let fetcher = self.fetcher.as_ref();
        let timeout = self.timeout;

        let results = join_all(
            listings
                .iter_mut()
                .map(|listing| listing.enrich(fetcher, timeout)),
        )
        .await;

        for (listing, result) in listings.iter().zip(results) {
            if let Err(error) = result {
                log_enrich_failure(listing, &error);
            }
        }
    }
}

fn log_enrich_failure(listing: &Listing, error: &EnrichError) {
    if error.is_partial() {
        tracing::warn!(
            title = %listing.title,
            url = %listing.detail_url,
            error = %error,
            "Listing partially enriched"
        );
    } else {
        tracing::warn!(
            title = %listing.title,
            url = %listing.detail_url,
            error = %error,
            "Listing enrichment failed, delivering without details"
        );
    }
}
