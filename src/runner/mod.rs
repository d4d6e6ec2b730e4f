//! Scan loop orchestration
//!
//! The runner owns every configured watcher and drives them on a fixed
//! interval:
//! - Optionally primes all watchers at startup so only later ads are sent
//! - Scans watchers one after another, never concurrently
//! - Delivers each new listing to every chat subscribed to its watcher
//! - Stops on the shutdown signal, between cycles

use crate::config::Config;
use crate::notify::{Dispatcher, TelegramNotifier};
use crate::page::{HttpFetcher, PageFetcher};
use crate::watcher::{seen_store_from_config, Watcher};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// A watcher together with the chats that receive its listings
pub struct WatchTarget {
    /// Name used in logs
    pub label: String,
    pub watcher: Watcher,
    pub chats: Vec<i64>,
    /// Priming failed; the next successful scan is discarded instead
    awaiting_prime: bool,
}

impl WatchTarget {
    pub fn new(label: impl Into<String>, watcher: Watcher, chats: Vec<i64>) -> Self {
        Self {
            label: label.into(),
            watcher,
            chats,
            awaiting_prime: false,
        }
    }

    pub fn is_awaiting_prime(&self) -> bool {
        self.awaiting_prime
    }
}

/// Counters for one pass over all watchers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub scans: usize,
    pub failed_scans: usize,
    pub new_listings: usize,
    pub deliveries: usize,
    pub failed_deliveries: usize,
}

/// Drives all watchers and routes their results to the dispatcher
pub struct Runner {
    targets: Vec<WatchTarget>,
    dispatcher: Dispatcher,
    scan_delay: Duration,
    show_new_on_start: bool,
}

impl Runner {
    pub fn new(
        targets: Vec<WatchTarget>,
        dispatcher: Dispatcher,
        scan_delay: Duration,
        show_new_on_start: bool,
    ) -> Self {
        Self {
            targets,
            dispatcher,
            scan_delay,
            show_new_on_start,
        }
    }

    /// Builds the HTTP fetcher, the Telegram notifier and one watcher per
    /// `[[watch]]` entry
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let timeout = Duration::from_secs(config.scanner.request_timeout);
        let fetcher: Arc<dyn PageFetcher> =
            Arc::new(HttpFetcher::from_config(&config.http, timeout)?);

        let notifier = TelegramNotifier::new(
            config.telegram.token.clone(),
            config.telegram.api_base.clone(),
        )?;
        let dispatcher = Dispatcher::new(
            Arc::new(notifier),
            Duration::from_millis(config.telegram.batch_pause_ms),
        );

        let targets = config
            .watches
            .iter()
            .map(|entry| {
                let watcher = Watcher::new(entry.url.clone(), fetcher.clone())
                    .with_seen_store(seen_store_from_config(&config.seen))
                    .with_max_listings(config.scanner.max_listings)
                    .with_timeout(timeout);
                WatchTarget::new(entry.label(), watcher, entry.chats.clone())
            })
            .collect();

        Ok(Self::new(
            targets,
            dispatcher,
            Duration::from_secs(config.scanner.scan_delay),
            config.scanner.show_new_on_start,
        ))
    }

    pub fn targets(&self) -> &[WatchTarget] {
        &self.targets
    }

    /// Scans every watcher once and discards the results
    ///
    /// Marks everything currently listed as seen, so the following cycles
    /// only deliver listings posted after startup. A watcher whose priming
    /// scan fails stays unprimed: its first successful scan in a later
    /// cycle is discarded the same way.
    pub async fn prime(&mut self) {
        for target in &mut self.targets {
            let outcome = target.watcher.poll().await;
            if outcome.is_failure() {
                target.awaiting_prime = true;
                tracing::warn!(
                    watch = %target.label,
                    "Priming scan failed, will prime on the next successful scan"
                );
                continue;
            }

            target.awaiting_prime = false;
            tracing::info!(
                watch = %target.label,
                skipped = outcome.into_new_listings().len(),
                "Primed watcher"
            );
        }
    }

    /// Scans every watcher once and delivers what is new
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        for target in &mut self.targets {
            report.scans += 1;

            let outcome = target.watcher.poll().await;
            if outcome.is_failure() {
                report.failed_scans += 1;
                continue;
            }

            let new_listings = outcome.into_new_listings();
            if target.awaiting_prime {
                target.awaiting_prime = false;
                tracing::info!(
                    watch = %target.label,
                    skipped = new_listings.len(),
                    "Primed watcher after earlier failure"
                );
                continue;
            }
            report.new_listings += new_listings.len();

            for listing in &new_listings {
                for &chat_id in &target.chats {
                    match self.dispatcher.deliver(chat_id, listing).await {
                        Ok(()) => {
                            report.deliveries += 1;
                            tracing::info!(
                                watch = %target.label,
                                chat_id,
                                title = %listing.title,
                                "Delivered listing"
                            );
                        }
                        Err(e) => {
                            report.failed_deliveries += 1;
                            tracing::error!(
                                watch = %target.label,
                                chat_id,
                                title = %listing.title,
                                error = %e,
                                "Delivery failed"
                            );
                        }
                    }
                }
            }
        }

        report
    }

    /// Runs a single cycle without priming
    ///
    /// Everything currently listed counts as new and is delivered.
    pub async fn run_once(&mut self) -> CycleReport {
        let report = self.run_cycle().await;
        tracing::info!(
            scans = report.scans,
            failed = report.failed_scans,
            delivered = report.deliveries,
            "Single cycle finished"
        );
        report
    }

    /// Runs until Ctrl-C is received
    pub async fn run(&mut self) -> crate::Result<()> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Runs scan cycles every `scan_delay` until `shutdown` completes
    pub async fn run_until<F>(&mut self, shutdown: F) -> crate::Result<()>
    where
        F: Future<Output = std::io::Result<()>>,
    {
        let mut interval = tokio::time::interval(self.scan_delay);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if !self.show_new_on_start {
            self.prime().await;
            // The first tick fires immediately; priming already covered it.
            interval.tick().await;
        }

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.run_cycle().await;
                    tracing::debug!(?report, "Cycle finished");
                }
                result = &mut shutdown => {
                    result?;
                    tracing::info!("Shutdown requested, stopping");
                    break;
                }
            }
        }

        Ok(())
    }
}
