//! Fingerprint stores for already delivered listings
//!
//! The watcher only needs to answer "was this fingerprint delivered
//! before?". How long that memory lasts is a policy of the store:
//! - `UnboundedSeenStore`: forever (memory grows with every new listing)
//! - `RecentSeenStore`: the last N fingerprints
//! - `WindowedSeenStore`: fingerprints added within a time window

use crate::config::SeenConfig;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet, VecDeque};

/// Memory of delivered listing fingerprints
pub trait SeenStore: Send {
    /// Whether `fingerprint` is still remembered
    fn contains(&self, fingerprint: &str) -> bool;

    /// Remembers `fingerprint`
    fn add(&mut self, fingerprint: String);

    /// Number of remembered fingerprints
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the store selected in the configuration
pub fn seen_store_from_config(config: &SeenConfig) -> Box<dyn SeenStore> {
    match config {
        SeenConfig::Unbounded => Box::new(UnboundedSeenStore::new()),
        SeenConfig::Recent { capacity } => Box::new(RecentSeenStore::new(*capacity)),
        SeenConfig::Windowed { ttl_hours } => {
            let hours = (*ttl_hours).min(MAX_TTL_HOURS) as i64;
            Box::new(WindowedSeenStore::new(Duration::hours(hours)))
        }
    }
}

/// A century; longer windows are clamped
const MAX_TTL_HOURS: u64 = 24 * 365 * 100;

/// Never forgets a fingerprint
///
/// Growth is unbounded for the lifetime of the process. That is acceptable
/// for a handful of watched pages polled every few minutes; long-running
/// deployments should prefer one of the bounded stores.
#[derive(Debug, Default)]
pub struct UnboundedSeenStore {
    fingerprints: HashSet<String>,
}

impl UnboundedSeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenStore for UnboundedSeenStore {
    fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    fn add(&mut self, fingerprint: String) {
        self.fingerprints.insert(fingerprint);
    }

    fn len(&self) -> usize {
        self.fingerprints.len()
    }
}

/// Remembers at most `capacity` fingerprints, evicting the oldest insertion
#[derive(Debug)]
pub struct RecentSeenStore {
    capacity: usize,
    order: VecDeque<String>,
    fingerprints: HashSet<String>,
}

impl RecentSeenStore {
    /// Creates a store; a capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            fingerprints: HashSet::with_capacity(capacity),
        }
    }
}

impl SeenStore for RecentSeenStore {
    fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    fn add(&mut self, fingerprint: String) {
        if !self.fingerprints.insert(fingerprint.clone()) {
            return;
        }
        self.order.push_back(fingerprint);

        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.fingerprints.remove(&evicted);
            }
        }
    }

    fn len(&self) -> usize {
        self.fingerprints.len()
    }
}

/// Remembers fingerprints for a fixed time window after they were added
#[derive(Debug)]
pub struct WindowedSeenStore {
    ttl: Duration,
    added_at: HashMap<String, DateTime<Utc>>,
}

impl WindowedSeenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            added_at: HashMap::new(),
        }
    }

    /// Checks membership as of `now`
    pub fn contains_at(&self, fingerprint: &str, now: DateTime<Utc>) -> bool {
        self.added_at
            .get(fingerprint)
            .is_some_and(|added| now - *added <= self.ttl)
    }

    /// Adds a fingerprint as of `now`, dropping entries that have expired
    pub fn add_at(&mut self, fingerprint: String, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.added_at.retain(|_, added| now - *added <= ttl);
        self.added_at.insert(fingerprint, now);
    }
}

impl SeenStore for WindowedSeenStore {
    fn contains(&self, fingerprint: &str) -> bool {
        self.contains_at(fingerprint, Utc::now())
    }

    fn add(&mut self, fingerprint: String) {
        self.add_at(fingerprint, Utc::now());
    }

    fn len(&self) -> usize {
        self.added_at.len()
    }
}
