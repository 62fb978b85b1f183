//! Bounded, deduplicating accumulator with stall tracking.

use std::collections::HashSet;

use serde::Serialize;
use sift_core::RejectionReason;

/// Outcome of [`Collector::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Offer {
    Accepted,
    Duplicate,
    TargetReached,
}

impl Offer {
    #[must_use]
    pub fn is_accepted(self) -> bool {
        self == Offer::Accepted
    }

    /// Ledger key for a refused offer.
    #[must_use]
    pub fn rejection(self) -> Option<RejectionReason> {
        match self {
            Offer::Accepted => None,
            Offer::Duplicate => Some(RejectionReason::Duplicate),
            Offer::TargetReached => Some(RejectionReason::TargetReached),
        }
    }
}

/// Items keyed by identity, kept in insertion order.
///
/// The first item seen for a key wins. The collection never grows past
/// `target_count`. Every accepted item resets the stall counter.
#[derive(Debug, Clone)]
pub struct Collector<T> {
    entries: Vec<(String, T)>,
    keys: HashSet<String>,
    target_count: usize,
    stall_patience: u32,
    stall_count: u32,
    accepted_this_pass: bool,
}

impl<T> Collector<T> {
    /// A zero `target_count` is treated as 1.
    #[must_use]
    pub fn new(target_count: usize, stall_patience: u32) -> Self {
        Self {
            entries: Vec::new(),
            keys: HashSet::new(),
            target_count: target_count.max(1),
            stall_patience,
            stall_count: 0,
            accepted_this_pass: false,
        }
    }

    /// Offer an item under `key`. Duplicates are checked before capacity.
    pub fn offer(&mut self, key: impl Into<String>, item: T) -> Offer {
        let key = key.into();
        if self.keys.contains(&key) {
            return Offer::Duplicate;
        }
        if self.is_satisfied() {
            return Offer::TargetReached;
        }

        self.keys.insert(key.clone());
        self.entries.push((key, item));
        self.stall_count = 0;
        self.accepted_this_pass = true;
        Offer::Accepted
    }

    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.entries.len() >= self.target_count
    }

    /// Count one unproductive pass. Returns `true` once the stall count
    /// exceeds the patience, i.e. the driver should stop.
    pub fn record_stall(&mut self) -> bool {
        self.stall_count = self.stall_count.saturating_add(1);
        self.stall_count > self.stall_patience
    }

    /// Close a discovery pass: a pass that accepted nothing counts as a
    /// stall. Returns `true` when the driver should stop.
    pub fn end_pass(&mut self) -> bool {
        if std::mem::take(&mut self.accepted_this_pass) {
            self.stall_count = 0;
            false
        } else {
            self.record_stall()
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    #[must_use]
    pub fn stall_count(&self) -> u32 {
        self.stall_count
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, item)| item)
    }

    /// Accepted items in insertion order.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.entries.into_iter().map(|(_, item)| item).collect()
    }
}
