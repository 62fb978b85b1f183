//! Per-run tally of accepted items and rejections by reason.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sift_core::RejectionReason;

/// Running tally of what a pipeline accepted and why it refused the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceLedger {
    pub accepted: usize,
    pub rejected: BTreeMap<RejectionReason, usize>,
}

impl AcceptanceLedger {
    pub fn record_accept(&mut self) {
        self.accepted += 1;
    }

    pub fn record_reject(&mut self, reason: RejectionReason) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    #[must_use]
    pub fn rejected_for(&self, reason: RejectionReason) -> usize {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Every candidate the pipeline looked at.
    #[must_use]
    pub fn total_seen(&self) -> usize {
        self.accepted + self.total_rejected()
    }
}
