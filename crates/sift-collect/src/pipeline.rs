//! Per-category image and per-profile post pipelines.
//!
//! Each pipeline owns its collector and ledger. The crawl driver pushes
//! candidates with `submit`, closes each discovery pass with `end_pass`,
//! and stops once either the pipeline is satisfied or `end_pass` says so.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use sift_core::{
    CandidateMedia, CanonicalImage, ClassifiedPost, ImageItem, PipelineConfig, PostRecord,
    RejectionReason,
};
use sift_media::{
    dimensions_from_attributes, dimensions_from_url, normalize_media_url, QualityClassifier,
    UrlRules,
};
use sift_posts::{classify_post, extract_post, PostRules};

use crate::collector::{Collector, Offer};
use crate::ledger::AcceptanceLedger;

/// What a pipeline did with one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accepted,
    Rejected(RejectionReason),
}

impl Decision {
    #[must_use]
    pub fn is_accepted(self) -> bool {
        self == Decision::Accepted
    }
}

/// Finished image collection for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRun {
    pub category: String,
    pub items: Vec<ImageItem>,
    pub ledger: AcceptanceLedger,
    pub passes: usize,
    pub satisfied: bool,
}

/// Finished post collection for one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRun {
    pub profile: String,
    pub posts: Vec<ClassifiedPost>,
    pub ledger: AcceptanceLedger,
    pub passes: usize,
    pub satisfied: bool,
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

pub struct ImagePipeline {
    category: String,
    rules: UrlRules,
    classifier: QualityClassifier,
    require_dimensions: bool,
    collector: Collector<ImageItem>,
    ledger: AcceptanceLedger,
    passes: usize,
}

impl ImagePipeline {
    #[must_use]
    pub fn new(category: impl Into<String>, config: &PipelineConfig) -> Self {
        Self {
            category: category.into(),
            rules: UrlRules::from_config(config),
            classifier: QualityClassifier::from_config(config),
            require_dimensions: config.require_dimensions,
            collector: Collector::new(config.target_count, config.stall_patience),
            ledger: AcceptanceLedger::default(),
            passes: 0,
        }
    }

    /// Run one candidate through normalization, classification and dedup.
    pub fn submit(&mut self, candidate: CandidateMedia) -> Decision {
        let raw_url = candidate.raw_url.trim();
        if raw_url.is_empty() {
            return self.reject(RejectionReason::MalformedInput, "");
        }

        let canonical_url = match normalize_media_url(raw_url, &self.rules) {
            Ok(url) => url,
            Err(rejection) => return self.reject(rejection.reason(), raw_url),
        };

        let dimensions = dimensions_from_attributes(&candidate.raw_attributes)
            .or_else(|| dimensions_from_url(raw_url));
        let quality = match dimensions {
            Some((width, height)) => {
                let assessment = self.classifier.classify(width, height);
                if !assessment.is_accepted() {
                    return self.reject(RejectionReason::DimensionsRejected, raw_url);
                }
                Some(assessment)
            }
            None if self.require_dimensions => {
                return self.reject(RejectionReason::MissingDimensions, raw_url);
            }
            None => None,
        };

        let item = ImageItem {
            image: CanonicalImage {
                canonical_url: canonical_url.clone(),
                thumbnail_url: raw_url.to_string(),
                source_alt: candidate.alt_text.unwrap_or_default(),
                source_link: candidate.link_url,
                captured_at: Utc::now(),
            },
            quality,
        };

        let offer = self.collector.offer(canonical_url.as_str(), item);
        self.settle(offer, &canonical_url)
    }

    /// Close a discovery pass. Returns `true` when the driver should stop
    /// because too many passes in a row produced nothing new.
    pub fn end_pass(&mut self) -> bool {
        self.passes += 1;
        let stalled = self.collector.end_pass();
        if stalled {
            tracing::info!(
                category = %self.category,
                passes = self.passes,
                collected = self.collector.len(),
                "image collection stalled"
            );
        }
        stalled
    }

    /// Count a feed entry that could not be decoded into a candidate.
    pub fn record_malformed(&mut self) {
        self.reject(RejectionReason::MalformedInput, "");
    }

    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.collector.is_satisfied()
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn ledger(&self) -> &AcceptanceLedger {
        &self.ledger
    }

    #[must_use]
    pub fn finish(self) -> ImageRun {
        let satisfied = self.collector.is_satisfied();
        tracing::info!(
            category = %self.category,
            accepted = self.ledger.accepted,
            rejected = self.ledger.total_rejected(),
            passes = self.passes,
            satisfied,
            "image run finished"
        );
        ImageRun {
            category: self.category,
            items: self.collector.into_items(),
            ledger: self.ledger,
            passes: self.passes,
            satisfied,
        }
    }

    fn settle(&mut self, offer: Offer, key: &str) -> Decision {
        match offer.rejection() {
            None => {
                self.ledger.record_accept();
                tracing::debug!(category = %self.category, url = key, "image accepted");
                Decision::Accepted
            }
            Some(reason) => self.reject(reason, key),
        }
    }

    fn reject(&mut self, reason: RejectionReason, url: &str) -> Decision {
        self.ledger.record_reject(reason);
        tracing::debug!(category = %self.category, url, %reason, "image rejected");
        Decision::Rejected(reason)
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

pub struct PostPipeline {
    profile: String,
    rules: PostRules,
    slideshows_only: bool,
    collector: Collector<ClassifiedPost>,
    ledger: AcceptanceLedger,
    passes: usize,
}

impl PostPipeline {
    #[must_use]
    pub fn new(profile: impl Into<String>, config: &PipelineConfig) -> Self {
        Self {
            profile: profile.into(),
            rules: PostRules::from_config(config),
            slideshows_only: config.slideshows_only,
            collector: Collector::new(config.target_count, config.post_stall_patience),
            ledger: AcceptanceLedger::default(),
            passes: 0,
        }
    }

    /// Run one raw post record through extraction, filtering and dedup.
    pub fn submit(&mut self, record: &Value) -> Decision {
        let Some(post) = extract_post(record, &self.rules) else {
            return self.reject(RejectionReason::MalformedInput, None);
        };

        if self.slideshows_only && !post.is_multi_image {
            return self.reject(RejectionReason::NotMultiImage, post.id.as_deref());
        }

        let key = post.id.clone().unwrap_or_else(|| fallback_post_key(&post));
        let classified = classify_post(post);

        match self.collector.offer(key.as_str(), classified).rejection() {
            None => {
                self.ledger.record_accept();
                tracing::debug!(profile = %self.profile, post = %key, "post accepted");
                Decision::Accepted
            }
            Some(reason) => self.reject(reason, Some(key.as_str())),
        }
    }

    /// Close one pass over the profile feed. Returns `true` when the driver
    /// should stop.
    pub fn end_pass(&mut self) -> bool {
        self.passes += 1;
        let stalled = self.collector.end_pass();
        if stalled {
            tracing::info!(
                profile = %self.profile,
                passes = self.passes,
                collected = self.collector.len(),
                "post collection stalled"
            );
        }
        stalled
    }

    pub fn record_malformed(&mut self) {
        self.reject(RejectionReason::MalformedInput, None);
    }

    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.collector.is_satisfied()
    }

    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    #[must_use]
    pub fn ledger(&self) -> &AcceptanceLedger {
        &self.ledger
    }

    #[must_use]
    pub fn finish(self) -> PostRun {
        let satisfied = self.collector.is_satisfied();
        tracing::info!(
            profile = %self.profile,
            accepted = self.ledger.accepted,
            rejected = self.ledger.total_rejected(),
            passes = self.passes,
            satisfied,
            "post run finished"
        );
        PostRun {
            profile: self.profile,
            posts: self.collector.into_items(),
            ledger: self.ledger,
            passes: self.passes,
            satisfied,
        }
    }

    fn reject(&mut self, reason: RejectionReason, post_id: Option<&str>) -> Decision {
        self.ledger.record_reject(reason);
        tracing::debug!(
            profile = %self.profile,
            post = post_id.unwrap_or("-"),
            %reason,
            "post rejected"
        );
        Decision::Rejected(reason)
    }
}

/// Identity for posts that carry no id: SHA-256 over author, caption and
/// media, NUL-separated.
#[must_use]
pub fn fallback_post_key(post: &PostRecord) -> String {
    let input = format!(
        "{}\x00{}\x00{}",
        post.author.username.as_deref().unwrap_or(""),
        post.caption.trim(),
        post.media_urls.join("\x00"),
    );
    format!("{:x}", Sha256::digest(input.as_bytes()))
}
