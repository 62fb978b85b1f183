//! Domain types shared by the media, post and collection crates.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Image side
// ---------------------------------------------------------------------------

/// A raw media candidate as observed by the crawl driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateMedia {
    #[serde(default, alias = "src", alias = "url")]
    pub raw_url: String,
    #[serde(default, alias = "alt")]
    pub alt_text: Option<String>,
    /// The enclosing post or pin link, when the driver could resolve one.
    #[serde(default, alias = "href")]
    pub link_url: Option<String>,
    /// Raw element attributes, e.g. `width`, `height`, `srcset`.
    #[serde(default, alias = "attributes")]
    pub raw_attributes: BTreeMap<String, String>,
}

impl CandidateMedia {
    #[must_use]
    pub fn new(raw_url: impl Into<String>) -> Self {
        Self {
            raw_url: raw_url.into(),
            ..Self::default()
        }
    }
}

/// Normalized identity for a media item. `canonical_url` is the dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalImage {
    pub canonical_url: String,
    pub thumbnail_url: String,
    pub source_alt: String,
    pub source_link: Option<String>,
    pub captured_at: DateTime<Utc>,
}

/// A `w:h` aspect ratio, serialized as its display string (`"9:16"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Decimal `width / height`.
    #[must_use]
    pub fn decimal(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("aspect ratio '{s}' must look like 'w:h'"))?;
        let width = parse_positive(w, s)?;
        let height = parse_positive(h, s)?;
        Ok(Self { width, height })
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.to_string()
    }
}

/// Exact pixel dimensions, serialized as `"WxH"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when `(width, height)` equals this size in either orientation.
    #[must_use]
    pub fn matches_either_way(self, width: u32, height: u32) -> bool {
        (self.width == width && self.height == height)
            || (self.width == height && self.height == width)
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for PixelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("dimensions '{s}' must look like 'WxH'"))?;
        let width = parse_positive(w, s)?;
        let height = parse_positive(h, s)?;
        Ok(Self { width, height })
    }
}

impl TryFrom<String> for PixelSize {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PixelSize> for String {
    fn from(value: PixelSize) -> Self {
        value.to_string()
    }
}

fn parse_positive(part: &str, whole: &str) -> Result<u32, String> {
    match part.trim().parse::<u32>() {
        Ok(0) => Err(format!("'{whole}' has a zero component")),
        Ok(v) => Ok(v),
        Err(e) => Err(format!("'{whole}': {e}")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Perfect,
    Croppable,
    Rejected,
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityTier::Perfect => write!(f, "perfect"),
            QualityTier::Croppable => write!(f, "croppable"),
            QualityTier::Rejected => write!(f, "rejected"),
        }
    }
}

/// Outcome of the dimension classifier.
///
/// `tier != Rejected` iff `matched_ratio.is_some()` iff `score > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub width: u32,
    pub height: u32,
    pub matched_ratio: Option<AspectRatio>,
    pub tier: QualityTier,
    pub score: u8,
}

impl QualityAssessment {
    #[must_use]
    pub fn rejected(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            matched_ratio: None,
            tier: QualityTier::Rejected,
            score: 0,
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.tier != QualityTier::Rejected
    }
}

/// An accepted image. `quality` is present only when dimension data existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageItem {
    #[serde(flatten)]
    pub image: CanonicalImage,
    pub quality: Option<QualityAssessment>,
}

// ---------------------------------------------------------------------------
// Post side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub bookmarks: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub user_id: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
}

/// A normalized social post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: Option<String>,
    pub is_multi_image: bool,
    pub caption: String,
    pub hook: String,
    pub hashtags: BTreeSet<String>,
    pub mentions: BTreeSet<String>,
    pub stats: PostStats,
    /// Image URLs for multi-image posts, otherwise the video reference if any.
    pub media_urls: Vec<String>,
    pub cover_url: Option<String>,
    pub music_url: Option<String>,
    pub author: PostAuthor,
    pub created_at: Option<DateTime<Utc>>,
    pub permalink: Option<String>,
}

/// Rhetorical hook categories, in tie-break priority order.
///
/// `General` and `Unknown` are fallbacks and never produced by a pattern hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookCategory {
    Question,
    Statement,
    Story,
    List,
    Challenge,
    Emotional,
    Educational,
    Controversial,
    General,
    Unknown,
}

impl HookCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HookCategory::Question => "question",
            HookCategory::Statement => "statement",
            HookCategory::Story => "story",
            HookCategory::List => "list",
            HookCategory::Challenge => "challenge",
            HookCategory::Emotional => "emotional",
            HookCategory::Educational => "educational",
            HookCategory::Controversial => "controversial",
            HookCategory::General => "general",
            HookCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HookCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookClassification {
    /// Weights sum to 1.0, or a single `general`/`unknown` fallback entry.
    pub category_weights: BTreeMap<HookCategory, f64>,
    pub primary_category: HookCategory,
    /// In `[0, 1]`.
    pub quality_score: f64,
}

/// Surface features of a hook feeding the quality score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookAnalysis {
    pub length: usize,
    pub word_count: usize,
    pub has_emoji: bool,
    pub has_caps: bool,
    pub has_punctuation: bool,
    pub has_numbers: bool,
    pub urgency_words: usize,
    pub curiosity_score: f64,
    pub clarity_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookComponents {
    pub opening: String,
    pub body: String,
    pub call_to_action: String,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
}

/// A post together with everything derived from its hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedPost {
    pub post: PostRecord,
    pub classification: HookClassification,
    pub analysis: HookAnalysis,
    pub components: HookComponents,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Why a candidate did not make it into a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    MalformedInput,
    VideoPlaceholder,
    TinyImage,
    UnrecognizedUrl,
    DimensionsRejected,
    MissingDimensions,
    NotMultiImage,
    Duplicate,
    TargetReached,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectionReason::MalformedInput => "malformed_input",
            RejectionReason::VideoPlaceholder => "video_placeholder",
            RejectionReason::TinyImage => "tiny_image",
            RejectionReason::UnrecognizedUrl => "unrecognized_url",
            RejectionReason::DimensionsRejected => "dimensions_rejected",
            RejectionReason::MissingDimensions => "missing_dimensions",
            RejectionReason::NotMultiImage => "not_multi_image",
            RejectionReason::Duplicate => "duplicate",
            RejectionReason::TargetReached => "target_reached",
        };
        f.write_str(s)
    }
}
