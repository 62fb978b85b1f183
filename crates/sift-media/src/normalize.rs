//! Canonical identity for media URLs.
//!
//! Image hosts serve the same asset under several size buckets
//! (`/236x/`, `/736x/`, `/originals/`). The canonical form is the
//! `originals` bucket, which doubles as the dedup key. Only the shapes
//! listed in [`UrlRules`] are rewritten; anything else is rejected rather
//! than guessed at.

use std::sync::LazyLock;

use regex::Regex;
use sift_core::{PipelineConfig, RejectionReason};

static MEDIA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(https?://[^/?#]+)/([^/?#]+)/(.+)$").expect("valid media url regex")
});
static HASH_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{2}/[0-9a-f]{2}/[0-9a-f]{2}/[^/?#]+(?:[?#].*)?$")
        .expect("valid hash path regex")
});
static FRAME_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.0{6}\d\.").expect("valid frame marker regex"));

const ORIGINALS: &str = "originals";

/// Why a URL has no canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UrlRejection {
    #[error("video placeholder frame")]
    VideoPlaceholder,
    #[error("avatar or icon size bucket")]
    TinyImage,
    #[error("unrecognized media url shape")]
    Unrecognized,
}

impl UrlRejection {
    /// Ledger key for this rejection.
    #[must_use]
    pub fn reason(self) -> RejectionReason {
        match self {
            UrlRejection::VideoPlaceholder => RejectionReason::VideoPlaceholder,
            UrlRejection::TinyImage => RejectionReason::TinyImage,
            UrlRejection::Unrecognized => RejectionReason::UnrecognizedUrl,
        }
    }
}

/// Size buckets the normalizer knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRules {
    pub thumbnail_buckets: Vec<String>,
    pub tiny_size_markers: Vec<String>,
}

impl UrlRules {
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            thumbnail_buckets: config.thumbnail_buckets.clone(),
            tiny_size_markers: config.tiny_size_markers.clone(),
        }
    }

    fn is_tiny(&self, bucket: &str) -> bool {
        let bucket = bucket.to_ascii_lowercase();
        let bare = bucket.strip_suffix("_rs").unwrap_or(&bucket);
        self.tiny_size_markers
            .iter()
            .any(|m| m.eq_ignore_ascii_case(bare))
    }

    fn is_thumbnail(&self, bucket: &str) -> bool {
        self.thumbnail_buckets
            .iter()
            .any(|b| b.eq_ignore_ascii_case(bucket))
    }
}

impl Default for UrlRules {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Map a raw media URL to its canonical `originals` form.
///
/// Checks run in a fixed order: video placeholders, tiny size buckets,
/// URLs already in `originals` (returned unchanged), then thumbnail buckets
/// followed by a `hh/hh/hh/<file>` hash path. Canonical output is a fixed
/// point, so the function is idempotent.
///
/// # Errors
///
/// Returns a [`UrlRejection`] when the URL is a video frame, an avatar-sized
/// bucket, or any shape outside the rules above.
pub fn normalize_media_url(raw: &str, rules: &UrlRules) -> Result<String, UrlRejection> {
    let raw = raw.trim();

    let caps = MEDIA_URL_RE
        .captures(raw)
        .ok_or(UrlRejection::Unrecognized)?;
    let origin = &caps[1];
    let bucket = &caps[2];
    let rest = &caps[3];

    if is_video_placeholder(bucket, rest) {
        return Err(UrlRejection::VideoPlaceholder);
    }

    if rules.is_tiny(bucket) {
        return Err(UrlRejection::TinyImage);
    }

    if bucket.eq_ignore_ascii_case(ORIGINALS) {
        return Ok(raw.to_string());
    }

    if rules.is_thumbnail(bucket) && HASH_PATH_RE.is_match(rest) {
        return Ok(format!("{origin}/{ORIGINALS}/{rest}"));
    }

    Err(UrlRejection::Unrecognized)
}

fn is_video_placeholder(bucket: &str, rest: &str) -> bool {
    let path = rest.split(['?', '#']).next().unwrap_or(rest);
    let in_videos = std::iter::once(bucket)
        .chain(path.split('/'))
        .any(|segment| segment.eq_ignore_ascii_case("videos"));
    let filename = path.rsplit('/').next().unwrap_or(path);

    in_videos || FRAME_MARKER_RE.is_match(filename)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
