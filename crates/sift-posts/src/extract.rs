//! Raw post record → [`PostRecord`].
//!
//! Post records come from several schema generations, so every field is
//! probed under a list of aliases. Missing or oddly-typed fields fall back
//! to defaults instead of failing the record.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use sift_core::{PipelineConfig, PostAuthor, PostRecord, PostStats};

use crate::detect::is_multi_image;
use crate::hook::{extract_hook, DEFAULT_HOOK_LENGTH};

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("valid hashtag regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("valid mention regex"));
static IMAGE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s"]+\.(?:jpg|jpeg|png|gif|webp)"#).expect("valid image url regex")
});

const ID_KEYS: &[&str] = &["id", "itemId", "video_id"];
const CAPTION_KEYS: &[&str] = &["desc", "description", "caption", "text", "title"];
const VIEW_KEYS: &[&str] = &["playCount", "play_count", "views", "video_play_count"];
const LIKE_KEYS: &[&str] = &["diggCount", "digg_count", "likes", "heart_count"];
const COMMENT_KEYS: &[&str] = &["commentCount", "comment_count", "comments"];
const SHARE_KEYS: &[&str] = &["shareCount", "share_count", "shares"];
const BOOKMARK_KEYS: &[&str] = &["collectCount", "collect_count", "bookmarks", "save_count"];
const STATS_CONTAINERS: &[&str] = &["stats", "statistics"];
const IMAGE_ENTRY_KEYS: &[&str] = &["url", "imageUrl", "imageURL"];
const VIDEO_ADDR_KEYS: &[&str] = &["downloadAddr", "download_addr", "playAddr", "play_addr", "url"];
const VIDEO_URL_KEYS: &[&str] = &["videoUrl", "video_url", "downloadUrl", "download_url"];
const COVER_KEYS: &[&str] = &["cover", "coverUrl", "cover_url", "thumbnail"];
const MUSIC_KEYS: &[&str] = &["playUrl", "play_url"];
const AUTHOR_KEYS: &[&str] = &["author", "creator", "user"];
const CREATED_KEYS: &[&str] = &["createTime", "create_time", "createdAt", "created_at", "timestamp"];

/// Knobs for post extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRules {
    pub indicators: Vec<String>,
    pub hook_max_length: usize,
}

impl PostRules {
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            indicators: config.slideshow_indicator_words.clone(),
            hook_max_length: config.hook_max_length,
        }
    }
}

impl Default for PostRules {
    fn default() -> Self {
        Self {
            indicators: PipelineConfig::default().slideshow_indicator_words,
            hook_max_length: DEFAULT_HOOK_LENGTH,
        }
    }
}

/// Build a [`PostRecord`] from a raw record. Returns `None` for non-objects.
#[must_use]
pub fn extract_post(record: &Value, rules: &PostRules) -> Option<PostRecord> {
    if !record.is_object() {
        return None;
    }

    let id = first_id(record, ID_KEYS);
    let caption = first_string(record, CAPTION_KEYS)
        .or_else(|| record.get("video").and_then(|v| first_string(v, CAPTION_KEYS)))
        .unwrap_or_default();
    let is_multi_image = is_multi_image(record, &rules.indicators);

    let media_urls = if is_multi_image {
        slideshow_images(record)
    } else {
        video_url(record).into_iter().collect()
    };

    let author = extract_author(record);
    let permalink = match (&id, &author.username) {
        (Some(id), Some(username)) => Some(format!("https://www.tiktok.com/@{username}/video/{id}")),
        _ => None,
    };

    Some(PostRecord {
        hook: extract_hook(&caption, rules.hook_max_length),
        hashtags: captures(&HASHTAG_RE, &caption),
        mentions: captures(&MENTION_RE, &caption),
        stats: extract_stats(record),
        media_urls,
        cover_url: first_string(record, COVER_KEYS)
            .or_else(|| record.get("video").and_then(|v| first_string(v, COVER_KEYS))),
        music_url: record.get("music").and_then(|m| first_string(m, MUSIC_KEYS)),
        created_at: extract_created_at(record),
        id,
        is_multi_image,
        caption,
        author,
        permalink,
    })
}

fn captures(re: &Regex, text: &str) -> BTreeSet<String> {
    re.captures_iter(text).map(|c| c[1].to_string()).collect()
}

/// First non-empty string under any of `keys`.
fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key)?.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Like [`first_string`], but numeric ids are rendered too.
fn first_id(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn first_count(record: &Value, keys: &[&str]) -> u64 {
    let containers = std::iter::once(record)
        .chain(STATS_CONTAINERS.iter().filter_map(|c| record.get(*c)));
    containers
        .flat_map(|container| keys.iter().filter_map(move |key| container.get(*key)))
        .find_map(as_count)
        .unwrap_or(0)
}

fn extract_stats(record: &Value) -> PostStats {
    PostStats {
        views: first_count(record, VIEW_KEYS),
        likes: first_count(record, LIKE_KEYS),
        comments: first_count(record, COMMENT_KEYS),
        shares: first_count(record, SHARE_KEYS),
        bookmarks: first_count(record, BOOKMARK_KEYS),
    }
}

fn image_entry_url(entry: &Value) -> Option<String> {
    match entry {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(_) => IMAGE_ENTRY_KEYS.iter().find_map(|key| match entry.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(nested) => nested
                .get("urlList")
                .and_then(Value::as_array)
                .and_then(|list| list.iter().find_map(Value::as_str))
                .map(str::to_string),
            _ => None,
        }),
        _ => None,
    }
}

fn slideshow_images(record: &Value) -> Vec<String> {
    let listed = record
        .get("images")
        .into_iter()
        .chain(record.get("imagePost").and_then(|p| p.get("images")))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(image_entry_url);

    let mut urls = dedup_in_order(listed);
    if urls.is_empty() {
        let serialized = serde_json::to_string(record).unwrap_or_default();
        urls = dedup_in_order(
            IMAGE_URL_RE
                .find_iter(&serialized)
                .map(|m| m.as_str().to_string()),
        );
    }
    urls
}

fn dedup_in_order(urls: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    urls.filter(|url| seen.insert(url.clone())).collect()
}

fn video_url(record: &Value) -> Option<String> {
    record
        .get("video")
        .and_then(|video| first_string(video, VIDEO_ADDR_KEYS))
        .or_else(|| first_string(record, VIDEO_URL_KEYS))
}

fn extract_author(record: &Value) -> PostAuthor {
    let Some(author) = AUTHOR_KEYS
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|v| v.is_object())
    else {
        return PostAuthor::default();
    };

    PostAuthor {
        username: first_string(author, &["uniqueId", "unique_id", "username"]),
        nickname: first_string(author, &["nickname", "nick_name"]),
        user_id: first_id(author, &["id", "uid", "user_id"]),
        avatar_url: first_string(author, &["avatarThumb", "avatar_thumb", "avatar"]),
        verified: author
            .get("verified")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn extract_created_at(record: &Value) -> Option<DateTime<Utc>> {
    CREATED_KEYS
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(parse_timestamp)
}

#[allow(clippy::cast_possible_truncation)]
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let from_secs = |secs: i64| Utc.timestamp_opt(secs, 0).single();
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(from_secs),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(secs) => from_secs(secs),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
