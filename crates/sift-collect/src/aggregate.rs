//! Grouping and summary statistics over finished runs. No I/O.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use sift_core::{ClassifiedPost, HookCategory, ImageItem, QualityTier};

const TOP_PHRASES: usize = 10;
const TOP_WORDS: usize = 20;
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were",
];
const LENGTH_BUCKETS: &[(usize, &str)] = &[(20, "0-20"), (40, "21-40"), (60, "41-60"), (80, "61-80")];
const LONGEST_BUCKET: &str = "81+";
const UNMATCHED_RATIO: &str = "unmatched";

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageSummary {
    pub total: usize,
    pub per_tier: BTreeMap<QualityTier, usize>,
    pub per_ratio: BTreeMap<String, usize>,
    /// Mean score over items that carry an assessment.
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageReport {
    /// Tier → ratio label → items, in input order.
    pub by_tier: BTreeMap<QualityTier, BTreeMap<String, Vec<ImageItem>>>,
    /// Accepted without dimension data.
    pub unrated: Vec<ImageItem>,
    pub summary: ImageSummary,
}

#[must_use]
pub fn aggregate_images(items: &[ImageItem]) -> ImageReport {
    let mut report = ImageReport::default();
    let mut score_total = 0_u64;
    let mut rated = 0_u32;

    for item in items {
        report.summary.total += 1;
        let Some(quality) = &item.quality else {
            report.unrated.push(item.clone());
            continue;
        };

        let label = quality
            .matched_ratio
            .map_or_else(|| UNMATCHED_RATIO.to_string(), |r| r.to_string());

        *report.summary.per_tier.entry(quality.tier).or_insert(0) += 1;
        *report.summary.per_ratio.entry(label.clone()).or_insert(0) += 1;
        report
            .by_tier
            .entry(quality.tier)
            .or_default()
            .entry(label)
            .or_default()
            .push(item.clone());

        score_total += u64::from(quality.score);
        rated += 1;
    }

    if rated > 0 {
        #[allow(clippy::cast_precision_loss)]
        let mean = score_total as f64 / f64::from(rated);
        report.summary.average_score = Some(mean);
    }
    report
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostSummary {
    pub total_posts: usize,
    pub multi_image_posts: usize,
    /// Posts with a non-empty hook.
    pub hook_count: usize,
    pub per_category: BTreeMap<HookCategory, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookStatistics {
    pub avg_quality_score: f64,
    pub max_quality_score: f64,
    pub min_quality_score: f64,
    pub avg_hook_length: f64,
    pub avg_word_count: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseCount {
    pub pattern: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HookPatterns {
    pub common_openings: Vec<PhraseCount>,
    pub common_endings: Vec<PhraseCount>,
    pub frequent_words: Vec<PhraseCount>,
    pub length_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostReport {
    pub by_category: BTreeMap<HookCategory, Vec<ClassifiedPost>>,
    pub summary: PostSummary,
    /// `None` when no post has a hook.
    pub hook_statistics: Option<HookStatistics>,
    pub patterns: HookPatterns,
}

#[must_use]
pub fn aggregate_posts(posts: &[ClassifiedPost]) -> PostReport {
    let mut report = PostReport::default();

    for post in posts {
        let category = post.classification.primary_category;
        report.summary.total_posts += 1;
        if post.post.is_multi_image {
            report.summary.multi_image_posts += 1;
        }
        *report.summary.per_category.entry(category).or_insert(0) += 1;
        report
            .by_category
            .entry(category)
            .or_default()
            .push(post.clone());
    }

    let hooked: Vec<&ClassifiedPost> = posts
        .iter()
        .filter(|p| !p.post.hook.trim().is_empty())
        .collect();
    report.summary.hook_count = hooked.len();
    report.hook_statistics = hook_statistics(&hooked);

    let hooks: Vec<&str> = hooked.iter().map(|p| p.post.hook.as_str()).collect();
    report.patterns = hook_patterns(&hooks);
    report
}

#[allow(clippy::cast_precision_loss)]
fn hook_statistics(posts: &[&ClassifiedPost]) -> Option<HookStatistics> {
    if posts.is_empty() {
        return None;
    }
    let n = posts.len() as f64;
    let scores = posts.iter().map(|p| p.classification.quality_score);

    Some(HookStatistics {
        avg_quality_score: scores.clone().sum::<f64>() / n,
        max_quality_score: scores.clone().fold(f64::MIN, f64::max),
        min_quality_score: scores.fold(f64::MAX, f64::min),
        avg_hook_length: posts
            .iter()
            .map(|p| p.post.hook.chars().count() as f64)
            .sum::<f64>()
            / n,
        avg_word_count: posts
            .iter()
            .map(|p| p.post.hook.split_whitespace().count() as f64)
            .sum::<f64>()
            / n,
    })
}

/// Opening/ending phrases, frequent words and the length histogram.
#[must_use]
pub fn hook_patterns(hooks: &[&str]) -> HookPatterns {
    let mut openings = Vec::new();
    let mut endings = Vec::new();
    let mut words = Vec::new();
    let mut length_distribution: BTreeMap<String, usize> = LENGTH_BUCKETS
        .iter()
        .map(|(_, label)| ((*label).to_string(), 0))
        .chain(std::iter::once((LONGEST_BUCKET.to_string(), 0)))
        .collect();

    for hook in hooks {
        let tokens: Vec<String> = hook.split_whitespace().map(str::to_lowercase).collect();
        if !tokens.is_empty() {
            openings.push(tokens[..tokens.len().min(2)].join(" "));
        }
        if tokens.len() > 2 {
            endings.push(tokens[tokens.len() - 2..].join(" "));
        }
        words.extend(
            tokens
                .into_iter()
                .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(&w.as_str())),
        );

        let length = hook.chars().count();
        let bucket = LENGTH_BUCKETS
            .iter()
            .find(|(max, _)| length <= *max)
            .map_or(LONGEST_BUCKET, |(_, label)| *label);
        if let Some(count) = length_distribution.get_mut(bucket) {
            *count += 1;
        }
    }

    HookPatterns {
        common_openings: most_common(openings, TOP_PHRASES),
        common_endings: most_common(endings, TOP_PHRASES),
        frequent_words: most_common(words, TOP_WORDS),
        length_distribution,
    }
}

/// Counts sorted by frequency; ties keep first-seen order.
fn most_common(values: Vec<String>, limit: usize) -> Vec<PhraseCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<PhraseCount> = Vec::new();
    for value in values {
        if let Some(&i) = index.get(&value) {
            counts[i].count += 1;
        } else {
            index.insert(value.clone(), counts.len());
            counts.push(PhraseCount {
                pattern: value,
                count: 1,
            });
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

// ---------------------------------------------------------------------------
// Combined
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateSummary {
    pub images: ImageSummary,
    pub posts: PostSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregate {
    pub by_tier: BTreeMap<QualityTier, BTreeMap<String, Vec<ImageItem>>>,
    pub by_category: BTreeMap<HookCategory, Vec<ClassifiedPost>>,
    pub summary: AggregateSummary,
}

#[must_use]
pub fn aggregate(images: &[ImageItem], posts: &[ClassifiedPost]) -> Aggregate {
    let image_report = aggregate_images(images);
    let post_report = aggregate_posts(posts);
    Aggregate {
        by_tier: image_report.by_tier,
        by_category: post_report.by_category,
        summary: AggregateSummary {
            images: image_report.summary,
            posts: post_report.summary,
        },
    }
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
