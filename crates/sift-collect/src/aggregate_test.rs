use std::collections::BTreeSet;

use chrono::Utc;
use sift_core::{
    AspectRatio, CanonicalImage, HookAnalysis, HookClassification, HookComponents, PostRecord,
    QualityAssessment,
};

use super::*;

fn image(url: &str, quality: Option<(QualityTier, AspectRatio, u8)>) -> ImageItem {
    ImageItem {
        image: CanonicalImage {
            canonical_url: url.to_string(),
            thumbnail_url: url.to_string(),
            source_alt: String::new(),
            source_link: None,
            captured_at: Utc::now(),
        },
        quality: quality.map(|(tier, ratio, score)| QualityAssessment {
            width: 1080,
            height: 1920,
            matched_ratio: Some(ratio),
            tier,
            score,
        }),
    }
}

fn post(hook: &str, category: HookCategory, quality: f64, multi: bool) -> ClassifiedPost {
    ClassifiedPost {
        post: PostRecord {
            hook: hook.to_string(),
            is_multi_image: multi,
            hashtags: BTreeSet::new(),
            ..PostRecord::default()
        },
        classification: HookClassification {
            category_weights: BTreeMap::from([(category, 1.0)]),
            primary_category: category,
            quality_score: quality,
        },
        analysis: HookAnalysis::default(),
        components: HookComponents::default(),
    }
}

// -----------------------------------------------------------------------
// images
// -----------------------------------------------------------------------

#[test]
fn images_are_bucketed_by_tier_then_ratio() {
    let nine_sixteen = AspectRatio::new(9, 16);
    let three_four = AspectRatio::new(3, 4);
    let items = vec![
        image("a", Some((QualityTier::Perfect, nine_sixteen, 100))),
        image("b", Some((QualityTier::Croppable, three_four, 70))),
        image("c", None),
        image("d", Some((QualityTier::Perfect, nine_sixteen, 90))),
    ];

    let report = aggregate_images(&items);

    let perfect = &report.by_tier[&QualityTier::Perfect]["9:16"];
    let urls: Vec<&str> = perfect.iter().map(|i| i.image.canonical_url.as_str()).collect();
    assert_eq!(urls, vec!["a", "d"]);
    assert_eq!(report.by_tier[&QualityTier::Croppable]["3:4"].len(), 1);
    assert_eq!(report.unrated.len(), 1);

    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.per_tier[&QualityTier::Perfect], 2);
    assert_eq!(report.summary.per_ratio["9:16"], 2);
    let avg = report.summary.average_score.unwrap();
    assert!((avg - 260.0 / 3.0).abs() < 1e-9);
}

#[test]
fn no_rated_images_means_no_average() {
    let report = aggregate_images(&[image("x", None)]);
    assert!(report.summary.average_score.is_none());
    assert!(report.by_tier.is_empty());
}

#[test]
fn image_report_serializes_tiers_as_lowercase_keys() {
    let items = vec![image("a", Some((QualityTier::Perfect, AspectRatio::new(1, 1), 95)))];
    let json = serde_json::to_value(aggregate_images(&items)).unwrap();
    assert_eq!(json["by_tier"]["perfect"]["1:1"][0]["canonical_url"], "a");
    assert_eq!(json["summary"]["per_tier"]["perfect"], 1);
}

// -----------------------------------------------------------------------
// posts
// -----------------------------------------------------------------------

#[test]
fn posts_are_grouped_by_primary_category() {
    let posts = vec![
        post("How to start?", HookCategory::Question, 0.5, true),
        post("This is amazing!", HookCategory::Statement, 0.7, true),
        post("Why not?", HookCategory::Question, 0.3, false),
        post("", HookCategory::Unknown, 0.1, true),
    ];
    let report = aggregate_posts(&posts);

    assert_eq!(report.by_category[&HookCategory::Question].len(), 2);
    assert_eq!(report.summary.total_posts, 4);
    assert_eq!(report.summary.multi_image_posts, 3);
    assert_eq!(report.summary.hook_count, 3);
    assert_eq!(report.summary.per_category[&HookCategory::Unknown], 1);

    let stats = report.hook_statistics.unwrap();
    assert!((stats.avg_quality_score - 0.5).abs() < 1e-9);
    assert!((stats.max_quality_score - 0.7).abs() < 1e-9);
    assert!((stats.min_quality_score - 0.3).abs() < 1e-9);
    assert!((stats.avg_word_count - 8.0 / 3.0).abs() < 1e-9);
}

#[test]
fn empty_post_set_has_no_statistics() {
    let report = aggregate_posts(&[]);
    assert!(report.hook_statistics.is_none());
    assert_eq!(report.patterns.length_distribution.values().sum::<usize>(), 0);
    assert_eq!(report.patterns.length_distribution.len(), 5);
}

#[test]
fn patterns_count_openings_endings_and_words() {
    let hooks = [
        "How to style a small desk",
        "How to light a small room",
        "Desk tour",
    ];
    let patterns = hook_patterns(&hooks);

    assert_eq!(
        patterns.common_openings[0],
        PhraseCount {
            pattern: "how to".to_string(),
            count: 2
        }
    );
    assert_eq!(patterns.common_endings.len(), 2, "two-word hooks have no ending");
    assert_eq!(patterns.frequent_words[0].pattern, "how");
    assert!(patterns.frequent_words.iter().all(|w| w.pattern != "to" && w.pattern != "a"));
    let desk = patterns.frequent_words.iter().find(|w| w.pattern == "desk").unwrap();
    assert_eq!(desk.count, 2);
}

#[test]
fn length_distribution_uses_char_buckets() {
    let twenty = "é".repeat(20);
    let twenty_one = "x".repeat(21);
    let long = "y".repeat(81);
    let patterns = hook_patterns(&[twenty.as_str(), twenty_one.as_str(), long.as_str()]);
    assert_eq!(patterns.length_distribution["0-20"], 1);
    assert_eq!(patterns.length_distribution["21-40"], 1);
    assert_eq!(patterns.length_distribution["81+"], 1);
    assert_eq!(patterns.length_distribution["61-80"], 0);
}

// -----------------------------------------------------------------------
// combined
// -----------------------------------------------------------------------

#[test]
fn aggregate_combines_both_reports() {
    let images = vec![image("a", Some((QualityTier::Perfect, AspectRatio::new(4, 5), 88)))];
    let posts = vec![post("Top 5 tips", HookCategory::List, 0.4, true)];
    let combined = aggregate(&images, &posts);
    assert_eq!(combined.summary.images.total, 1);
    assert_eq!(combined.summary.posts.total_posts, 1);
    assert!(combined.by_tier.contains_key(&QualityTier::Perfect));
    assert!(combined.by_category.contains_key(&HookCategory::List));
}
