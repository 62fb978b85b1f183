//! Rule-based hook categorization and quality scoring.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use sift_core::{
    ClassifiedPost, HookAnalysis, HookCategory, HookClassification, HookComponents, PostRecord,
};

/// One category, its weight, and its substring patterns (matched case-insensitively).
pub struct CategoryRule {
    pub category: HookCategory,
    pub weight: f64,
    pub patterns: &'static [&'static str],
}

/// Category rules in tie-break order.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: HookCategory::Question,
        weight: 1.5,
        patterns: &[
            r"^(what|why|how|when|where|who|which|can|do|does|did|is|are|will|would|should)",
            r"\?",
        ],
    },
    CategoryRule {
        category: HookCategory::Statement,
        weight: 1.0,
        patterns: &[r"^(i|you|we|they|this|that|here)", r"^[a-z]"],
    },
    CategoryRule {
        category: HookCategory::Story,
        weight: 1.3,
        patterns: &[
            r"^(once|yesterday|today|last|when i|story time|pov|imagine)",
            r"story",
            r"time",
        ],
    },
    CategoryRule {
        category: HookCategory::List,
        weight: 1.4,
        patterns: &[
            r"^(\d+|top|best|worst)",
            r"reasons?",
            r"ways?",
            r"things?",
            r"tips?",
        ],
    },
    CategoryRule {
        category: HookCategory::Challenge,
        weight: 1.2,
        patterns: &[
            r"challenge",
            r"try",
            r"can you",
            r"bet you",
            r"dare",
        ],
    },
    CategoryRule {
        category: HookCategory::Emotional,
        weight: 1.6,
        patterns: &[
            r"(never|always|everyone|no one|must|need)",
            r"!+$",
            r"[\x{1F631}\x{1F62D}\x{1F92F}\x{1F480}\x{1F525}]",
        ],
    },
    CategoryRule {
        category: HookCategory::Educational,
        weight: 1.3,
        patterns: &[
            r"learn",
            r"teach",
            r"explain",
            r"guide",
            r"tutorial",
            r"how to",
        ],
    },
    CategoryRule {
        category: HookCategory::Controversial,
        weight: 1.7,
        patterns: &[
            r"unpopular opinion",
            r"hot take",
            r"controversial",
            r"nobody talks about",
        ],
    },
];

static COMPILED_RULES: LazyLock<Vec<(HookCategory, f64, Vec<Regex>)>> = LazyLock::new(|| {
    CATEGORY_RULES
        .iter()
        .map(|rule| {
            let patterns = rule
                .patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).expect("valid category pattern"))
                .collect();
            (rule.category, rule.weight, patterns)
        })
        .collect()
});

static CAPS_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{2,}").expect("valid caps regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#@]\w+").expect("valid tag regex"));
static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("valid hashtag regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("valid mention regex"));

const CURIOSITY_TRIGGERS: &[&str] = &[
    "secret", "reveal", "discover", "hidden", "truth", "nobody", "everyone", "shocking",
];
const URGENCY_WORDS: &[&str] = &[
    "now",
    "today",
    "quick",
    "fast",
    "immediately",
    "urgent",
    "limited",
    "hurry",
];
const CTA_VERBS: &[&str] = &[
    "follow", "like", "share", "comment", "watch", "swipe", "tap", "click",
];

/// Normalized category weights for a hook.
///
/// Each matching pattern adds its rule's weight; per-category totals are
/// capped at 1.0 and the non-zero ones renormalized to sum to 1.0. A hook
/// with no hits maps to `{general: 1.0}`; a blank hook to `{unknown: 1.0}`.
#[must_use]
pub fn categorize(hook: &str) -> BTreeMap<HookCategory, f64> {
    let hook = hook.trim();
    if hook.is_empty() {
        return BTreeMap::from([(HookCategory::Unknown, 1.0)]);
    }

    let mut scores: BTreeMap<HookCategory, f64> = BTreeMap::new();
    for (category, weight, patterns) in COMPILED_RULES.iter() {
        let hits = patterns.iter().filter(|re| re.is_match(hook)).count();
        if hits > 0 {
            #[allow(clippy::cast_precision_loss)]
            let raw = weight * hits as f64;
            scores.insert(*category, raw.min(1.0));
        }
    }

    if scores.is_empty() {
        return BTreeMap::from([(HookCategory::General, 1.0)]);
    }

    let total: f64 = scores.values().sum();
    for weight in scores.values_mut() {
        *weight /= total;
    }
    scores
}

/// Category with the highest weight; ties go to the earlier category.
#[must_use]
pub fn primary_category(weights: &BTreeMap<HookCategory, f64>) -> HookCategory {
    let mut best: Option<(HookCategory, f64)> = None;
    for (&category, &weight) in weights {
        if best.is_none_or(|(_, top)| weight > top) {
            best = Some((category, weight));
        }
    }
    best.map_or(HookCategory::Unknown, |(category, _)| category)
}

/// Surface features of a hook.
#[must_use]
pub fn analyze_hook(hook: &str) -> HookAnalysis {
    let lower = hook.to_lowercase();
    let word_count = hook.split_whitespace().count();

    let curiosity_hits = count_present(&lower, CURIOSITY_TRIGGERS);
    let urgency_words = count_present(&lower, URGENCY_WORDS);

    #[allow(clippy::cast_precision_loss)]
    let curiosity_score = (curiosity_hits as f64 / 3.0).min(1.0);
    #[allow(clippy::cast_precision_loss)]
    let clarity_score = if word_count == 0 {
        0.0
    } else {
        (10.0 / word_count as f64).min(1.0)
    };

    HookAnalysis {
        length: hook.chars().count(),
        word_count,
        has_emoji: hook.chars().any(is_emoji),
        has_caps: CAPS_RUN_RE.is_match(hook),
        has_punctuation: hook.contains(['!', '?']),
        has_numbers: hook.chars().any(|c| c.is_ascii_digit()),
        urgency_words,
        curiosity_score,
        clarity_score,
    }
}

/// Weighted quality score in `[0, 1]`.
#[must_use]
pub fn score_quality(hook: &str) -> f64 {
    quality_from_analysis(&analyze_hook(hook))
}

fn quality_from_analysis(analysis: &HookAnalysis) -> f64 {
    let emoji = if analysis.has_emoji { 1.0 } else { 0.5 };
    let caps = if analysis.has_caps { 1.0 } else { 0.5 };
    #[allow(clippy::cast_precision_loss)]
    let urgency = (analysis.urgency_words as f64 / 2.0).min(1.0);

    0.3 * analysis.curiosity_score
        + 0.3 * analysis.clarity_score
        + 0.1 * emoji
        + 0.1 * caps
        + 0.2 * urgency
}

/// Split a hook into opening, body and call to action.
#[must_use]
pub fn hook_components(hook: &str) -> HookComponents {
    let hashtags = HASHTAG_RE
        .captures_iter(hook)
        .map(|c| c[1].to_string())
        .collect();
    let mentions = MENTION_RE
        .captures_iter(hook)
        .map(|c| c[1].to_string())
        .collect();

    let clean = TAG_RE.replace_all(hook, "");
    let words: Vec<&str> = clean.split_whitespace().collect();
    let n = words.len();

    let opening = words[..n.min(3)].join(" ");
    let body = match n {
        0..=3 => String::new(),
        4..=5 => words[3..].join(" "),
        _ => words[3..n - 2].join(" "),
    };
    let call_to_action = if n > 5 {
        let tail = words[n - 2..].join(" ");
        let lower = tail.to_lowercase();
        if CTA_VERBS.iter().any(|verb| lower.contains(verb)) {
            tail
        } else {
            String::new()
        }
    } else {
        String::new()
    };

    HookComponents {
        opening,
        body,
        call_to_action,
        hashtags,
        mentions,
    }
}

/// Weights, primary category and quality score for a hook.
#[must_use]
pub fn classify_hook(hook: &str) -> HookClassification {
    let category_weights = categorize(hook);
    let primary_category = primary_category(&category_weights);
    HookClassification {
        category_weights,
        primary_category,
        quality_score: score_quality(hook),
    }
}

/// Attach the hook classification, analysis and components to a post.
#[must_use]
pub fn classify_post(post: PostRecord) -> ClassifiedPost {
    let classification = classify_hook(&post.hook);
    let analysis = analyze_hook(&post.hook);
    let components = hook_components(&post.hook);
    ClassifiedPost {
        post,
        classification,
        analysis,
        components,
    }
}

/// Vocabulary terms occurring anywhere in `lower`, each counted once.
fn count_present(lower: &str, vocabulary: &[&str]) -> usize {
    vocabulary.iter().filter(|term| lower.contains(*term)).count()
}

fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F900..=0x1F9FF
            | 0x2600..=0x27BF
    )
}
