pub mod categorize;
pub mod detect;
pub mod extract;
pub mod hook;
pub mod payload;

pub use categorize::{
    analyze_hook, categorize, classify_hook, classify_post, hook_components, primary_category,
    score_quality, CategoryRule, CATEGORY_RULES,
};
pub use detect::{is_multi_image, matched_signals, Signal, SIGNALS};
pub use extract::{extract_post, PostRules};
pub use hook::{extract_hook, DEFAULT_HOOK_LENGTH};
pub use payload::{extract_feed_items, extract_rehydration_data, FEED_PROBES};
