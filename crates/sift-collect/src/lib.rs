pub mod aggregate;
pub mod collector;
pub mod ledger;
pub mod pipeline;

pub use aggregate::{
    aggregate, aggregate_images, aggregate_posts, hook_patterns, Aggregate, AggregateSummary,
    HookPatterns, HookStatistics, ImageReport, ImageSummary, PhraseCount, PostReport, PostSummary,
};
pub use collector::{Collector, Offer};
pub use ledger::AcceptanceLedger;
pub use pipeline::{
    fallback_post_key, Decision, ImagePipeline, ImageRun, PostPipeline, PostRun,
};
