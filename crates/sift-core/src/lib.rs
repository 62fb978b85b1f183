pub mod app_config;
pub mod config;
pub mod error;
pub mod pipeline_config;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, load_sift_config, SiftConfig};
pub use error::ConfigError;
pub use pipeline_config::{
    load_pipeline_config, parse_pipeline_config, validate_pipeline, PipelineConfig,
    RatioCatalog,
};
pub use types::{
    AspectRatio, CandidateMedia, CanonicalImage, ClassifiedPost, HookAnalysis, HookCategory,
    HookClassification, HookComponents, ImageItem, PixelSize, PostAuthor, PostRecord, PostStats,
    QualityAssessment, QualityTier, RejectionReason,
};
