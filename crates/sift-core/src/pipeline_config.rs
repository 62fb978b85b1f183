//! Pipeline tuning loaded from `config/sift.yaml`.
//!
//! Every key is optional; absent keys fall back to [`PipelineConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{AspectRatio, PixelSize};
use crate::ConfigError;

/// Target aspect ratios split into priority tiers, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioCatalog {
    pub perfect: Vec<AspectRatio>,
    pub croppable: Vec<AspectRatio>,
}

impl Default for RatioCatalog {
    fn default() -> Self {
        Self {
            perfect: vec![
                AspectRatio::new(9, 16),
                AspectRatio::new(1, 1),
                AspectRatio::new(4, 5),
            ],
            croppable: vec![
                AspectRatio::new(3, 4),
                AspectRatio::new(2, 3),
                AspectRatio::new(5, 8),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub target_aspect_ratios: RatioCatalog,
    /// Nominal floor for `max(width, height)`; the classifier applies 80% of it.
    pub min_resolution: u32,
    /// Exact sizes (either orientation) that earn the top score of their tier.
    pub preferred_dimensions: Vec<PixelSize>,
    /// Absolute difference allowed between `w/h` and a catalog ratio.
    pub aspect_tolerance: f64,
    pub stall_patience: u32,
    pub post_stall_patience: u32,
    pub hook_max_length: usize,
    pub slideshow_indicator_words: Vec<String>,
    pub target_count: usize,
    /// Width-only thumbnail buckets that may be rewritten to `originals`.
    pub thumbnail_buckets: Vec<String>,
    /// Size buckets used for avatars and icons; never content.
    pub tiny_size_markers: Vec<String>,
    pub require_dimensions: bool,
    pub slideshows_only: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_aspect_ratios: RatioCatalog::default(),
            min_resolution: 1000,
            preferred_dimensions: vec![
                PixelSize::new(1080, 1920),
                PixelSize::new(1080, 1080),
                PixelSize::new(1080, 1350),
                PixelSize::new(1080, 1440),
                PixelSize::new(1080, 1620),
                PixelSize::new(1080, 1728),
            ],
            aspect_tolerance: 0.03,
            stall_patience: 15,
            post_stall_patience: 3,
            hook_max_length: 50,
            slideshow_indicator_words: [
                "photo",
                "slideshow",
                "carousel",
                "swipe",
                "album",
                "ImagePost",
                "multi",
                "gallery",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            target_count: 50,
            thumbnail_buckets: ["170x", "236x", "474x", "564x", "736x", "1200x"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            tiny_size_markers: ["30x30", "60x60", "75x75", "140x140"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            require_dimensions: false,
            slideshows_only: true,
        }
    }
}

/// Load and validate the pipeline configuration from a YAML file.
///
/// An empty file yields the defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config = parse_pipeline_config(&content)?;
    validate_pipeline(&config)?;

    Ok(config)
}

/// Parse a YAML document into a [`PipelineConfig`] without validating it.
///
/// # Errors
///
/// Returns [`ConfigError::ConfigFileParse`] for malformed YAML or values that
/// do not fit the schema (e.g. a ratio written as `"9-16"`).
pub fn parse_pipeline_config(content: &str) -> Result<PipelineConfig, ConfigError> {
    if content.trim().is_empty() {
        return Ok(PipelineConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Check cross-field constraints that serde cannot express.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first violation.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<(), ConfigError> {
    let catalog = &config.target_aspect_ratios;
    if catalog.perfect.is_empty() && catalog.croppable.is_empty() {
        return Err(ConfigError::Validation(
            "target_aspect_ratios must list at least one ratio".to_string(),
        ));
    }

    if !(config.aspect_tolerance > 0.0 && config.aspect_tolerance < 1.0) {
        return Err(ConfigError::Validation(format!(
            "aspect_tolerance {} must be in (0, 1)",
            config.aspect_tolerance
        )));
    }

    if config.hook_max_length == 0 {
        return Err(ConfigError::Validation(
            "hook_max_length must be positive".to_string(),
        ));
    }

    if config.target_count == 0 {
        return Err(ConfigError::Validation(
            "target_count must be positive".to_string(),
        ));
    }

    if let Some(word) = config
        .slideshow_indicator_words
        .iter()
        .find(|w| w.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "slideshow_indicator_words contains a blank entry: '{word}'"
        )));
    }

    for bucket in &config.thumbnail_buckets {
        if bucket.trim().is_empty() || bucket == "originals" {
            return Err(ConfigError::Validation(format!(
                "invalid thumbnail bucket '{bucket}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(validate_pipeline(&PipelineConfig::default()).is_ok());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = parse_pipeline_config("  \n").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let cfg = parse_pipeline_config("aspect_tolerance: 0.1\nhook_max_length: 80\n").unwrap();
        assert!((cfg.aspect_tolerance - 0.1).abs() < f64::EPSILON);
        assert_eq!(cfg.hook_max_length, 80);
        assert_eq!(cfg.min_resolution, 1000);
        assert_eq!(cfg.target_aspect_ratios, RatioCatalog::default());
    }

    #[test]
    fn ratio_strings_are_parsed() {
        let yaml = "target_aspect_ratios:\n  perfect: [\"9:16\"]\n  croppable: [\"2:3\", \"5:8\"]\n";
        let cfg = parse_pipeline_config(yaml).unwrap();
        assert_eq!(cfg.target_aspect_ratios.perfect, vec![AspectRatio::new(9, 16)]);
        assert_eq!(cfg.target_aspect_ratios.croppable.len(), 2);
    }

    #[test]
    fn malformed_ratio_is_a_parse_error() {
        let yaml = "target_aspect_ratios:\n  perfect: [\"9-16\"]\n";
        let err = parse_pipeline_config(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileParse(_)));
    }

    #[test]
    fn preferred_dimensions_are_parsed() {
        let yaml = "preferred_dimensions: [\"1080x1920\", \"720X1280\"]\n";
        let cfg = parse_pipeline_config(yaml).unwrap();
        assert_eq!(
            cfg.preferred_dimensions,
            vec![PixelSize::new(1080, 1920), PixelSize::new(720, 1280)]
        );
    }

    #[test]
    fn validate_rejects_empty_catalog() {
        let mut cfg = PipelineConfig::default();
        cfg.target_aspect_ratios.perfect.clear();
        cfg.target_aspect_ratios.croppable.clear();
        let err = validate_pipeline(&cfg).unwrap_err();
        assert!(err.to_string().contains("at least one ratio"));
    }

    #[test]
    fn validate_rejects_out_of_range_tolerance() {
        for bad in [0.0, -0.1, 1.0, 2.5] {
            let cfg = PipelineConfig {
                aspect_tolerance: bad,
                ..PipelineConfig::default()
            };
            assert!(validate_pipeline(&cfg).is_err(), "tolerance {bad} accepted");
        }
    }

    #[test]
    fn validate_rejects_zero_target_and_hook_length() {
        let cfg = PipelineConfig {
            target_count: 0,
            ..PipelineConfig::default()
        };
        assert!(validate_pipeline(&cfg)
            .unwrap_err()
            .to_string()
            .contains("target_count"));

        let cfg = PipelineConfig {
            hook_max_length: 0,
            ..PipelineConfig::default()
        };
        assert!(validate_pipeline(&cfg)
            .unwrap_err()
            .to_string()
            .contains("hook_max_length"));
    }

    #[test]
    fn validate_rejects_originals_as_thumbnail_bucket() {
        let mut cfg = PipelineConfig::default();
        cfg.thumbnail_buckets.push("originals".to_string());
        assert!(validate_pipeline(&cfg).is_err());
    }

    #[test]
    fn load_pipeline_config_from_repo_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("sift.yaml");
        assert!(path.exists(), "sift.yaml missing at {path:?}");
        let cfg = load_pipeline_config(&path).expect("failed to load sift.yaml");
        assert!(!cfg.target_aspect_ratios.perfect.is_empty());
        assert_eq!(cfg.hook_max_length, 50);
    }

    #[test]
    fn load_pipeline_config_missing_file_is_io_error() {
        let err = load_pipeline_config(Path::new("/definitely/not/here/sift.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileIo { .. }));
    }
}
