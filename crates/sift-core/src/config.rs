use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::pipeline_config::{load_pipeline_config, validate_pipeline, PipelineConfig};
use crate::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "./config/sift.yaml";

/// Fully resolved configuration: environment settings plus the pipeline file.
#[derive(Debug, Clone)]
pub struct SiftConfig {
    pub app: AppConfig,
    pub pipeline: PipelineConfig,
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load the environment settings and the pipeline config file they point at,
/// then apply env overrides.
///
/// A missing file at the default path yields the built-in defaults; a missing
/// file named by `SIFT_CONFIG_PATH` is an error.
///
/// # Errors
///
/// Returns `ConfigError` for invalid env values, unreadable or unparsable
/// config files, or a config that fails validation.
pub fn load_sift_config() -> Result<SiftConfig, ConfigError> {
    let app = load_app_config()?;
    resolve_sift_config(app)
}

fn resolve_sift_config(app: AppConfig) -> Result<SiftConfig, ConfigError> {
    let mut pipeline = if app.config_path_explicit || app.config_path.exists() {
        load_pipeline_config(&app.config_path)?
    } else {
        PipelineConfig::default()
    };

    apply_overrides(&app, &mut pipeline);
    validate_pipeline(&pipeline)?;

    Ok(SiftConfig { app, pipeline })
}

fn apply_overrides(app: &AppConfig, pipeline: &mut PipelineConfig) {
    if let Some(n) = app.target_count_override {
        pipeline.target_count = n;
    }
    if let Some(p) = app.stall_patience_override {
        pipeline.stall_patience = p;
    }
    if let Some(t) = app.aspect_tolerance_override {
        pipeline.aspect_tolerance = t;
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let optional_usize = |var: &str| -> Result<Option<usize>, ConfigError> {
        lookup(var)
            .ok()
            .map(|raw| raw.parse::<usize>().map_err(|e| invalid(var, e.to_string())))
            .transpose()
    };

    let optional_u32 = |var: &str| -> Result<Option<u32>, ConfigError> {
        lookup(var)
            .ok()
            .map(|raw| raw.parse::<u32>().map_err(|e| invalid(var, e.to_string())))
            .transpose()
    };

    let optional_f64 = |var: &str| -> Result<Option<f64>, ConfigError> {
        lookup(var)
            .ok()
            .map(|raw| raw.parse::<f64>().map_err(|e| invalid(var, e.to_string())))
            .transpose()
    };

    let env = parse_environment(&or_default("SIFT_ENV", "development"))?;
    let log_level = or_default("SIFT_LOG_LEVEL", "info");

    let explicit_path = lookup("SIFT_CONFIG_PATH").ok();
    let config_path_explicit = explicit_path.is_some();
    let config_path =
        PathBuf::from(explicit_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()));

    let output_dir = PathBuf::from(or_default("SIFT_OUTPUT_DIR", "./findings"));
    let max_concurrent_runs = parse_usize("SIFT_MAX_CONCURRENT_RUNS", "2")?;

    let target_count_override = optional_usize("SIFT_TARGET_COUNT")?;
    let stall_patience_override = optional_u32("SIFT_STALL_PATIENCE")?;
    let aspect_tolerance_override = optional_f64("SIFT_ASPECT_TOLERANCE")?;

    Ok(AppConfig {
        env,
        log_level,
        config_path,
        config_path_explicit,
        output_dir,
        max_concurrent_runs,
        target_count_override,
        stall_patience_override,
        aspect_tolerance_override,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for values other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SIFT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
