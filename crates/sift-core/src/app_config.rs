use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level settings read from the environment.
///
/// The `*_override` fields, when set, replace the matching values from the
/// pipeline config file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub config_path: PathBuf,
    /// Whether `config_path` came from `SIFT_CONFIG_PATH` rather than the default.
    pub config_path_explicit: bool,
    pub output_dir: PathBuf,
    pub max_concurrent_runs: usize,
    pub target_count_override: Option<usize>,
    pub stall_patience_override: Option<u32>,
    pub aspect_tolerance_override: Option<f64>,
}
