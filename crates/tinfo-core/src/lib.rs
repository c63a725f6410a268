mod app_config;
mod config;
pub mod posts;
pub mod regions;
pub mod run;
pub mod targets;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{Category, CategoryBreakdown, NewPost, PostStatus, RawPost};
pub use regions::{load_regions, Region, RegionCatalog, RegionsFile, DEFAULT_REGION};
pub use run::{
    normalize_days, normalize_limit, IgnorePolicy, RunParameters, RunStatus, RunSummary,
    DEFAULT_DAYS, DEFAULT_LIMIT, MAX_DAYS, MAX_LIMIT,
};
pub use targets::{Target, TargetKind};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read regions file {path}: {source}")]
    RegionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse regions file: {0}")]
    RegionsFileParse(#[from] serde_yaml::Error),

    #[error("regions validation error: {0}")]
    Validation(String),

    #[error("unknown region '{0}' and no explicit targets were given")]
    UnknownRegion(String),
}
