//! Shared configuration for the ulasan workspace.
//!
//! Holds the environment-driven [`AppConfig`] and the lexicon file format
//! consumed by the sentiment pipeline.

mod app_config;
mod config;
mod lexicon;

use thiserror::Error;

pub use app_config::{AppConfig, AppwriteConfig, Environment, StorageBackend};
pub use config::{load_app_config, load_app_config_from_env};
pub use lexicon::{builtin_lexicon, load_lexicon, parse_lexicon, LabelNames, LexiconFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read lexicon file {path}: {source}")]
    LexiconFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon file: {0}")]
    LexiconFileParse(#[from] serde_yaml::Error),

    #[error("lexicon validation failed: {0}")]
    Validation(String),
}
