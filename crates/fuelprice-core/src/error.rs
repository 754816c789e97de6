// crates/fuelprice-core/src/error.rs

use std::path::PathBuf;

use fuelprice_parser::ParserError;
use thiserror::Error;

/// Load-time failures. Any of these aborts startup; there is no partial load.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to read dataset at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset: {0}")]
    Parser(#[from] ParserError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("failed to parse configuration TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
