//! Paper-Trawl: a document harvester for linked page sets
//!
//! This crate walks the pages reachable from a seed URL, collects the document
//! links they contain, downloads and validates those documents concurrently,
//! and merges the valid ones into a single artifact in discovery order.

pub mod config;
pub mod crawler;
pub mod document;
pub mod download;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Paper-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Seed page {url} is unreachable: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("No date pattern found in URL template: {0}")]
    NoDatePattern(String),
}

/// Result type alias for Paper-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use output::MergeOutcome;
pub use pipeline::{Pipeline, PipelineReport};
pub use state::PageState;
pub use url::{extract_domain, normalize_url};
