//! Concurrent download, validation and retry of document candidates
//!
//! This module contains the download half of the pipeline, including:
//! - Staged file naming and streaming writes
//! - Fixed-delay retry of a whole download attempt
//! - The bounded worker pool that turns candidates into `FetchResult`s

mod engine;
mod retry;
mod staging;

pub use engine::DownloadEngine;
pub use retry::{retry_with_delay, RetryPolicy};
pub use staging::{remove_staged, staged_filename, stream_to_file};

use crate::config::CrawlerConfig;
use crate::crawler::FetchError;
use crate::document::DocumentError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a single download attempt did not yield a valid document
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("response body was empty")]
    EmptyBody,

    #[error("invalid document: {0}")]
    Invalid(#[from] DocumentError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("validation task failed: {0}")]
    Join(String),
}

/// Outcome of processing one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Downloaded and validated; the staged file is on disk
    Success {
        index: usize,
        staged_path: PathBuf,
        units: usize,
    },

    /// Every attempt failed; no staged bytes remain
    Failure { index: usize, reason: String },
}

impl FetchResult {
    /// Discovery index of the candidate this result belongs to
    pub fn index(&self) -> usize {
        match self {
            FetchResult::Success { index, .. } | FetchResult::Failure { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }
}

/// Worker pool and retry knobs for the download engine
#[derive(Debug, Clone, Copy)]
pub struct DownloadSettings {
    /// Maximum number of candidates in flight at once
    pub workers: usize,

    pub retry: RetryPolicy,

    /// Budget for one download attempt, body transfer included
    pub timeout: Duration,
}

impl DownloadSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            workers: (config.workers as usize).max(1),
            retry: RetryPolicy::new(config.max_attempts, config.retry_delay()),
            timeout: config.document_timeout(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}
