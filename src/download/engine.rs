//! Bounded worker pool for document downloads
//!
//! Every candidate gets its own task; a semaphore caps how many of them are
//! transferring at once. Each task retries its candidate as a whole
//! (request, stream to disk, validate) and always ends in exactly one
//! `FetchResult`.

use super::staging::{remove_staged, staged_filename, stream_to_file};
use super::{retry_with_delay, CandidateError, DownloadSettings, FetchResult};
use crate::crawler::{send_get, Candidate};
use crate::document::DocumentFormat;
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Reason recorded for a candidate whose worker died without reporting
const LOST_WORKER: &str = "download task terminated unexpectedly";

/// Downloads candidates concurrently into a staging directory
#[derive(Clone)]
pub struct DownloadEngine {
    inner: Arc<WorkerContext>,
}

struct WorkerContext {
    client: Client,
    format: Arc<dyn DocumentFormat>,
    settings: DownloadSettings,
}

impl DownloadEngine {
    pub fn new(client: Client, format: Arc<dyn DocumentFormat>, settings: DownloadSettings) -> Self {
        Self {
            inner: Arc::new(WorkerContext {
                client,
                format,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.inner.settings
    }

    /// Processes every candidate and returns one result per candidate
    ///
    /// Results come back in candidate order regardless of which download
    /// finished first. Staged files of successful candidates are left in
    /// `output_dir` for the merge step; failed candidates leave nothing.
    /// `run_tag` prefixes every staged name so runs sharing `output_dir`
    /// never touch each other's files.
    pub async fn download_all(
        &self,
        candidates: &[Candidate],
        output_dir: &Path,
        run_tag: &str,
    ) -> Vec<FetchResult> {
        let workers = self.inner.settings.workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        tracing::info!(
            "Downloading {} documents with {} workers",
            candidates.len(),
            workers
        );

        let staged: Vec<(Candidate, PathBuf)> = candidates
            .iter()
            .map(|candidate| {
                let name = staged_filename(
                    &candidate.url,
                    run_tag,
                    candidate.index,
                    self.inner.format.extension(),
                );
                (candidate.clone(), output_dir.join(name))
            })
            .collect();

        for (candidate, path) in staged.iter().cloned() {
            let ctx = Arc::clone(&self.inner);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return FetchResult::Failure {
                            index: candidate.index,
                            reason: e.to_string(),
                        }
                    }
                };
                ctx.process(&candidate, &path).await
            });
        }

        let mut finished: HashMap<usize, FetchResult> = HashMap::with_capacity(staged.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    finished.insert(result.index(), result);
                }
                Err(e) => tracing::error!("Download task failed: {}", e),
            }
        }

        let mut results = Vec::with_capacity(staged.len());
        for (candidate, path) in &staged {
            match finished.remove(&candidate.index) {
                Some(result) => results.push(result),
                None => {
                    remove_staged(path).await;
                    results.push(FetchResult::Failure {
                        index: candidate.index,
                        reason: LOST_WORKER.to_string(),
                    });
                }
            }
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            "Downloads finished: {} valid, {} failed",
            succeeded,
            results.len() - succeeded
        );

        results
    }
}

impl WorkerContext {
    async fn process(&self, candidate: &Candidate, path: &Path) -> FetchResult {
        let ctx = self;
        let outcome = retry_with_delay(&self.settings.retry, move |attempt| {
            ctx.attempt(candidate, path, attempt)
        })
        .await;

        match outcome {
            Ok(units) => {
                tracing::info!("Validated {} ({} pages)", candidate.url, units);
                FetchResult::Success {
                    index: candidate.index,
                    staged_path: path.to_path_buf(),
                    units,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Giving up on {} after {} attempts: {}",
                    candidate.url,
                    self.settings.retry.max_attempts,
                    e
                );
                remove_staged(path).await;
                FetchResult::Failure {
                    index: candidate.index,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// One attempt; a failed attempt never leaves a partial file behind
    async fn attempt(
        &self,
        candidate: &Candidate,
        path: &Path,
        attempt: u32,
    ) -> Result<usize, CandidateError> {
        tracing::debug!(
            "Downloading {} (attempt {}/{})",
            candidate.url,
            attempt,
            self.settings.retry.max_attempts
        );

        let result = self.download_and_validate(candidate, path).await;
        if result.is_err() {
            remove_staged(path).await;
        }
        result
    }

    async fn download_and_validate(
        &self,
        candidate: &Candidate,
        path: &Path,
    ) -> Result<usize, CandidateError> {
        let response = send_get(&self.client, &candidate.url, self.settings.timeout).await?;
        let written = stream_to_file(response, path).await?;
        if written == 0 {
            return Err(CandidateError::EmptyBody);
        }

        let format = Arc::clone(&self.format);
        let staged = path.to_path_buf();
        let units = tokio::task::spawn_blocking(move || format.count_units(&staged))
            .await
            .map_err(|e| CandidateError::Join(e.to_string()))??;

        Ok(units)
    }
}
