//! Staged files for in-flight downloads
//!
//! Each candidate owns exactly one file under the output directory for the
//! lifetime of its task. The name is derived from the URL path and prefixed
//! with a per-run tag and the discovery index, so neither two candidates of
//! one run nor two runs sharing a directory ever collide.

use super::CandidateError;
use crate::crawler::FetchError;
use reqwest::Response;
use std::io::ErrorKind;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Characters that are not allowed in a staged filename
const RESERVED: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Fallback stem when the URL path has no usable last segment
const DEFAULT_STEM: &str = "document";

/// Builds the staged filename for a candidate
///
/// `run_tag` identifies the pipeline run (usually the merged file's stem);
/// an empty tag leaves only the index prefix.
///
/// # Examples
///
/// ```
/// use paper_trawl::download::staged_filename;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/pdf/2024/A01.PDF").unwrap();
/// assert_eq!(staged_filename(&url, "daily_2024-01-05", 3, ".pdf"), "daily_2024-01-05_0003_A01.PDF");
///
/// let url = Url::parse("https://example.com/get/report").unwrap();
/// assert_eq!(staged_filename(&url, "", 12, ".pdf"), "0012_report.pdf");
/// ```
pub fn staged_filename(url: &Url, run_tag: &str, index: usize, extension: &str) -> String {
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_STEM);

    let mut name = sanitize(last_segment);
    if !name.to_lowercase().ends_with(&extension.to_lowercase()) {
        name.push_str(extension);
    }

    let run_tag = sanitize(run_tag);
    if run_tag.is_empty() {
        format!("{:04}_{}", index, name)
    } else {
        format!("{}_{:04}_{}", run_tag, index, name)
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Streams a response body into `path`, returning the number of bytes written
///
/// The file is created (or truncated) before the first chunk arrives.
pub async fn stream_to_file(mut response: Response, path: &Path) -> Result<u64, CandidateError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?
    {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// Deletes a staged file, ignoring files that are already gone
pub async fn remove_staged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed staged file {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove staged file {}: {}", path.display(), e),
    }
}
