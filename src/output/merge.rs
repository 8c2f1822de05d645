//! Deterministic merge of validated documents
//!
//! Successful results are concatenated strictly by discovery index, whatever
//! order the downloads finished in. Staged files are deleted only once the
//! merged artifact is confirmed on disk.

use crate::document::DocumentFormat;
use crate::download::FetchResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the merge step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// True when a non-empty merged artifact was written
    pub success: bool,

    /// Sum of units over merged inputs; 0 unless `success`
    pub total_units: usize,

    /// Where the merged artifact was (or would have been) written
    pub output_path: PathBuf,
}

impl MergeOutcome {
    fn failed(output_path: &Path) -> Self {
        Self {
            success: false,
            total_units: 0,
            output_path: output_path.to_path_buf(),
        }
    }
}

/// Merges every successful result into `output_path`
///
/// # Arguments
///
/// * `results` - Download results in any order
/// * `output_path` - Path of the merged artifact
/// * `format` - Document format used to concatenate the staged files
///
/// # Returns
///
/// A `MergeOutcome`. With no successful results nothing is written and the
/// outcome reports zero units. If the merge fails, staged files are left in
/// place for inspection and any empty output is removed.
pub fn merge_results(
    results: Vec<FetchResult>,
    output_path: &Path,
    format: &dyn DocumentFormat,
) -> MergeOutcome {
    let mut valid: Vec<(usize, PathBuf, usize)> = results
        .into_iter()
        .filter_map(|result| match result {
            FetchResult::Success {
                index,
                staged_path,
                units,
            } => Some((index, staged_path, units)),
            FetchResult::Failure { .. } => None,
        })
        .collect();

    if valid.is_empty() {
        tracing::warn!("No valid documents to merge");
        return MergeOutcome::failed(output_path);
    }

    valid.sort_by_key(|(index, _, _)| *index);

    let inputs: Vec<PathBuf> = valid.iter().map(|(_, path, _)| path.clone()).collect();
    let total_units: usize = valid.iter().map(|(_, _, units)| units).sum();

    tracing::info!(
        "Merging {} documents into {}",
        inputs.len(),
        output_path.display()
    );

    if let Err(e) = format.merge(&inputs, output_path) {
        tracing::error!("Merge into {} failed: {}", output_path.display(), e);
        discard_empty_output(output_path);
        return MergeOutcome::failed(output_path);
    }

    let written = fs::metadata(output_path).map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        tracing::error!(
            "Merged file {} is missing or empty",
            output_path.display()
        );
        discard_empty_output(output_path);
        return MergeOutcome::failed(output_path);
    }

    for path in &inputs {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to remove staged file {}: {}", path.display(), e);
        }
    }

    tracing::info!(
        "Merged {} documents ({} pages) into {}",
        inputs.len(),
        total_units,
        output_path.display()
    );

    MergeOutcome {
        success: true,
        total_units,
        output_path: output_path.to_path_buf(),
    }
}

fn discard_empty_output(path: &Path) {
    let empty = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(false);
    if empty {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to remove empty output {}: {}", path.display(), e);
        }
    }
}
