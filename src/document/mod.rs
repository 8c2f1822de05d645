//! Document formats
//!
//! The download engine and merge coordinator only need two things from a
//! document type: count its structural units (validation) and concatenate
//! several files into one. `DocumentFormat` is that seam; `PdfFormat` is the
//! implementation used by the binary.

mod pdf;

pub use pdf::PdfFormat;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while validating or merging documents
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("document has no pages")]
    NoUnits,

    #[error("nothing to merge")]
    NoInputs,

    #[error("malformed document structure: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A document type the pipeline can validate and merge
pub trait DocumentFormat: Send + Sync {
    /// Extension forced onto staged files, lowercase with the leading dot
    fn extension(&self) -> &str;

    /// Parses the file and returns its unit count
    ///
    /// Implementations return `DocumentError::NoUnits` rather than `Ok(0)`.
    fn count_units(&self, path: &Path) -> Result<usize, DocumentError>;

    /// Concatenates `inputs`, in order, into `output`
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), DocumentError>;
}
