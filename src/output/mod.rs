//! Output module for merged artifacts and reports
//!
//! This module handles:
//! - Merging validated documents into a single artifact in discovery order
//! - Cleaning up staged files once the merge is confirmed
//! - Page-count reports over an output directory

mod merge;
pub mod stats;

pub use merge::{merge_results, MergeOutcome};
pub use stats::{count_directory, print_report, FileCount, PageCountReport};
