//! Page-count report over a directory of merged documents
//!
//! This module provides functionality for listing the documents in an
//! output directory together with their page counts.

use crate::document::DocumentFormat;
use crate::TrawlError;
use std::fs;
use std::path::Path;

/// Longest file name printed before truncation
const NAME_WIDTH: usize = 40;

/// Names longer than this are cut to this many characters plus ".."
const NAME_KEEP: usize = 37;

/// One file in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCount {
    /// File name relative to the scanned directory
    pub name: String,

    /// Page count, or the reason the file could not be read
    pub pages: Result<usize, String>,
}

/// Page counts for every document in a directory
#[derive(Debug, Clone, Default)]
pub struct PageCountReport {
    /// Files sorted by name
    pub files: Vec<FileCount>,
}

impl PageCountReport {
    /// Number of files that could be read
    pub fn readable_files(&self) -> usize {
        self.files.iter().filter(|f| f.pages.is_ok()).count()
    }

    /// Sum of pages over readable files
    pub fn total_pages(&self) -> usize {
        self.files.iter().filter_map(|f| f.pages.as_ref().ok()).sum()
    }

    /// Mean pages per readable file
    pub fn average_pages(&self) -> Option<f64> {
        match self.readable_files() {
            0 => None,
            n => Some(self.total_pages() as f64 / n as f64),
        }
    }
}

/// Counts pages of every file in `directory` matching the format's extension
///
/// # Arguments
///
/// * `directory` - The directory to scan (not recursive)
/// * `format` - Document format used for counting
///
/// # Returns
///
/// * `Ok(PageCountReport)` - Report, possibly with unreadable entries
/// * `Err(TrawlError)` - The directory itself could not be listed
pub fn count_directory(
    directory: &Path,
    format: &dyn DocumentFormat,
) -> Result<PageCountReport, TrawlError> {
    let extension = format.extension().to_lowercase();

    let mut names: Vec<String> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.to_lowercase().ends_with(&extension))
        .collect();
    names.sort();

    let files = names
        .into_iter()
        .map(|name| {
            let pages = format
                .count_units(&directory.join(&name))
                .map_err(|e| e.to_string());
            FileCount { name, pages }
        })
        .collect();

    Ok(PageCountReport { files })
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(directory: &Path, report: &PageCountReport) {
    if report.files.is_empty() {
        println!("No documents found in {}", directory.display());
        return;
    }

    println!(
        "Scanning {} files in {}",
        report.files.len(),
        directory.display()
    );
    println!("{}", "-".repeat(60));
    println!("{:<width$} | {:<10}", "File", "Pages", width = NAME_WIDTH);
    println!("{}", "-".repeat(60));

    for file in &report.files {
        let name = truncate_name(&file.name);
        match &file.pages {
            Ok(pages) => println!("{:<width$} | {:<10}", name, pages, width = NAME_WIDTH),
            Err(reason) => println!("{:<width$} | unreadable: {}", name, reason, width = NAME_WIDTH),
        }
    }
    println!("{}", "-".repeat(60));

    match report.average_pages() {
        Some(average) => {
            println!("Files      : {}", report.readable_files());
            println!("Total pages: {}", report.total_pages());
            println!("Average    : {:.2}", average);
        }
        None => println!("No readable documents."),
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_KEEP {
        let head: String = name.chars().take(NAME_KEEP).collect();
        format!("{}..", head)
    } else {
        name.to_string()
    }
}
