//! Single-seed pipeline: discover, collect, download, merge
//!
//! One `Pipeline::run` handles one fully-resolved seed URL. Everything that
//! can go wrong for an individual page or document is folded into the
//! returned `PipelineReport`; only conditions that make the run impossible
//! (unwritable output directory, a crashed merge task) surface as `Err`.

use crate::config::Config;
use crate::crawler::{build_http_client, collect_candidates, walk_pages, LinkRules};
use crate::document::{DocumentFormat, PdfFormat};
use crate::download::{DownloadEngine, DownloadSettings};
use crate::output::{merge_results, MergeOutcome};
use crate::url::site_slug;
use crate::TrawlError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// What one pipeline run did
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Content pages fetched successfully during traversal
    pub pages: usize,

    /// Distinct document links collected from those pages
    pub candidates: usize,

    /// Candidates that downloaded and validated
    pub downloaded: usize,

    pub outcome: MergeOutcome,
}

impl PipelineReport {
    fn nothing_merged(pages: usize, candidates: usize, output_path: PathBuf) -> Self {
        Self {
            pages,
            candidates,
            downloaded: 0,
            outcome: MergeOutcome {
                success: false,
                total_units: 0,
                output_path,
            },
        }
    }

    /// Units in the merged artifact; 0 means the seed produced nothing
    pub fn total_units(&self) -> usize {
        if self.outcome.success {
            self.outcome.total_units
        } else {
            0
        }
    }
}

/// Reusable pipeline bound to one configuration and HTTP client
pub struct Pipeline {
    client: Client,
    rules: LinkRules,
    page_timeout: Duration,
    engine: DownloadEngine,
    format: Arc<dyn DocumentFormat>,
}

impl Pipeline {
    /// Creates a pipeline that merges PDF documents
    ///
    /// # Example
    ///
    /// ```no_run
    /// use paper_trawl::url::normalize_url;
    /// use paper_trawl::{Config, Pipeline};
    /// use std::path::Path;
    ///
    /// # async fn example() -> Result<(), paper_trawl::TrawlError> {
    /// let pipeline = Pipeline::new(&Config::default())?;
    /// let seed = normalize_url("https://paper.example.com/html/2024-01/15/node_1.html")?;
    /// let report = pipeline.run(&seed, Path::new("downloaded_pdfs"), None).await?;
    /// println!("{} pages merged", report.total_units());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &Config) -> Result<Self, TrawlError> {
        Self::with_format(config, Arc::new(PdfFormat))
    }

    /// Creates a pipeline for an arbitrary document format
    pub fn with_format(config: &Config, format: Arc<dyn DocumentFormat>) -> Result<Self, TrawlError> {
        let client = build_http_client(&config.user_agent)?;
        let engine = DownloadEngine::new(
            client.clone(),
            Arc::clone(&format),
            DownloadSettings::from_config(&config.crawler),
        );

        Ok(Self {
            client,
            rules: LinkRules::from_config(&config.links),
            page_timeout: config.crawler.page_timeout(),
            engine,
            format,
        })
    }

    /// Extension of the merged artifact, with the leading dot
    pub fn extension(&self) -> &str {
        self.format.extension()
    }

    /// Runs discovery, download and merge for one seed
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute HTTP(S) URL of the first page
    /// * `output_dir` - Directory for staged files and the merged artifact
    /// * `merged_filename` - Name of the merged artifact; derived from the
    ///   seed host when `None`
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineReport)` - Run finished; check `total_units()`
    /// * `Err(TrawlError)` - The seed is not an HTTP(S) URL, the output
    ///   directory could not be created, or the merge task crashed
    pub async fn run(
        &self,
        seed: &Url,
        output_dir: &Path,
        merged_filename: Option<&str>,
    ) -> Result<PipelineReport, TrawlError> {
        let filename = match merged_filename {
            Some(name) => name.to_string(),
            None => default_merged_filename(seed, self.format.extension()),
        };
        let output_path = output_dir.join(&filename);
        let run_tag = Path::new(&filename)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::info!("Starting pipeline for {}", seed);

        let pages = match walk_pages(&self.client, seed, &self.rules, self.page_timeout).await {
            Ok(pages) => pages,
            Err(TrawlError::SeedUnreachable { url, reason }) => {
                tracing::error!("Skipping {}: seed unreachable ({})", url, reason);
                return Ok(PipelineReport::nothing_merged(0, 0, output_path));
            }
            Err(e) => return Err(e),
        };

        if pages.is_empty() {
            tracing::warn!("No pages found from {}", seed);
            return Ok(PipelineReport::nothing_merged(0, 0, output_path));
        }

        let candidates =
            collect_candidates(&self.client, &pages, &self.rules, self.page_timeout).await;
        tracing::info!(
            "Found {} documents across {} pages",
            candidates.len(),
            pages.len()
        );

        if candidates.is_empty() {
            tracing::warn!("No document links found from {}", seed);
            return Ok(PipelineReport::nothing_merged(pages.len(), 0, output_path));
        }

        tokio::fs::create_dir_all(output_dir).await?;

        let results = self
            .engine
            .download_all(&candidates, output_dir, &run_tag)
            .await;
        let downloaded = results.iter().filter(|r| r.is_success()).count();

        let format = Arc::clone(&self.format);
        let merge_path = output_path.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            merge_results(results, &merge_path, format.as_ref())
        })
        .await?;

        let report = PipelineReport {
            pages: pages.len(),
            candidates: candidates.len(),
            downloaded,
            outcome,
        };

        if report.outcome.success {
            tracing::info!(
                "Done: {} of {} documents merged, {} pages total -> {}",
                report.downloaded,
                report.candidates,
                report.outcome.total_units,
                report.outcome.output_path.display()
            );
        } else {
            tracing::error!(
                "Merge failed for {}: {} of {} documents were valid",
                seed,
                report.downloaded,
                report.candidates
            );
        }

        Ok(report)
    }
}

/// Output name used when the caller does not supply one: `<host>_merged<ext>`
///
/// # Examples
///
/// ```
/// use paper_trawl::pipeline::default_merged_filename;
/// use url::Url;
///
/// let seed = Url::parse("https://paper.example.com/node_1.html").unwrap();
/// assert_eq!(default_merged_filename(&seed, ".pdf"), "paper_example_com_merged.pdf");
/// ```
pub fn default_merged_filename(seed: &Url, extension: &str) -> String {
    let host = seed.host_str().unwrap_or("output");
    format!("{}_merged{}", site_slug(host), extension)
}
