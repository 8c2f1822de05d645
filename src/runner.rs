//! Iteration over configured sites and dates
//!
//! The pipeline knows nothing about sites or calendars. This module resolves
//! each site's date template for every requested day, runs the pipeline on
//! the resulting seed, and stops a site once it has collected enough pages.

use crate::config::{Config, SiteEntry};
use crate::pipeline::Pipeline;
use crate::url::{site_slug, DateTemplate};
use crate::{TrawlError, UrlError};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use url::Url;

/// One resolved pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub date: NaiveDate,
    pub seed: Url,
    pub merged_filename: String,
}

/// What happened to one site across the date range
#[derive(Debug, Clone, Default)]
pub struct SiteSummary {
    pub name: String,

    /// Pipeline invocations actually made
    pub runs: usize,

    /// Pages merged across all runs
    pub total_units: usize,

    /// Merged artifacts written
    pub outputs: Vec<PathBuf>,

    /// Set when the site was not processed at all
    pub skipped: Option<String>,

    /// True when the page limit ended the site early
    pub limit_reached: bool,
}

/// Every day from `from` to `to`, inclusive; empty when `from > to`
pub fn date_range(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |day| *day <= to)
}

/// `<site slug>_<YYYY-MM-DD><extension>`
pub fn merged_filename(site_name: &str, date: NaiveDate, extension: &str) -> String {
    format!(
        "{}_{}{}",
        site_slug(site_name),
        date.format("%Y-%m-%d"),
        extension
    )
}

/// Resolves a site's seeds for every day in the range
pub fn plan_site(
    site: &SiteEntry,
    from: NaiveDate,
    to: NaiveDate,
    extension: &str,
) -> Result<Vec<SeedPlan>, UrlError> {
    let template = DateTemplate::detect(&site.url)?;

    date_range(from, to)
        .map(|date| {
            let resolved = template.expand(date);
            let seed = Url::parse(&resolved).map_err(|e| UrlError::Parse(e.to_string()))?;
            Ok(SeedPlan {
                date,
                seed,
                merged_filename: merged_filename(&site.name, date, extension),
            })
        })
        .collect()
}

/// Runs every configured site over the date range
///
/// # Returns
///
/// * `Ok(summaries)` - One summary per configured site, in config order
/// * `Err(TrawlError)` - A pipeline run hit a fatal condition
pub async fn run_sites(
    pipeline: &Pipeline,
    config: &Config,
    from: NaiveDate,
    to: NaiveDate,
    output_dir: &Path,
) -> Result<Vec<SiteSummary>, TrawlError> {
    let page_limit = config.output.page_limit as usize;
    let extension = pipeline.extension().to_string();
    let mut summaries = Vec::with_capacity(config.sites.len());

    for site in &config.sites {
        let mut summary = SiteSummary {
            name: site.name.clone(),
            ..SiteSummary::default()
        };

        let plans = match plan_site(site, from, to, &extension) {
            Ok(plans) => plans,
            Err(e) => {
                tracing::warn!("Skipping site '{}': {}", site.name, e);
                summary.skipped = Some(e.to_string());
                summaries.push(summary);
                continue;
            }
        };

        tracing::info!(
            "Processing site '{}' ({} days, limit {} pages)",
            site.name,
            plans.len(),
            page_limit
        );

        for plan in plans {
            tracing::info!("[{}] {}", plan.date, plan.seed);

            let report = pipeline
                .run(&plan.seed, output_dir, Some(&plan.merged_filename))
                .await?;
            summary.runs += 1;

            let units = report.total_units();
            if units > 0 {
                summary.total_units += units;
                summary.outputs.push(report.outcome.output_path);
                tracing::info!(
                    "Collected {} pages; '{}' now at {}/{}",
                    units,
                    site.name,
                    summary.total_units,
                    page_limit
                );
            }

            if summary.total_units >= page_limit {
                tracing::info!(
                    "Site '{}' reached the {} page limit, moving on",
                    site.name,
                    page_limit
                );
                summary.limit_reached = true;
                break;
            }
        }

        summaries.push(summary);
    }

    Ok(summaries)
}

/// Runs the pipeline once for an explicit seed
///
/// The merged file is named after the seed host; see
/// [`default_merged_filename`](crate::pipeline::default_merged_filename).
pub async fn run_single(
    pipeline: &Pipeline,
    seed: &Url,
    output_dir: &Path,
) -> Result<usize, TrawlError> {
    let report = pipeline.run(seed, output_dir, None).await?;
    Ok(report.total_units())
}
