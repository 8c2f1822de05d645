use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Paper-Trawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(rename = "site", default)]
    pub sites: Vec<SiteEntry>,
}

/// Fetch, concurrency and retry settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Timeout for a single HTML page fetch (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Timeout for a single document download attempt (seconds)
    #[serde(rename = "document-timeout-secs")]
    pub document_timeout_secs: u64,

    /// Number of concurrent document downloads
    pub workers: u32,

    /// Total attempts per document, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl CrawlerConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn document_timeout(&self) -> Duration {
        Duration::from_secs(self.document_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 10,
            document_timeout_secs: 60,
            workers: 5,
            max_attempts: 3,
            retry_delay_ms: 2000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PaperTrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/paper-trawl".to_string(),
        }
    }
}

/// Tokens that decide which links are content pages and which are documents
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Token a content page path must contain (e.g. `node_`)
    #[serde(rename = "page-token")]
    pub page_token: String,

    /// Extension a content page path must contain
    #[serde(rename = "page-extension")]
    pub page_extension: String,

    /// Extension a document path must contain (matched case-insensitively)
    #[serde(rename = "document-extension")]
    pub document_extension: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            page_token: "node_".to_string(),
            page_extension: ".html".to_string(),
            document_extension: ".pdf".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for staged downloads and merged artifacts
    pub directory: String,

    /// Cumulative unit count after which a site stops iterating dates
    #[serde(rename = "page-limit")]
    pub page_limit: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "downloaded_pdfs".to_string(),
            page_limit: 50,
        }
    }
}

/// A site whose URL carries a concrete date used as a template
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Human-readable site name, also used for output filenames
    pub name: String,

    /// Seed URL containing one sample date
    pub url: String,
}
