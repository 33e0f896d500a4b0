use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for the search workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Search engine home page the workflow starts from
    #[serde(default = "default_home_url")]
    pub home_url: String,

    /// Regex matched against the document URL to recognize a results page
    #[serde(default = "default_results_url_pattern")]
    pub results_url_pattern: String,

    /// Hard upper bound on pagination depth
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Lower bound of the randomized settle delay before acting on a page (ms)
    #[serde(default = "default_settle_delay_ms_min")]
    pub settle_delay_ms_min: u64,

    /// Upper bound of the randomized settle delay (ms)
    #[serde(default = "default_settle_delay_ms_max")]
    pub settle_delay_ms_max: u64,

    /// Maximum time to poll for document readiness before proceeding anyway (ms)
    #[serde(default = "default_readiness_timeout_ms")]
    pub readiness_timeout_ms: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            results_url_pattern: default_results_url_pattern(),
            max_pages: default_max_pages(),
            webdriver_url: default_webdriver_url(),
            settle_delay_ms_min: default_settle_delay_ms_min(),
            settle_delay_ms_max: default_settle_delay_ms_max(),
            readiness_timeout_ms: default_readiness_timeout_ms(),
        }
    }
}

impl WorkflowConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// Default search home page
fn default_home_url() -> String {
    "https://www.google.com".to_string()
}

/// Default results page URL pattern (any Google TLD, /search path)
fn default_results_url_pattern() -> String {
    r"^https?://www\.google\.[^/]+/search\?".to_string()
}

/// Default pagination depth bound
fn default_max_pages() -> u32 {
    10
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default lower settle delay bound
fn default_settle_delay_ms_min() -> u64 {
    800
}

/// Default upper settle delay bound
fn default_settle_delay_ms_max() -> u64 {
    2200
}

/// Default readiness polling cap
fn default_readiness_timeout_ms() -> u64 {
    10_000
}
