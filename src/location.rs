use crate::config::WorkflowConfig;
use regex::Regex;
use url::Url;

/// Where the current document is, as far as the workflow is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocLocale {
    /// The search engine home page
    Home,
    /// A results page matching the configured URL pattern
    Results,
    /// Anywhere else
    Other,
}

impl DocLocale {
    /// Human-readable name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            DocLocale::Home => "home",
            DocLocale::Results => "results",
            DocLocale::Other => "other",
        }
    }
}

/// Classifies document URLs against the configured home and results locations
#[derive(Debug)]
pub struct LocationClassifier {
    home: Url,
    results_pattern: Regex,
}

impl LocationClassifier {
    /// Build a classifier from workflow configuration
    pub fn new(config: &WorkflowConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let home = Url::parse(&config.home_url)?;
        let results_pattern = Regex::new(&config.results_url_pattern)?;
        Ok(Self {
            home,
            results_pattern,
        })
    }

    /// Classify a document URL
    pub fn classify(&self, url: &Url) -> DocLocale {
        if self.results_pattern.is_match(url.as_str()) {
            return DocLocale::Results;
        }
        if self.is_home(url) {
            return DocLocale::Home;
        }
        DocLocale::Other
    }

    /// The configured home page URL
    pub fn home_url(&self) -> &Url {
        &self.home
    }

    /// Whether a URL is the search home page. Host must match exactly; the
    /// path may be the root or the home page's own path, with or without a
    /// trailing slash.
    fn is_home(&self, url: &Url) -> bool {
        if url.host_str() != self.home.host_str() {
            return false;
        }
        let path = url.path().trim_end_matches('/');
        let home_path = self.home.path().trim_end_matches('/');
        path == home_path || path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LocationClassifier {
        LocationClassifier::new(&WorkflowConfig::default()).unwrap()
    }

    #[test]
    fn test_home_page_classification() {
        let c = classifier();
        let home = Url::parse("https://www.google.com/").unwrap();
        assert_eq!(c.classify(&home), DocLocale::Home);

        let bare = Url::parse("https://www.google.com").unwrap();
        assert_eq!(c.classify(&bare), DocLocale::Home);
    }

    #[test]
    fn test_results_page_classification() {
        let c = classifier();
        let results = Url::parse("https://www.google.com/search?q=rust&start=10").unwrap();
        assert_eq!(c.classify(&results), DocLocale::Results);

        // Other TLDs still count as results pages
        let intl = Url::parse("https://www.google.co.uk/search?q=rust").unwrap();
        assert_eq!(c.classify(&intl), DocLocale::Results);
    }

    #[test]
    fn test_unrelated_locations() {
        let c = classifier();
        let other = Url::parse("https://example.com/search?q=rust").unwrap();
        assert_eq!(c.classify(&other), DocLocale::Other);

        let maps = Url::parse("https://www.google.com/maps").unwrap();
        assert_eq!(c.classify(&maps), DocLocale::Other);
    }
}
