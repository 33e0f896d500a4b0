use serde::{Deserialize, Serialize};

/// Discrete stages of the pagination workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Workflow (re)started with a keyword; may still need to reach the home page
    InitiateSearch,
    /// On the search home page, ready to inject the query and submit
    OnHome,
    /// On a results page, scraping and paginating
    ScrapingResults,
    /// All pages processed; results ready to report
    Finished,
}

impl Phase {
    /// Wire name of the phase, as persisted in the store payload
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::InitiateSearch => "INITIATE_SEARCH",
            Phase::OnHome => "ON_HOME",
            Phase::ScrapingResults => "SCRAPING_RESULTS",
            Phase::Finished => "FINISHED",
        }
    }
}

/// One extracted search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Result title (non-empty)
    pub title: String,

    /// Canonical destination URL (redirect wrappers unwrapped, non-empty)
    pub url: String,

    /// Human-readable source label, may be empty
    #[serde(rename = "displayUrl", default)]
    pub display_url: String,

    /// Result snippet, or the "no snippet found" sentinel
    #[serde(default)]
    pub snippet: String,
}

impl ResultRecord {
    /// Identity key for deduplication
    pub fn key(&self) -> (&str, &str) {
        (self.title.as_str(), self.url.as_str())
    }
}

/// The single persisted entity: everything the workflow needs to resume
/// after a navigation destroys the execution context that wrote it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Search query; acts as the session identity key
    pub keyword: String,

    /// 1-indexed results page currently being (or about to be) processed
    #[serde(rename = "currentPageNum")]
    pub current_page_num: u32,

    /// Accumulated results across pages, unique by (title, url), first-seen order
    #[serde(rename = "allResults", default)]
    pub all_results: Vec<ResultRecord>,

    /// Phase to execute on the next controller invocation
    #[serde(rename = "currentPhase")]
    pub current_phase: Phase,

    /// Hard upper bound on pagination depth
    #[serde(rename = "maxPages")]
    pub max_pages: u32,

    /// Idempotency token: incremented with every checkpoint so a duplicate
    /// page-load event cannot dispatch the same phase transition twice
    #[serde(default)]
    pub generation: u64,
}

impl WorkflowState {
    /// Create a fresh workflow for a keyword, starting at page 1
    pub fn fresh(keyword: impl Into<String>, max_pages: u32) -> Self {
        Self {
            keyword: keyword.into(),
            current_page_num: 1,
            all_results: Vec::new(),
            current_phase: Phase::InitiateSearch,
            max_pages,
            generation: 0,
        }
    }

    /// Merge newly extracted records into the accumulated set.
    ///
    /// Order is first-seen; a record whose (title, url) pair is already
    /// present is skipped. Returns the number of records actually added.
    pub fn merge_results<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = ResultRecord>,
    {
        let mut added = 0;
        for record in records {
            let duplicate = self
                .all_results
                .iter()
                .any(|existing| existing.key() == record.key());
            if !duplicate {
                self.all_results.push(record);
                added += 1;
            }
        }
        added
    }

    /// Advance to the next results page. Page numbers only move forward.
    pub fn advance_page(&mut self) {
        self.current_page_num += 1;
    }

    /// Set the phase to run on the next invocation and bump the generation.
    /// Called immediately before the checkpoint write that precedes navigation.
    pub fn transition_to(&mut self, phase: Phase) {
        self.current_phase = phase;
        self.generation += 1;
    }

    /// Whether this state describes a workflow still in flight
    pub fn is_mid_flight(&self) -> bool {
        self.current_phase != Phase::Finished && !self.keyword.is_empty()
    }
}
