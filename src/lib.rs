// Re-export modules
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod hook;
pub mod location;
pub mod paginate;
pub mod session;
pub mod state;
pub mod store;

// Re-export commonly used types for convenience
pub use config::WorkflowConfig;
pub use controller::Tick;
pub use error::WorkflowError;
pub use state::{Phase, ResultRecord, WorkflowState};
pub use store::{MemoryStore, SessionStore, StateStore};

use controller::Controller;
use fantoccini::Client;
use hook::ResumptionHook;
use location::LocationClassifier;

/// Give up on a phase whose required controls stay missing after this many
/// retries, clearing the store so nothing is left stuck mid-flight
const MAX_STALL_RETRIES: u32 = 3;

/// Builder for one search workflow run.
///
/// A workflow spans many navigations; every navigation destroys the document
/// context that triggered it, so all progress is checkpointed into a
/// session-scoped store before each navigation and picked back up by the
/// resumption hook afterwards.
pub struct Workflow {
    keyword: Option<String>,
    config: WorkflowConfig,
}

impl Workflow {
    /// Start (or force-reset to) a workflow for the given keyword
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            config: WorkflowConfig::default(),
        }
    }

    /// Resume whatever workflow is persisted in the session, if any
    pub fn resume() -> Self {
        Self {
            keyword: None,
            config: WorkflowConfig::default(),
        }
    }

    /// Override the pagination depth bound
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Apply a full configuration
    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    /// Drive the workflow to completion over a live browser session,
    /// using the browser's sessionStorage as the state store.
    ///
    /// Returns the accumulated results once the workflow finishes. An empty
    /// result set with no keyword supplied means there was nothing to resume.
    pub async fn run(self, client: &Client) -> Result<Vec<ResultRecord>, Box<dyn std::error::Error>> {
        let mut store = SessionStore::new(client.clone());
        self.run_with_store(client, &mut store).await
    }

    /// Whether this run has anything to act on: a fresh keyword, or a
    /// workflow persisted in the store
    async fn has_work<S: StateStore>(&self, store: &mut S) -> Result<bool, WorkflowError> {
        Ok(self.keyword.is_some() || store.read().await?.is_some())
    }

    /// Drive the workflow to completion with a caller-supplied store
    pub async fn run_with_store<S: StateStore>(
        self,
        client: &Client,
        store: &mut S,
    ) -> Result<Vec<ResultRecord>, Box<dyn std::error::Error>> {
        if !self.has_work(store).await? {
            ::log::info!("Nothing to resume");
            return Ok(Vec::new());
        }

        let classifier = LocationClassifier::new(&self.config)?;
        let mut hook = ResumptionHook::new();
        let mut stalls = 0u32;

        // External entry: the one invocation that may carry a fresh keyword
        let mut tick = Controller::new(client, store, &classifier, &self.config)
            .invoke(self.keyword.as_deref())
            .await?;

        loop {
            match tick {
                Tick::Navigated => {
                    stalls = 0;
                    tick = hook
                        .on_page_load(client, store, &classifier, &self.config)
                        .await?;
                }
                Tick::Advanced => {
                    stalls = 0;
                    tick = Controller::new(client, store, &classifier, &self.config)
                        .invoke(None)
                        .await?;
                }
                Tick::Stalled => {
                    stalls += 1;
                    if stalls > MAX_STALL_RETRIES {
                        // Never leave a mid-flight state that cannot progress
                        store.clear().await?;
                        return Err("required page controls never appeared; workflow cleared".into());
                    }
                    ::log::warn!("Phase stalled, retry {} of {}", stalls, MAX_STALL_RETRIES);
                    hook::settle_delay(&self.config).await;
                    tick = Controller::new(client, store, &classifier, &self.config)
                        .invoke(None)
                        .await?;
                }
                Tick::Finished(results) => return Ok(results),
                Tick::Aborted(reason) => {
                    return Err(format!("workflow aborted: {reason}").into());
                }
                Tick::Idle => {
                    ::log::info!("Nothing to resume");
                    return Ok(Vec::new());
                }
            }
        }
    }
}
