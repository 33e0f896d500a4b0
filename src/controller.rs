//! State machine controller.
//!
//! Each invocation runs exactly one phase action and triggers at most one
//! navigation. A navigation destroys the document context the workflow was
//! driving, so the state checkpoint is always written to the store *before*
//! the call that navigates; the resumption hook is the sole re-entry point
//! afterwards.

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::extract;
use crate::hook::settle_delay;
use crate::location::{DocLocale, LocationClassifier};
use crate::paginate;
use crate::state::{Phase, ResultRecord, WorkflowState};
use crate::store::StateStore;
use fantoccini::{Client, Locator, elements::Element};
use serde_json::json;

/// Query input controls on the search home page
const QUERY_INPUT_SELECTORS: &[&str] = &["textarea[name='q']", "input[name='q']"];

/// Submit controls. `btnK` is the plain search button; the "feeling lucky"
/// button (`btnI`) navigates straight to the first hit and is never used.
const SUBMIT_SELECTORS: &[&str] = &["input[name='btnK']", "button[type='submit']"];

/// Outcome of one controller invocation
#[derive(Debug)]
pub enum Tick {
    /// Phase action completed and triggered a navigation; the current
    /// document is being replaced
    Navigated,
    /// Phase action completed without navigating; invoke again to proceed
    Advanced,
    /// A required control was missing; the phase action aborted without
    /// advancing the phase
    Stalled,
    /// Workflow finished; accumulated results emitted and the store cleared
    Finished(Vec<ResultRecord>),
    /// Unrecoverable without a keyword; the store was cleared
    Aborted(String),
    /// Nothing persisted and no keyword supplied
    Idle,
}

/// Result of applying one results page to the workflow state
#[derive(Debug)]
pub struct PageOutcome {
    /// How many new unique records the page contributed
    pub added: usize,
    /// Selector of the next-page control to invoke, or `None` when the
    /// workflow transitioned to FINISHED
    pub next_control: Option<&'static str>,
}

/// Whether the actual document location satisfies a phase's entry condition
pub fn location_matches(phase: Phase, locale: DocLocale) -> bool {
    match phase {
        // Starting over is valid from anywhere
        Phase::InitiateSearch => true,
        Phase::OnHome => locale == DocLocale::Home,
        Phase::ScrapingResults => locale == DocLocale::Results,
        // Reporting needs no particular document
        Phase::Finished => true,
    }
}

/// Pure core of the SCRAPING_RESULTS action: extract, merge, and decide
/// between continuing and finishing. Mutates the state to its *next*
/// checkpointable value; the caller persists it before any navigation.
pub fn apply_page(state: &mut WorkflowState, html: &str) -> PageOutcome {
    let records = extract::extract_results(html);
    let added = state.merge_results(records);

    let control = paginate::find_next_control(html);
    if paginate::should_stop(state.current_page_num, state.max_pages, control.is_some()) {
        state.transition_to(Phase::Finished);
        PageOutcome {
            added,
            next_control: None,
        }
    } else {
        state.advance_page();
        state.transition_to(Phase::ScrapingResults);
        PageOutcome {
            added,
            next_control: control,
        }
    }
}

/// Drives the phase table against a live browser session and a state store
pub struct Controller<'a, S: StateStore> {
    client: &'a Client,
    store: &'a mut S,
    classifier: &'a LocationClassifier,
    config: &'a WorkflowConfig,
}

impl<'a, S: StateStore> Controller<'a, S> {
    pub fn new(
        client: &'a Client,
        store: &'a mut S,
        classifier: &'a LocationClassifier,
        config: &'a WorkflowConfig,
    ) -> Self {
        Self {
            client,
            store,
            classifier,
            config,
        }
    }

    /// Run one phase action.
    ///
    /// `keyword` is the caller-supplied query, if any: it starts a fresh
    /// workflow when nothing is persisted and forces a reset when it differs
    /// from the persisted keyword. Resumption invocations pass `None`.
    pub async fn invoke(&mut self, keyword: Option<&str>) -> Result<Tick, WorkflowError> {
        let persisted = self.store.read().await?;

        let mut state = match (persisted, keyword) {
            (Some(state), Some(kw)) if state.keyword != kw => {
                ::log::info!(
                    "Keyword changed from '{}' to '{}', resetting workflow",
                    state.keyword,
                    kw
                );
                WorkflowState::fresh(kw, self.config.max_pages)
            }
            (Some(state), _) => state,
            (None, Some(kw)) => WorkflowState::fresh(kw, self.config.max_pages),
            (None, None) => {
                ::log::error!("No persisted workflow and no keyword supplied");
                return Err(WorkflowError::MissingKeyword);
            }
        };

        let location = self.client.current_url().await?;
        let locale = self.classifier.classify(&location);

        if !location_matches(state.current_phase, locale) {
            if state.keyword.is_empty() {
                ::log::error!(
                    "Phase {} does not match location {} ({}) and no keyword is known; clearing",
                    state.current_phase.as_str(),
                    locale.as_str(),
                    location
                );
                self.store.clear().await?;
                return Ok(Tick::Aborted(format!(
                    "phase {} mismatched location {} with no keyword",
                    state.current_phase.as_str(),
                    locale.as_str()
                )));
            }
            // Recovery restart: keep the keyword, drop everything else
            ::log::warn!(
                "Phase {} does not match location {} ({}); restarting for keyword '{}'",
                state.current_phase.as_str(),
                locale.as_str(),
                location,
                state.keyword
            );
            state = WorkflowState::fresh(state.keyword, state.max_pages);
        }

        ::log::debug!(
            "Invoking phase {} for '{}' (page {} of at most {})",
            state.current_phase.as_str(),
            state.keyword,
            state.current_page_num,
            state.max_pages
        );

        match state.current_phase {
            Phase::InitiateSearch => self.initiate_search(state, locale).await,
            Phase::OnHome => self.on_home(state).await,
            Phase::ScrapingResults => self.scrape_results(state).await,
            Phase::Finished => self.finish(state).await,
        }
    }

    /// INITIATE_SEARCH: reach the search home page. If the document is
    /// already there, fall through to ON_HOME's action in the same
    /// invocation (no navigation needed).
    async fn initiate_search(
        &mut self,
        mut state: WorkflowState,
        locale: DocLocale,
    ) -> Result<Tick, WorkflowError> {
        state.transition_to(Phase::OnHome);
        self.store.write(&state).await?;

        if locale == DocLocale::Home {
            return self.on_home(state).await;
        }

        let home = self.classifier.home_url().as_str();
        ::log::info!("Navigating to search home: {}", home);
        self.client.goto(home).await?;
        Ok(Tick::Navigated)
    }

    /// ON_HOME: inject the keyword into the query control and submit.
    /// The SCRAPING_RESULTS checkpoint is written before the submit click
    /// because the click destroys this execution's document.
    async fn on_home(&mut self, mut state: WorkflowState) -> Result<Tick, WorkflowError> {
        let Some((input, input_selector)) = self.find_control(QUERY_INPUT_SELECTORS).await else {
            return self.stall(&state, "query input");
        };
        let Some((submit, _)) = self.find_control(SUBMIT_SELECTORS).await else {
            return self.stall(&state, "submit button");
        };

        input.clear().await?;
        input.send_keys(&state.keyword).await?;

        // Frameworks listening on the field observe the change through
        // synthetic input/change events, not just key strokes
        self.client
            .execute(
                "const q = document.querySelector(arguments[0]);\
                 if (q) {\
                   q.dispatchEvent(new Event('input', { bubbles: true }));\
                   q.dispatchEvent(new Event('change', { bubbles: true }));\
                 }",
                vec![json!(input_selector)],
            )
            .await?;

        state.transition_to(Phase::ScrapingResults);
        self.store.write(&state).await?;

        ::log::info!("Submitting query '{}'", state.keyword);
        submit.click().await?;
        Ok(Tick::Navigated)
    }

    /// SCRAPING_RESULTS: extract the current page, merge, and either paginate
    /// or finish. Forward progress (the incremented page number) is persisted
    /// before the next-page control is invoked, so an interrupted navigation
    /// resumes ahead rather than re-scraping the same page.
    async fn scrape_results(&mut self, mut state: WorkflowState) -> Result<Tick, WorkflowError> {
        settle_delay(self.config).await;

        let html = self.client.source().await?;
        let page_num = state.current_page_num;
        let outcome = apply_page(&mut state, &html);
        ::log::info!(
            "Page {}: {} new results ({} total)",
            page_num,
            outcome.added,
            state.all_results.len()
        );

        self.store.write(&state).await?;

        match outcome.next_control {
            Some(selector) => {
                let Ok(control) = self.client.find(Locator::Css(selector)).await else {
                    // Control vanished between snapshot and click; the
                    // checkpoint already points at the next page, so the
                    // recovery rule will sort out the mismatch on resume
                    ::log::warn!("Next-page control disappeared before click: {}", selector);
                    return Err(WorkflowError::ElementNotFound(format!(
                        "next-page control {selector}"
                    )));
                };
                control.click().await?;
                Ok(Tick::Navigated)
            }
            None => {
                ::log::info!(
                    "Termination reached at page {} (bound {})",
                    page_num,
                    state.max_pages
                );
                Ok(Tick::Advanced)
            }
        }
    }

    /// FINISHED: emit the accumulated results and clear the store
    async fn finish(&mut self, state: WorkflowState) -> Result<Tick, WorkflowError> {
        ::log::info!(
            "Workflow for '{}' finished with {} results across {} page(s)",
            state.keyword,
            state.all_results.len(),
            state.current_page_num
        );
        self.store.clear().await?;
        Ok(Tick::Finished(state.all_results))
    }

    /// Try each selector until one resolves to a live element
    async fn find_control(&self, selectors: &[&'static str]) -> Option<(Element, &'static str)> {
        for selector in selectors {
            if let Ok(element) = self.client.find(Locator::Css(selector)).await {
                return Some((element, selector));
            }
        }
        None
    }

    /// A required control is missing: log with context and abort the phase
    /// action without advancing the phase
    fn stall(&self, state: &WorkflowState, what: &str) -> Result<Tick, WorkflowError> {
        ::log::error!(
            "Missing {} at phase {} (keyword '{}', page {})",
            what,
            state.current_phase.as_str(),
            state.keyword,
            state.current_page_num
        );
        Ok(Tick::Stalled)
    }
}
