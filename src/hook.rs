//! Per-page-load resumption.
//!
//! After every navigation the previous execution context is gone; the hook is
//! the sole re-entry point. It waits for the new document to become usable,
//! reads the store, and re-drives the controller if a workflow is mid-flight.

use crate::config::WorkflowConfig;
use crate::controller::{Controller, Tick};
use crate::error::WorkflowError;
use crate::location::LocationClassifier;
use crate::state::Phase;
use crate::store::StateStore;
use fantoccini::Client;
use rand::Rng;
use std::time::Duration;

/// Polling interval while waiting for document readiness
const READY_POLL_MS: u64 = 250;

/// Sleep a randomized short settle delay.
///
/// The jitter avoids both racing the page's own async rendering and a
/// uniform, detectable timing signature.
pub async fn settle_delay(config: &WorkflowConfig) {
    let min = config.settle_delay_ms_min;
    let max = config.settle_delay_ms_max.max(min);
    let ms = rand::rng().random_range(min..=max);
    ::log::debug!("Settling for {} ms", ms);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Resumption hook with a duplicate-dispatch guard.
///
/// The guard remembers the last state generation it dispatched; a re-fired
/// load event for the same logical navigation (e.g. a cached-page restore)
/// observes an unchanged generation and is ignored, so no phase transition
/// can be double-submitted.
#[derive(Debug, Default)]
pub struct ResumptionHook {
    last_dispatched: Option<u64>,
}

impl ResumptionHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a state with this generation may be dispatched.
    /// Records the generation when it answers yes.
    pub fn should_dispatch(&mut self, generation: u64) -> bool {
        if self.last_dispatched == Some(generation) {
            return false;
        }
        self.last_dispatched = Some(generation);
        true
    }

    /// Handle one page-load event: wait for readiness plus a settle delay,
    /// then re-invoke the controller if a workflow is mid-flight.
    pub async fn on_page_load<S: StateStore>(
        &mut self,
        client: &Client,
        store: &mut S,
        classifier: &LocationClassifier,
        config: &WorkflowConfig,
    ) -> Result<Tick, WorkflowError> {
        wait_for_ready(client, config).await;
        settle_delay(config).await;

        let Some(state) = store.read().await? else {
            ::log::debug!("No persisted workflow; hook idle");
            return Ok(Tick::Idle);
        };

        if !state.is_mid_flight() {
            if state.current_phase == Phase::Finished {
                ::log::info!(
                    "Previous run for '{}' already completed with {} results",
                    state.keyword,
                    state.all_results.len()
                );
                return Ok(Tick::Idle);
            }
            ::log::debug!("Persisted workflow has no keyword; hook idle");
            return Ok(Tick::Idle);
        }

        if !self.should_dispatch(state.generation) {
            ::log::warn!(
                "Duplicate load event for generation {}; ignoring",
                state.generation
            );
            return Ok(Tick::Idle);
        }

        ::log::debug!(
            "Resuming phase {} for '{}' at page {}",
            state.current_phase.as_str(),
            state.keyword,
            state.current_page_num
        );
        let mut controller = Controller::new(client, store, classifier, config);
        controller.invoke(None).await
    }
}

/// Poll `document.readyState` until the document is usable, bounded by the
/// configured cap. Timing out is not an error; extraction proceeds with
/// whatever has rendered.
async fn wait_for_ready(client: &Client, config: &WorkflowConfig) {
    let deadline =
        tokio::time::Instant::now() + Duration::from_millis(config.readiness_timeout_ms);

    loop {
        match client.execute("return document.readyState;", vec![]).await {
            Ok(value) => {
                let ready_state = value.as_str().unwrap_or("");
                if ready_state == "complete" || ready_state == "interactive" {
                    return;
                }
            }
            Err(e) => {
                // Mid-navigation the session may briefly refuse script
                // execution; keep polling until the deadline
                ::log::debug!("readyState probe failed: {}", e);
            }
        }

        if tokio::time::Instant::now() >= deadline {
            ::log::warn!(
                "Document not ready after {} ms; proceeding anyway",
                config.readiness_timeout_ms
            );
            return;
        }
        tokio::time::sleep(Duration::from_millis(READY_POLL_MS)).await;
    }
}
