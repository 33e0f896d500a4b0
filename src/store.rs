use crate::error::WorkflowError;
use crate::state::WorkflowState;
use fantoccini::Client;
use serde_json::json;

/// Storage key for the persisted workflow state
pub const STORAGE_KEY: &str = "serpWalker.workflowState";

/// A durable, session-scoped key/value slot for the workflow state.
///
/// The backing storage must survive a full document reload but stay scoped to
/// the browsing session. All coordination between "before navigation" and
/// "after navigation" flows through this seam and nothing else.
pub trait StateStore {
    /// Read the persisted state, if any. A payload that fails to deserialize
    /// is reported as absent, not as an error.
    fn read(&mut self) -> impl Future<Output = Result<Option<WorkflowState>, WorkflowError>>;

    /// Persist the state, replacing any previous value
    fn write(&mut self, state: &WorkflowState) -> impl Future<Output = Result<(), WorkflowError>>;

    /// Remove the persisted state
    fn clear(&mut self) -> impl Future<Output = Result<(), WorkflowError>>;
}

/// Store backed by the live browser's `window.sessionStorage`.
///
/// sessionStorage is the one resource that survives navigation while staying
/// scoped to (and dying with) the browsing session, which is exactly the
/// lifetime the workflow state needs.
pub struct SessionStore {
    client: Client,
}

impl SessionStore {
    /// Create a store over the given WebDriver session
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl StateStore for SessionStore {
    async fn read(&mut self) -> Result<Option<WorkflowState>, WorkflowError> {
        let value = self
            .client
            .execute(
                "return window.sessionStorage.getItem(arguments[0]);",
                vec![json!(STORAGE_KEY)],
            )
            .await?;

        let payload = match value.as_str() {
            Some(payload) => payload.to_string(),
            None => return Ok(None),
        };

        match serde_json::from_str::<WorkflowState>(&payload) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                // Corrupt payload: treat as absent so the controller requires
                // an explicit keyword to reinitialize
                ::log::warn!("Discarding undeserializable workflow state: {}", e);
                Ok(None)
            }
        }
    }

    async fn write(&mut self, state: &WorkflowState) -> Result<(), WorkflowError> {
        let payload = serde_json::to_string(state)?;
        self.client
            .execute(
                "window.sessionStorage.setItem(arguments[0], arguments[1]);",
                vec![json!(STORAGE_KEY), json!(payload)],
            )
            .await?;
        ::log::debug!(
            "Checkpointed phase {} (page {}, generation {})",
            state.current_phase.as_str(),
            state.current_page_num,
            state.generation
        );
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), WorkflowError> {
        self.client
            .execute(
                "window.sessionStorage.removeItem(arguments[0]);",
                vec![json!(STORAGE_KEY)],
            )
            .await?;
        Ok(())
    }
}

/// In-process store for tests and non-browser embedding.
///
/// Persists the serialized payload rather than the struct so reads exercise
/// the same structured-to-text-to-structured round trip as `SessionStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    payload: Option<String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw payload (valid or deliberately corrupt)
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
        }
    }

    /// Whether the store currently holds a payload
    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }
}

impl StateStore for MemoryStore {
    async fn read(&mut self) -> Result<Option<WorkflowState>, WorkflowError> {
        let Some(payload) = &self.payload else {
            return Ok(None);
        };
        match serde_json::from_str::<WorkflowState>(payload) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                ::log::warn!("Discarding undeserializable workflow state: {}", e);
                Ok(None)
            }
        }
    }

    async fn write(&mut self, state: &WorkflowState) -> Result<(), WorkflowError> {
        self.payload = Some(serde_json::to_string(state)?);
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), WorkflowError> {
        self.payload = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;

    #[tokio::test]
    async fn test_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.read().await.unwrap().is_none());

        let mut state = WorkflowState::fresh("rust async", 3);
        state.transition_to(Phase::OnHome);
        store.write(&state).await.unwrap();

        let back = store.read().await.unwrap().expect("state should persist");
        assert_eq!(back.keyword, "rust async");
        assert_eq!(back.current_phase, Phase::OnHome);
        assert_eq!(back.max_pages, 3);
        assert_eq!(back.generation, 1);

        store.clear().await.unwrap();
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_payload_reads_as_absent() {
        let mut store = MemoryStore::with_payload("{not json at all");
        assert!(store.read().await.unwrap().is_none());

        let mut store = MemoryStore::with_payload(r#"{"keyword": 42}"#);
        assert!(store.read().await.unwrap().is_none());
    }
}
