use fantoccini::error::CmdError;

/// Errors that can occur while driving the search workflow
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// No keyword available to (re)initialize an absent or corrupt state.
    /// Fatal for the current invocation; no navigation is attempted.
    #[error("no keyword available to start or resume a workflow")]
    MissingKeyword,

    /// A required control (query input, submit button, next-page link) was
    /// absent at the phase that needed it
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// WebDriver command failure
    #[error("webdriver error: {0}")]
    WebDriver(#[from] Box<CmdError>),

    /// State (de)serialization failure outside the store's corrupt-payload path
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<CmdError> for WorkflowError {
    fn from(err: CmdError) -> Self {
        WorkflowError::WebDriver(Box::new(err))
    }
}
