/// Failures raised by a browser backend.
#[derive(thiserror::Error, Debug, Clone)]
pub enum BackendError {
    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("Element {id} not found")]
    ElementNotFound { id: u32 },

    #[error("Element {id} is stale (removed from DOM)")]
    ElementStale { id: u32 },

    #[error("Invalid locator: {locator}")]
    LocatorInvalid { locator: String },

    #[error("Click on element {id} failed: {reason}")]
    ClickFailed { id: u32, reason: String },

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Connection lost")]
    ConnectionLost,

    #[error("Not ready")]
    NotReady,

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Other: {0}")]
    Other(String),
}
