use async_trait::async_trait;
pub use cartpath_common::error::backend_error::BackendError;
use cartpath_common::protocol::{Cookie, ElementHandle, Marker, NavigationResult};

/// The Backend trait is the browser boundary every driver implements.
///
/// The engine needs nothing beyond navigation, element resolution, clicks
/// and the selected-marker probe; everything else stays in the driver.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to remote, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Resolve every element currently matching `locator`, in document order.
    async fn query(&mut self, locator: &str) -> Result<Vec<ElementHandle>, BackendError>;

    /// Resolve the descendants of `scope` matching `locator`, in document order.
    async fn query_within(
        &mut self,
        scope: &ElementHandle,
        locator: &str,
    ) -> Result<Vec<ElementHandle>, BackendError>;

    /// Dispatch a click on the element.
    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError>;

    /// Whether the element currently carries the given marker.
    async fn has_marker(
        &mut self,
        element: &ElementHandle,
        marker: &Marker,
    ) -> Result<bool, BackendError>;

    /// Set a cookie in the current session.
    async fn set_cookie(&mut self, _cookie: Cookie) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("set_cookie".into()))
    }
}
