use crate::webdriver::{self, WebDriverClient};
use async_trait::async_trait;
use cartpath_engine::backend::{Backend, BackendError};
use cartpath_engine::protocol::{Cookie, ElementHandle, Marker, NavigationResult};
use fantoccini::Locator;
use fantoccini::elements::Element;
use std::collections::HashMap;
use tracing::{debug, info};

/// A [`Backend`] driving a browser through a WebDriver server.
///
/// Elements found by a query are kept in a registry keyed by the handle id
/// given to the engine. The registry is dropped on every navigation, so a
/// handle never outlives the page it came from.
pub struct WebDriverBackend {
    client: Option<WebDriverClient>,
    webdriver_url: String,
    headless: bool,
    elements: HashMap<u32, Element>,
    next_id: u32,
}

impl WebDriverBackend {
    /// Connect to the WebDriver server at `webdriver_url` with a visible browser.
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.into(),
            headless: false,
            elements: HashMap::new(),
            next_id: 1,
        }
    }

    /// Connect to the WebDriver server at `webdriver_url` and ask for a
    /// headless session. Useful for CI.
    pub fn new_headless(webdriver_url: impl Into<String>) -> Self {
        Self {
            headless: true,
            ..Self::new(webdriver_url)
        }
    }

    fn client(&self) -> Result<&WebDriverClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    fn element(&self, handle: &ElementHandle) -> Result<&Element, BackendError> {
        self.elements
            .get(&handle.id)
            .ok_or(BackendError::ElementNotFound { id: handle.id })
    }

    fn register(&mut self, found: Vec<Element>) -> Vec<ElementHandle> {
        found
            .into_iter()
            .map(|element| {
                let id = self.next_id;
                self.next_id += 1;
                self.elements.insert(id, element);
                ElementHandle::new(id)
            })
            .collect()
    }

    async fn get_navigation_result(
        client: &WebDriverClient,
    ) -> Result<NavigationResult, BackendError> {
        let title = client.client.title().await.unwrap_or_default();
        let url = client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();

        Ok(NavigationResult { url, title })
    }
}

/// Map a WebDriver failure on element `id` to the engine's error vocabulary.
fn element_error(id: u32, message: String) -> BackendError {
    let lowered = message.to_lowercase();
    if lowered.contains("stale element") {
        BackendError::ElementStale { id }
    } else if lowered.contains("no such element") {
        BackendError::ElementNotFound { id }
    } else {
        BackendError::ClickFailed {
            id,
            reason: message,
        }
    }
}

/// Map a WebDriver failure while resolving `locator`.
fn query_error(locator: &str, message: String) -> BackendError {
    if message.to_lowercase().contains("invalid selector") {
        BackendError::LocatorInvalid {
            locator: locator.to_string(),
        }
    } else {
        BackendError::Other(format!("Query '{}' failed: {}", locator, message))
    }
}

#[async_trait]
impl Backend for WebDriverBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let capabilities = self.headless.then(webdriver::headless_capabilities);
        let client = WebDriverClient::connect(&self.webdriver_url, capabilities)
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.elements.clear();
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.elements.clear();
        let client = self.client()?;

        info!("Navigating to: {}", url);
        client
            .client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        Self::get_navigation_result(client).await
    }

    async fn query(&mut self, locator: &str) -> Result<Vec<ElementHandle>, BackendError> {
        let found = self
            .client()?
            .client
            .find_all(Locator::Css(locator))
            .await
            .map_err(|e| query_error(locator, e.to_string()))?;
        debug!(locator, matched = found.len(), "query");
        Ok(self.register(found))
    }

    async fn query_within(
        &mut self,
        scope: &ElementHandle,
        locator: &str,
    ) -> Result<Vec<ElementHandle>, BackendError> {
        let found = self
            .element(scope)?
            .find_all(Locator::Css(locator))
            .await
            .map_err(|e| query_error(locator, e.to_string()))?;
        debug!(scope = scope.id, locator, matched = found.len(), "query_within");
        Ok(self.register(found))
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        self.element(element)?
            .click()
            .await
            .map_err(|e| element_error(element.id, e.to_string()))?;
        Ok(())
    }

    async fn has_marker(
        &mut self,
        element: &ElementHandle,
        marker: &Marker,
    ) -> Result<bool, BackendError> {
        let attribute = match marker {
            Marker::Class(_) => "class",
            Marker::Attribute(name) => name.as_str(),
        };
        let value = self
            .element(element)?
            .attr(attribute)
            .await
            .map_err(|e| element_error(element.id, e.to_string()))?;

        Ok(match marker {
            Marker::Class(_) => marker.matches(value.as_deref(), None),
            Marker::Attribute(_) => marker.matches(None, value.as_deref()),
        })
    }

    async fn set_cookie(&mut self, cookie: Cookie) -> Result<(), BackendError> {
        let client = self.client()?;
        let mut wd_cookie = fantoccini::cookies::Cookie::new(cookie.name, cookie.value);
        if let Some(domain) = cookie.domain {
            wd_cookie.set_domain(domain);
        }
        wd_cookie.set_path(cookie.path.unwrap_or_else(|| "/".to_string()));

        client
            .client
            .add_cookie(wd_cookie)
            .await
            .map_err(|e| BackendError::Other(format!("Set cookie failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_error_classification() {
        assert!(matches!(
            element_error(4, "stale element reference: element is not attached".into()),
            BackendError::ElementStale { id: 4 }
        ));
        assert!(matches!(
            element_error(4, "no such element: Unable to locate element".into()),
            BackendError::ElementNotFound { id: 4 }
        ));
        assert!(matches!(
            element_error(4, "element click intercepted".into()),
            BackendError::ClickFailed { id: 4, .. }
        ));
    }

    #[test]
    fn test_query_error_classification() {
        assert!(matches!(
            query_error("div[", "invalid selector: An invalid or illegal selector".into()),
            BackendError::LocatorInvalid { .. }
        ));
        assert!(matches!(
            query_error(".buy", "connection refused".into()),
            BackendError::Other(_)
        ));
    }

    #[tokio::test]
    async fn test_unlaunched_backend_is_not_ready() {
        let mut backend = WebDriverBackend::new("http://localhost:4444");
        assert!(!backend.is_ready().await);
        assert!(matches!(
            backend.query(".summary").await,
            Err(BackendError::NotReady)
        ));
        assert!(matches!(
            backend.click(&ElementHandle::new(1)).await,
            Err(BackendError::ElementNotFound { id: 1 })
        ));
    }
}
