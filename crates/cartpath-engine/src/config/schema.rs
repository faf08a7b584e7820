use cartpath_common::protocol::{Cookie, Marker};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartpathConfig {
    /// Storefront root that relative `navigate` stages are joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
    /// Extra scenario definitions; these override built-ins of the same name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios_dir: Option<PathBuf>,
    #[serde(default)]
    pub settle: SettleConfig,
    #[serde(default)]
    pub variants: VariantConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for CartpathConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fixtures_dir: default_fixtures_dir(),
            scenarios_dir: None,
            settle: SettleConfig::default(),
            variants: VariantConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("./fixtures")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleMode {
    /// Sleep for the delay written on each wait stage.
    #[default]
    Fixed,
    /// Poll until the awaited role matches, bounded by `timeout_ms`.
    Poll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleConfig {
    #[serde(default)]
    pub mode: SettleMode,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            mode: SettleMode::default(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SettleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_timeout_ms() -> u64 {
    10000
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Marker used when a fixture does not name its own.
    #[serde(default)]
    pub selected_marker: Marker,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookies seeded once the first page of a run has loaded.
    #[serde(default)]
    pub cookies: Vec<CookieSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Environment variable holding the value; takes precedence over `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl CookieSpec {
    /// Build the cookie, or `None` when no value is available.
    pub fn resolve(&self) -> Option<Cookie> {
        let value = match &self.value_env {
            Some(var) => std::env::var(var).ok(),
            None => None,
        }
        .or_else(|| self.value.clone())?;

        Some(Cookie {
            name: self.name.clone(),
            value,
            domain: self.domain.clone(),
            path: self.path.clone(),
        })
    }
}
