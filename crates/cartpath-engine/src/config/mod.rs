pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{CartpathConfig, CookieSpec, SessionConfig, SettleConfig, SettleMode};
