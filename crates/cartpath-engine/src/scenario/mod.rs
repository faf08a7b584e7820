pub mod builtin;
pub mod definition;
pub mod loader;
pub mod registry;
pub mod schema;

pub use definition::{ScenarioDefinition, ScenarioTier, Stage};
pub use loader::{ScenarioLoadError, ScenarioLoader};
pub use registry::ScenarioRegistry;
pub use schema::{Validatable, ValidationError};
