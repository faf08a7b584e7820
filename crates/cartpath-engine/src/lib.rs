pub mod backend;
pub mod config;
pub mod fixture;
pub mod orchestrator;
pub mod scenario;
pub mod selection;

pub use cartpath_common::protocol;
pub use orchestrator::{Orchestrator, RunError, RunReport, StageOutcome, prepare};
