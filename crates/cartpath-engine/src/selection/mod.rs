//! Selection under ambiguity.
//!
//! Both halves are pure: the orchestrator resolves elements and reads their
//! markers, then hands plain slices to [`pick`] and [`selectable`].

pub mod candidate;
pub mod variant;

pub use candidate::{SelectionError, pick};
pub use variant::selectable;
