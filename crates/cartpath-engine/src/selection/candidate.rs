use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Cannot pick from an empty candidate set")]
    EmptyCandidateSet,
}

/// Draw one index uniformly from `[0, candidates.len())`.
///
/// An empty slice is an error rather than a no-op: it means a locator matched
/// nothing, which callers must surface.
pub fn pick<T, R: Rng + ?Sized>(candidates: &[T], rng: &mut R) -> Result<usize, SelectionError> {
    if candidates.is_empty() {
        return Err(SelectionError::EmptyCandidateSet);
    }
    Ok(rng.gen_range(0..candidates.len()))
}
