/// Keep the candidates that are not already selected, in their original order.
///
/// An empty result is a valid outcome (the only option on an axis is often
/// pre-selected by the page); callers skip the stage instead of failing.
pub fn selectable<T, F>(candidates: Vec<T>, mut is_selected: F) -> Vec<T>
where
    F: FnMut(&T) -> bool,
{
    candidates
        .into_iter()
        .filter(|candidate| !is_selected(candidate))
        .collect()
}
