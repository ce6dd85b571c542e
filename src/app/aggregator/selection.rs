//! Latest-version selection

/// Anything carrying a dataset version number
pub trait Versioned {
    fn version(&self) -> u32;
}

/// Return the entry with the greatest version number
///
/// Scanning starts from the zero-value baseline, so an empty input (or one
/// where every entry is at version 0) yields `V::default()`. Version numbers
/// are unique per dataset, which makes the result independent of input order.
pub fn select_latest<V, I>(versions: I) -> V
where
    V: Versioned + Default,
    I: IntoIterator<Item = V>,
{
    let mut latest = V::default();
    for candidate in versions {
        if candidate.version() > latest.version() {
            latest = candidate;
        }
    }
    latest
}
