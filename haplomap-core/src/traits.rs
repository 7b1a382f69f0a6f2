//! Traits shared by the per-location types of the heatmap.

/// A value that orders locations, such as a shrunk frequency or a p-value.
pub trait Scored {
    fn score(&self) -> f64;
}

/// Something tied to one geographic unit of the map.
pub trait Located {
    /// Key that identifies the unit across marker and baseline queries.
    fn key(&self) -> &str;

    /// Region name for display; `None` when only the key is known.
    fn region(&self) -> Option<&str> {
        None
    }
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for logs and terminal output.
    fn summary(&self) -> String;
}
