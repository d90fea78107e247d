/// What happens to a destination collection that already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CollectionMode {
    /// Clear it, then add the mapped elements.
    #[default]
    Replace,
    /// Keep what is there and add the mapped elements after it.
    Append,
}

/// Per-call settings for a mapping.
///
/// ```
/// use plait::{CollectionMode, MapOptions};
///
/// let options = MapOptions::new().merge_only(true).max_depth(4);
/// assert_eq!(options.collections, CollectionMode::Append);
/// assert!(!options.strict);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapOptions {
    /// How existing destination collections are treated
    pub collections: CollectionMode,

    /// How many objects deep a mapping may nest before it is aborted
    pub max_depth: usize,

    /// Whether a skipped field fails the whole call
    pub strict: bool,
}

impl MapOptions {
    /// Nesting limit used unless configured otherwise.
    pub const DEFAULT_MAX_DEPTH: usize = 10;

    /// Replace collections, nest up to [`Self::DEFAULT_MAX_DEPTH`], skip
    /// quietly.
    pub const fn new() -> Self {
        Self {
            collections: CollectionMode::Replace,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }

    /// Append to existing collections instead of replacing them.
    pub const fn merge_only(mut self, merge_only: bool) -> Self {
        self.collections = if merge_only {
            CollectionMode::Append
        } else {
            CollectionMode::Replace
        };
        self
    }

    /// Sets the collection mode.
    pub const fn collections(mut self, collections: CollectionMode) -> Self {
        self.collections = collections;
        self
    }

    /// Sets the nesting limit.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fail with [`MapError::Incomplete`](crate::MapError::Incomplete) when
    /// any field was skipped.
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        Self::new()
    }
}
