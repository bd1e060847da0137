//! Configuration for catalog listings and cache pre-loading.

use std::cmp::Ordering;

/// Options for the default [`DatatypeReader`](crate::DatatypeReader) listing.
///
/// # Example
///
/// ```
/// use pg_typecache::ReaderOptions;
///
/// let options = ReaderOptions::new()
///     .with_domains(false)
///     .with_serials(true)
///     .show_system_objects(true)
///     .with_limit(50);
/// assert!(!options.domains);
/// assert_eq!(options.limit, Some(50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Include domain types.
    pub domains: bool,
    /// Append the `serial` and `bigserial` pseudo entries.
    pub serials: bool,
    /// Include types from `information_schema`.
    pub system_objects: bool,
    /// Maximum number of rows to read.
    pub limit: Option<usize>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            domains: true,
            serials: false,
            system_objects: false,
            limit: None,
        }
    }
}

impl ReaderOptions {
    /// Default options: domains included, no serials, no system objects.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domains(mut self, domains: bool) -> Self {
        self.domains = domains;
        self
    }

    pub fn with_serials(mut self, serials: bool) -> Self {
        self.serials = serials;
        self
    }

    pub fn show_system_objects(mut self, show: bool) -> Self {
        self.system_objects = show;
        self
    }

    /// Limit the number of rows; 0 means no limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }
}

/// How many catalog rows a pre-cache pass asked for.
///
/// Any bounded limit is smaller than `Unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreCacheLimit {
    Bounded(usize),
    Unbounded,
}

impl PreCacheLimit {
    /// Interpret a row limit where 0 means "everything".
    pub fn from_limit(limit: usize) -> Self {
        if limit == 0 {
            PreCacheLimit::Unbounded
        } else {
            PreCacheLimit::Bounded(limit)
        }
    }

    /// The SQL `LIMIT` value, if any.
    pub fn rows(&self) -> Option<usize> {
        match self {
            PreCacheLimit::Bounded(n) => Some(*n),
            PreCacheLimit::Unbounded => None,
        }
    }
}

impl PartialOrd for PreCacheLimit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PreCacheLimit {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PreCacheLimit::Bounded(a), PreCacheLimit::Bounded(b)) => a.cmp(b),
            (PreCacheLimit::Bounded(_), PreCacheLimit::Unbounded) => Ordering::Less,
            (PreCacheLimit::Unbounded, PreCacheLimit::Bounded(_)) => Ordering::Greater,
            (PreCacheLimit::Unbounded, PreCacheLimit::Unbounded) => Ordering::Equal,
        }
    }
}

/// Tracks the largest pre-cache pass already satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PreCacheState {
    satisfied: Option<PreCacheLimit>,
}

impl PreCacheState {
    /// Whether a pass with `limit` still needs a round trip.
    pub(crate) fn needs_fetch(&self, limit: PreCacheLimit) -> bool {
        self.satisfied.map_or(true, |done| limit > done)
    }

    pub(crate) fn record(&mut self, limit: PreCacheLimit) {
        if self.needs_fetch(limit) {
            self.satisfied = Some(limit);
        }
    }
}
