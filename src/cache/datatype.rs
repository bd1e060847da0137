//! Cache of [`Datatype`] objects keyed by OID.

use std::collections::HashMap;
use std::fmt;

use crate::connection::Connection;
use crate::options::{PreCacheLimit, PreCacheState, ReaderOptions};
use crate::reader::DatatypeReader;
use crate::types::{Datatype, Oid, TypeClass};

/// Datatype cache bound to one connection.
///
/// Misses load a single row. Call [`pre_cache`](Self::pre_cache) first
/// when many types will be needed.
pub struct DatatypeCache<'c, C: Connection + ?Sized> {
    conn: &'c C,
    types: HashMap<Oid, Datatype>,
    pre_cached: PreCacheState,
    options: ReaderOptions,
    /// Returned when a lookup query fails; never stored in `types`.
    fallback: Datatype,
}

impl<'c, C: Connection + ?Sized> DatatypeCache<'c, C> {
    /// Create an empty cache for `conn` with the default listing options.
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            types: HashMap::new(),
            pre_cached: PreCacheState::default(),
            options: ReaderOptions::default(),
            fallback: Datatype::default(),
        }
    }

    /// Set the listing used by [`pre_cache`](Self::pre_cache).
    ///
    /// The options' own limit is ignored; `pre_cache` takes its own.
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Create a cache for `conn` seeded with the entries of another cache.
    pub fn with_initial<D: Connection + ?Sized>(conn: &'c C, other: &DatatypeCache<'_, D>) -> Self {
        tracing::debug!(types = other.types.len(), "datatype cache: set initial");
        Self {
            conn,
            types: other.types.clone(),
            pre_cached: other.pre_cached,
            options: other.options.clone(),
            fallback: Datatype::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Check if an OID is cached, without querying.
    pub fn contains(&self, oid: Oid) -> bool {
        self.types.contains_key(&oid)
    }

    /// Resolve an OID, loading it on a miss.
    ///
    /// OIDs missing from the catalog resolve to an `(unknown)` placeholder.
    ///
    /// OID 0 is a caller bug: it asserts in debug builds and returns the
    /// placeholder without querying in release builds.
    pub fn get(&mut self, oid: Oid) -> &Datatype {
        debug_assert!(oid != 0, "datatype lookup with an empty OID");
        if oid == 0 {
            self.fallback = Datatype::unknown(oid);
            return &self.fallback;
        }

        if self.types.contains_key(&oid) {
            tracing::trace!(oid, "datatype cache: hit");
        } else {
            tracing::trace!(oid, "datatype cache: miss");
            let mut reader = DatatypeReader::by_oid(self.conn, oid);
            if !reader.is_loaded() {
                tracing::error!(oid, "datatype cache: failed to load type");
                self.fallback = Datatype::unknown(oid);
                return &self.fallback;
            }

            match reader.next() {
                Some(datatype) if datatype.oid() == oid => {
                    self.types.insert(oid, datatype);
                }
                _ => {
                    tracing::warn!(oid, "datatype cache: unable to load type, using placeholder");
                    self.types.insert(oid, Datatype::unknown(oid));
                }
            }
        }

        match self.types.get(&oid) {
            Some(datatype) => datatype,
            None => &self.fallback,
        }
    }

    /// Semantic class of a type, by its base type for domains.
    pub fn type_class(&mut self, oid: Oid) -> TypeClass {
        self.get(oid).type_class()
    }

    /// Load up to `limit` types of the configured listing; 0 loads all.
    ///
    /// Does nothing if an earlier call already loaded at least as many.
    pub fn pre_cache(&mut self, limit: usize) {
        let limit = PreCacheLimit::from_limit(limit);
        if !self.pre_cached.needs_fetch(limit) {
            return;
        }

        let mut options = self.options.clone();
        options.limit = limit.rows();
        let reader = DatatypeReader::new(self.conn, &options);
        if !reader.is_loaded() {
            tracing::error!("datatype cache: failed to load type details");
            return;
        }

        let mut loaded = 0;
        // Synthetic serial rows carry OID 0.
        for datatype in reader.filter(|d| d.oid() != 0) {
            self.types.entry(datatype.oid()).or_insert(datatype);
            loaded += 1;
        }
        tracing::debug!(loaded, cached = self.types.len(), "datatype cache: pre-cached");
        self.pre_cached.record(limit);
    }
}

impl<C: Connection + ?Sized> fmt::Debug for DatatypeCache<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatatypeCache")
            .field("types", &self.types.len())
            .field("pre_cached", &self.pre_cached)
            .field("options", &self.options)
            .finish()
    }
}
