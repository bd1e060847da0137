//! Cache of type display names.
//!
//! Maps a type OID to its `format_type()` output, with and without a type
//! modifier. Names are fetched lazily and only the missing piece is asked
//! for: a full miss loads the whole `pg_type` row (plus the requested
//! modifier's name in the same query), a partial hit asks the server to
//! format just the new modifier.

use std::collections::HashMap;
use std::fmt;

use crate::connection::Connection;
use crate::cursor::ResultCursor;
use crate::error::Result;
use crate::options::{PreCacheLimit, PreCacheState};
use crate::types::{Oid, TypeClass, UNKNOWN_TYPE_NAME};

/// Everything the cache knows about one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedTypeEntry {
    /// Semantic class (of the base type, for domains).
    pub type_class: TypeClass,
    /// `format_type(oid, NULL)`.
    pub basic_name: String,
    /// `pg_type.typtypmod`.
    pub default_typmod: i32,
    /// `format_type(oid, typmod)` for every modifier seen so far.
    full_names: HashMap<i32, String>,
    /// False for placeholders of OIDs the catalog does not know.
    resolved: bool,
}

impl CachedTypeEntry {
    fn placeholder(oid: Oid, typmod: Option<i32>) -> Self {
        let mut entry = Self {
            type_class: TypeClass::of(oid),
            basic_name: UNKNOWN_TYPE_NAME.to_string(),
            default_typmod: -1,
            full_names: HashMap::new(),
            resolved: false,
        };
        entry.full_names.insert(-1, UNKNOWN_TYPE_NAME.to_string());
        if let Some(typmod) = typmod {
            entry.full_names.insert(typmod, UNKNOWN_TYPE_NAME.to_string());
        }
        entry
    }

    /// Formatted name for `typmod`, if already known.
    pub fn full_name(&self, typmod: i32) -> Option<&str> {
        self.full_names.get(&typmod).map(String::as_str)
    }

    /// Whether the entry describes a real catalog type.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Add names from `other` that this entry lacks. Known names never change.
    fn merge(&mut self, other: CachedTypeEntry) {
        for (typmod, name) in other.full_names {
            self.full_names.entry(typmod).or_insert(name);
        }
    }
}

enum Lookup {
    Miss,
    PartialHit,
    Hit,
}

/// What a single-type load asks for.
#[derive(Clone, Copy)]
enum LoadScope {
    Batch(PreCacheLimit),
    Single { oid: Oid, typmod: Option<i32> },
}

/// Type name cache bound to one connection.
///
/// The cache borrows the connection for its whole life, so it can never
/// answer with names from a different database.
///
/// # Example
///
/// ```no_run
/// use pg_typecache::{Connection, TypeNameCache, PG_TYPE_NUMERIC};
///
/// fn describe(conn: &impl Connection) -> String {
///     let mut cache = TypeNameCache::new(conn);
///     cache.pre_cache(0);
///     cache.full_name(PG_TYPE_NUMERIC, (10 << 16) + 2 + 4)
/// }
/// ```
pub struct TypeNameCache<'c, C: Connection + ?Sized> {
    conn: &'c C,
    types: HashMap<Oid, CachedTypeEntry>,
    pre_cached: PreCacheState,
}

impl<'c, C: Connection + ?Sized> TypeNameCache<'c, C> {
    /// Create an empty cache for `conn`.
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            types: HashMap::new(),
            pre_cached: PreCacheState::default(),
        }
    }

    /// Create a cache for `conn` seeded with the entries of another cache.
    ///
    /// Used when opening a second connection to the same database.
    pub fn with_initial<D: Connection + ?Sized>(conn: &'c C, other: &TypeNameCache<'_, D>) -> Self {
        tracing::debug!(types = other.types.len(), "type cache: set initial");
        Self {
            conn,
            types: other.types.clone(),
            pre_cached: other.pre_cached,
        }
    }

    /// Number of cached types, placeholders included.
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

    /// Cached entry for an OID, without querying.
    pub fn entry(&self, oid: Oid) -> Option<&CachedTypeEntry> {
        self.types.get(&oid)
    }

    /// Short type name, `format_type(oid, NULL)`.
    pub fn basic_name(&mut self, oid: Oid) -> String {
        self.lookup(oid, None)
            .map_or_else(|| UNKNOWN_TYPE_NAME.to_string(), |e| e.basic_name.clone())
    }

    /// Semantic class of a type.
    pub fn type_class(&mut self, oid: Oid) -> TypeClass {
        self.lookup(oid, None)
            .map_or_else(|| TypeClass::of(oid), |e| e.type_class)
    }

    /// Full type name, `format_type(oid, typmod)`; -1 means no modifier.
    pub fn full_name(&mut self, oid: Oid, typmod: i32) -> String {
        self.lookup(oid, Some(typmod))
            .and_then(|e| e.full_name(typmod))
            .unwrap_or(UNKNOWN_TYPE_NAME)
            .to_string()
    }

    /// Full type name with the type's own default modifier.
    pub fn default_full_name(&mut self, oid: Oid) -> String {
        match self.lookup(oid, None) {
            Some(entry) => {
                let typmod = entry.default_typmod;
                self.full_name(oid, typmod)
            }
            None => UNKNOWN_TYPE_NAME.to_string(),
        }
    }

    /// Load up to `limit` types in one query; 0 loads every type.
    ///
    /// Does nothing if an earlier call already loaded at least as many.
    pub fn pre_cache(&mut self, limit: usize) {
        let limit = PreCacheLimit::from_limit(limit);
        if !self.pre_cached.needs_fetch(limit) {
            return;
        }

        match self.load_types(LoadScope::Batch(limit)) {
            Ok(loaded) => {
                tracing::debug!(loaded, cached = self.types.len(), "type cache: pre-cached");
                self.pre_cached.record(limit);
            }
            Err(e) => tracing::error!(error = %e, "type cache: failed to load type details"),
        }
    }

    /// Make sure `oid` (and `typmod`, if given) are cached.
    ///
    /// Returns `None` when the catalog could not be queried, and for OID 0,
    /// which asserts in debug builds and is never sent to the server.
    fn lookup(&mut self, oid: Oid, typmod: Option<i32>) -> Option<&CachedTypeEntry> {
        debug_assert!(oid != 0, "type lookup with an empty OID");
        if oid == 0 {
            return None;
        }

        let state = match self.types.get(&oid) {
            None => Lookup::Miss,
            Some(entry) if typmod.is_some_and(|m| !entry.full_names.contains_key(&m)) => {
                Lookup::PartialHit
            }
            Some(_) => Lookup::Hit,
        };

        match state {
            Lookup::Miss => {
                tracing::trace!(oid, "type cache: miss");
                match self.load_types(LoadScope::Single { oid, typmod }) {
                    Ok(_) if !self.types.contains_key(&oid) => {
                        tracing::warn!(oid, "type cache: unable to load type, using placeholder");
                        self.types
                            .insert(oid, CachedTypeEntry::placeholder(oid, typmod));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, oid, "type cache: failed to load type details");
                        return None;
                    }
                }
            }
            Lookup::PartialHit => {
                if let Some(typmod) = typmod {
                    tracing::trace!(oid, typmod, "type cache: partial hit");
                    self.load_mod_name(oid, typmod);
                }
            }
            Lookup::Hit => tracing::trace!(oid, "type cache: hit"),
        }

        self.types.get(&oid)
    }

    /// Fetch one or many `pg_type` rows into the cache.
    fn load_types(&mut self, scope: LoadScope) -> Result<usize> {
        let sql = load_sql(scope);
        let mut cursor = ResultCursor::new(self.conn.execute_query(&sql)?);

        let mut loaded = 0;
        while !cursor.eof() {
            let (oid, bymod) = match scope {
                LoadScope::Single { oid, typmod } => (oid, typmod),
                LoadScope::Batch(_) => (cursor.get_oid("oid"), None),
            };

            let default_typmod = cursor.get_i64("typtypmod") as i32;
            let base_oid = cursor.get_oid("typbasetype");
            let mut entry = CachedTypeEntry {
                type_class: TypeClass::of_base(oid, base_oid),
                basic_name: cursor.get_text("basic").to_string(),
                default_typmod,
                full_names: HashMap::new(),
                resolved: true,
            };
            entry
                .full_names
                .insert(default_typmod, cursor.get_text("def").to_string());
            if let Some(typmod) = bymod {
                entry
                    .full_names
                    .insert(typmod, cursor.get_text("bymod").to_string());
            }

            match self.types.get_mut(&oid) {
                Some(existing) => existing.merge(entry),
                None => {
                    self.types.insert(oid, entry);
                }
            }

            loaded += 1;
            cursor.move_next();
        }

        Ok(loaded)
    }

    /// Fetch the formatted name of a modifier for an already cached type.
    fn load_mod_name(&mut self, oid: Oid, typmod: i32) {
        let Some(entry) = self.types.get_mut(&oid) else {
            return;
        };

        if !entry.resolved {
            entry
                .full_names
                .insert(typmod, UNKNOWN_TYPE_NAME.to_string());
            return;
        }

        tracing::debug!(oid, typmod, "type cache: loading full name");
        match self.conn.execute_scalar(&format!("SELECT format_type({oid},{typmod})")) {
            Ok(name) => {
                entry.full_names.insert(typmod, name);
            }
            Err(e) => {
                tracing::error!(error = %e, oid, typmod, "type cache: failed to format type name");
            }
        }
    }
}

impl<C: Connection + ?Sized> fmt::Debug for TypeNameCache<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeNameCache")
            .field("types", &self.types.len())
            .field("pre_cached", &self.pre_cached)
            .finish()
    }
}

fn load_sql(scope: LoadScope) -> String {
    const COMMON_FIELDS: &str = "typtypmod,typbasetype,\
         format_type(oid,NULL) AS basic,\
         format_type(oid,typtypmod) AS def";

    match scope {
        LoadScope::Single { oid, typmod } => {
            tracing::debug!(oid, ?typmod, "type cache: loading type");
            let bymod = typmod
                .map(|m| format!(",format_type(oid,{m}) AS bymod"))
                .unwrap_or_default();
            format!("SELECT {COMMON_FIELDS}{bymod} FROM pg_type WHERE oid={oid}")
        }
        LoadScope::Batch(limit) => {
            tracing::debug!(limit = ?limit.rows(), "type cache: loading types in a batch");
            let limit = limit
                .rows()
                .map(|n| format!(" LIMIT {n}"))
                .unwrap_or_default();
            format!("SELECT oid,{COMMON_FIELDS} FROM pg_type{limit}")
        }
    }
}
