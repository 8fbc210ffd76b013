//! Per-context memoization of resolved values.
use std::cell::Cell;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use crate::arena::{Arena, ArenaId};

/// What a cached value was resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A field of a fieldable variable, by field table index.
    Field(u32),
    /// A plain cacheable variable, by registry index.
    Variable(u32),
}

/// Values resolved for one runtime context.
///
/// A cache belongs to exactly one context (typically one request) and is
/// dropped with it. Entries are written once and never replaced, so the
/// first resolution of a key wins for the cache's whole lifetime. The type
/// is neither `Clone` nor `Sync`.
#[derive(Debug, Default)]
pub struct Cache {
    values: Arena<String>,
    table: FxHashMap<CacheKey, ArenaId<String>>,
    spare: String,
    _not_sync: PhantomData<Cell<()>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Arena::new(capacity),
            table: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ..Self::default()
        }
    }

    #[inline]
    pub fn lookup(&self, key: CacheKey) -> Option<&str> {
        self.table
            .get(&key)
            .map(|&id| self.values[id].as_str())
    }

    /// Stores `value` under `key` and returns the cached value.
    ///
    /// If `key` is already present the existing value is kept and returned.
    pub fn store(&mut self, key: CacheKey, value: String) -> &str {
        let id = match self.table.get(&key).copied() {
            Some(id) => {
                self.recycle(value);
                id
            }
            None => {
                let id = self.values.alloc(value);
                self.table.insert(key, id);
                tracing::trace!(?key, "cache store");
                id
            }
        };

        &self.values[id]
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.table.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Hands out the scratch buffer, empty but keeping its capacity.
    pub(crate) fn take_spare(&mut self) -> String {
        let mut spare = std::mem::take(&mut self.spare);
        spare.clear();
        spare
    }

    /// Returns a buffer that did not make it into the cache.
    pub(crate) fn recycle(&mut self, mut buf: String) {
        if buf.capacity() > self.spare.capacity() {
            buf.clear();
            self.spare = buf;
        }
    }
}
