//! Field descriptors and the per-scope field table.
//!
//! A field is one concrete selector of a fieldable variable, such as the
//! header name in `$header.X-Trace`. Every template compiled into the same
//! [`FieldTable`] shares its fields, so two templates that reference the
//! same header resolve it once per cache.
use std::hash::Hasher;

use rustc_hash::{FxHashMap, FxHasher};
use smallvec::SmallVec;
use smol_str::SmolStr;
use thiserror::Error;

use crate::arena::{Arena, ArenaId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Field index {0} is out of range")]
    IndexOutOfRange(u32),
    #[error("Field table is full")]
    TableFull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: SmolStr,
    /// Short digest of `name`, compared before the name itself.
    pub hash: u16,
    /// Position in the owning table, or [`Field::DETACHED`].
    pub index: u32,
    /// Registry index of the variable the field belongs to.
    pub variable: u32,
}

impl Field {
    /// Index carried by fields that were never interned into a table.
    pub const DETACHED: u32 = u32::MAX;

    pub(crate) fn detached(variable: u32, hash: u16, name: &str) -> Self {
        Self {
            name: name.into(),
            hash,
            index: Self::DETACHED,
            variable,
        }
    }

    pub fn is_detached(&self) -> bool {
        self.index == Self::DETACHED
    }
}

/// Hashes a field name byte-wise. Empty names are rejected.
pub fn hash_field_name(name: &str) -> Option<u64> {
    if name.is_empty() {
        return None;
    }

    let mut hasher = FxHasher::default();
    hasher.write(name.as_bytes());
    Some(hasher.finish())
}

/// Ordered, append-only collection of fields. Indices are dense, start at
/// zero and are never reused.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: Arena<Field>,
    buckets: FxHashMap<(u32, u16), SmallVec<[ArenaId<Field>; 1]>>,
}

impl FieldTable {
    /// Handlers historically receive the field index as a 16-bit value.
    pub const MAX_FIELDS: usize = u16::MAX as usize + 1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: u32) -> Result<&Field, FieldError> {
        self.fields
            .get(index.into())
            .ok_or(FieldError::IndexOutOfRange(index))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().map(|(_, field)| field)
    }

    /// Finds a field of `variable` by short hash, then by name.
    pub fn find(&self, variable: u32, hash: u16, name: &str) -> Option<&Field> {
        self.buckets
            .get(&(variable, hash))?
            .iter()
            .map(|&id| &self.fields[id])
            .find(|field| field.name == name)
    }

    /// Returns the index of the matching field, appending a new one if
    /// there is none.
    pub fn intern(&mut self, variable: u32, hash: u16, name: &str) -> Result<u32, FieldError> {
        if let Some(field) = self.find(variable, hash, name) {
            return Ok(field.index);
        }

        if self.fields.len() >= Self::MAX_FIELDS {
            return Err(FieldError::TableFull);
        }

        let index = self.fields.next_id().as_u32();
        let id = self.fields.alloc(Field {
            name: name.into(),
            hash,
            index,
            variable,
        });
        self.buckets.entry((variable, hash)).or_default().push(id);

        tracing::trace!(index, variable, field = name, "field interned");

        Ok(index)
    }
}
