//! Variable declarations and the name → handler registry.
//!
//! Registration is two-phase: declarations are collected by a
//! [`RegistryBuilder`], which is then consumed into an immutable
//! [`Registry`]. Only the frozen registry can be used to compile or
//! interpret templates, so "no registration after finalization" is
//! enforced by ownership. [`SharedRegistry`] wraps the same lifecycle in
//! a process-wide value for hosts that register from several places.
mod shared;

use std::fmt::{self, Debug};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use thiserror::Error;

use crate::error::runtime::HandlerError;
use crate::field::Field;

pub use shared::SharedRegistry;

/// Resolves one variable for a context, appending the value to the buffer.
///
/// `field` is `Some` for fieldable variables and carries the selector the
/// template used (e.g. the header name of `$header.X-Trace`).
pub type Handler<C> =
    Arc<dyn Fn(&C, Option<&Field>, &mut String) -> Result<(), HandlerError> + Send + Sync>;

/// Hashes a field selector. Returning `None` rejects the selector.
pub type FieldHashFn = fn(&str) -> Option<u64>;

/// Maps a field selector to the name it is interned under, e.g. lowercasing
/// case-insensitive header names.
pub type FieldNormalizeFn = fn(&str) -> SmolStr;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Variable \"{0}\" is already registered")]
    DuplicateName(SmolStr),
    #[error("Variable registry is closed")]
    RegistryClosed,
    #[error("Variable index is already finalized")]
    AlreadyFinalized,
}

pub struct VariableDecl<C> {
    name: SmolStr,
    handler: Handler<C>,
    field_hash: Option<FieldHashFn>,
    field_normalize: Option<FieldNormalizeFn>,
    cacheable: bool,
    index: u32,
}

impl<C> VariableDecl<C> {
    pub fn new<F>(name: impl Into<SmolStr>, handler: F) -> Self
    where
        F: Fn(&C, Option<&Field>, &mut String) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
            field_hash: None,
            field_normalize: None,
            cacheable: false,
            index: 0,
        }
    }

    /// Marks the variable as taking a field selector. Values of fieldable
    /// variables are always memoized per field.
    pub fn fieldable(mut self, field_hash: FieldHashFn) -> Self {
        self.field_hash = Some(field_hash);
        self
    }

    /// Interns selectors under `normalize(selector)`, so that spellings the
    /// variable treats as equal share one field and one cache slot. The
    /// handler sees the normalized name.
    pub fn normalized(mut self, normalize: FieldNormalizeFn) -> Self {
        self.field_normalize = Some(normalize);
        self
    }

    /// Memoizes the value of a plain variable for the lifetime of a cache.
    pub fn cacheable(mut self) -> Self {
        self.cacheable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index assigned at registration, stable for the life of the registry.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_fieldable(&self) -> bool {
        self.field_hash.is_some()
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheable || self.is_fieldable()
    }

    pub(crate) fn field_hash(&self, field: &str) -> Option<u64> {
        self.field_hash.and_then(|hash| hash(field))
    }

    pub(crate) fn canonical_field(&self, field: &str) -> SmolStr {
        match self.field_normalize {
            Some(normalize) => normalize(field),
            None => field.into(),
        }
    }

    #[inline]
    pub(crate) fn resolve(
        &self,
        ctx: &C,
        field: Option<&Field>,
        out: &mut String,
    ) -> Result<(), HandlerError> {
        (self.handler)(ctx, field, out)
    }
}

impl<C> Clone for VariableDecl<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: Arc::clone(&self.handler),
            field_hash: self.field_hash,
            field_normalize: self.field_normalize,
            cacheable: self.cacheable,
            index: self.index,
        }
    }
}

impl<C> Debug for VariableDecl<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableDecl")
            .field("name", &self.name)
            .field("fieldable", &self.is_fieldable())
            .field("cacheable", &self.cacheable)
            .field("index", &self.index)
            .finish()
    }
}

/// Collects declarations before the index is built.
pub struct RegistryBuilder<C> {
    decls: Vec<VariableDecl<C>>,
}

impl<C> Default for RegistryBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Debug for RegistryBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("decls", &self.decls)
            .finish()
    }
}

impl<C> RegistryBuilder<C> {
    pub const fn new() -> Self {
        Self { decls: Vec::new() }
    }

    /// Adds a batch of declarations.
    ///
    /// The batch is all-or-nothing: if any name collides with a registered
    /// name or with another name in the same batch, nothing is added.
    pub fn register<I>(&mut self, decls: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = VariableDecl<C>>,
    {
        let batch = decls.into_iter().collect::<Vec<_>>();
        let mut names = self
            .decls
            .iter()
            .map(|decl| decl.name.as_str())
            .collect::<FxHashSet<_>>();

        for decl in &batch {
            if !names.insert(decl.name.as_str()) {
                return Err(RegistryError::DuplicateName(decl.name.clone()));
            }
        }

        let offset = self.decls.len();
        self.decls
            .extend(batch.into_iter().enumerate().map(|(i, mut decl)| {
                decl.index = (offset + i) as u32;
                decl
            }));

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Closes registration and builds the name index.
    pub fn finalize(self) -> Registry<C> {
        let index = self
            .decls
            .iter()
            .map(|decl| (decl.name.clone(), decl.index))
            .collect::<FxHashMap<_, _>>();

        tracing::debug!(variables = self.decls.len(), "variable index finalized");

        Registry {
            decls: self.decls.into_boxed_slice(),
            index,
        }
    }
}

/// Frozen variable table. Safe to share between threads.
pub struct Registry<C> {
    decls: Box<[VariableDecl<C>]>,
    index: FxHashMap<SmolStr, u32>,
}

impl<C> Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("decls", &self.decls)
            .finish()
    }
}

impl<C> Registry<C> {
    pub fn builder() -> RegistryBuilder<C> {
        RegistryBuilder::new()
    }

    pub fn find(&self, name: &str) -> Option<&VariableDecl<C>> {
        self.index
            .get(name)
            .and_then(|&index| self.decls.get(index as usize))
    }

    pub fn get(&self, index: u32) -> Option<&VariableDecl<C>> {
        self.decls.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableDecl<C>> {
        self.decls.iter()
    }
}
