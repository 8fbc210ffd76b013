use std::sync::{Arc, PoisonError, RwLock};

use super::{Registry, RegistryBuilder, RegistryError, VariableDecl};

enum State<C> {
    Open(RegistryBuilder<C>),
    Frozen(Arc<Registry<C>>),
}

/// A registry that can live in a `static`.
///
/// ```rust
/// use varc_lang::{SharedRegistry, VariableDecl};
///
/// struct Request {
///     host: String,
/// }
///
/// static VARIABLES: SharedRegistry<Request> = SharedRegistry::new();
///
/// VARIABLES
///     .register([VariableDecl::new("host", |r: &Request, _, out: &mut String| {
///         out.push_str(&r.host);
///         Ok(())
///     })])
///     .unwrap();
///
/// let registry = VARIABLES.finalize_index().unwrap();
/// assert!(registry.find("host").is_some());
/// assert!(VARIABLES.finalize_index().is_err());
/// ```
pub struct SharedRegistry<C> {
    state: RwLock<State<C>>,
}

impl<C> Default for SharedRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SharedRegistry<C> {
    pub const fn new() -> Self {
        Self {
            state: RwLock::new(State::Open(RegistryBuilder::new())),
        }
    }

    /// Adds a batch of declarations. Fails with
    /// [`RegistryError::RegistryClosed`] once the index is finalized.
    pub fn register<I>(&self, decls: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = VariableDecl<C>>,
    {
        match &mut *self.state.write().unwrap_or_else(PoisonError::into_inner) {
            State::Open(builder) => builder.register(decls),
            State::Frozen(_) => Err(RegistryError::RegistryClosed),
        }
    }

    /// Closes registration and returns the frozen registry.
    pub fn finalize_index(&self) -> Result<Arc<Registry<C>>, RegistryError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        match &mut *state {
            State::Open(builder) => {
                let registry = Arc::new(std::mem::take(builder).finalize());
                *state = State::Frozen(Arc::clone(&registry));
                Ok(registry)
            }
            State::Frozen(_) => Err(RegistryError::AlreadyFinalized),
        }
    }

    /// The frozen registry, or `None` while registration is still open.
    pub fn registry(&self) -> Option<Arc<Registry<C>>> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            State::Open(_) => None,
            State::Frozen(registry) => Some(Arc::clone(registry)),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.registry().is_some()
    }
}
