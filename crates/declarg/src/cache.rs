use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ConfigError, Error};
use crate::registry::Registry;
use crate::target::Shape;

/// Memoized registries keyed by shape type.
///
/// Failed constructions are not cached; the next lookup rebuilds and fails
/// again with the same error.
#[derive(Debug, Default)]
pub struct RegistryCache {
    entries: Mutex<HashMap<TypeId, Arc<Registry>>>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Arc<Registry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registry for `T`, building it on first use.
    pub fn get_or_build<T: Shape>(&self) -> Result<Arc<Registry>, ConfigError> {
        let id = TypeId::of::<T>();
        if let Some(registry) = self.lock().get(&id) {
            return Ok(Arc::clone(registry));
        }

        // Built outside the lock; a concurrent builder of the same shape
        // produces an identical registry and the first insert wins.
        let built = Arc::new(Registry::build(&T::shape())?);
        tracing::debug!(shape = %built.shape_name(), "caching argument registry");
        Ok(Arc::clone(self.lock().entry(id).or_insert(built)))
    }

    /// Parse `args[offset..]` into `target` with the cached registry for `T`.
    pub fn parse_args<T: Shape, S: AsRef<str>>(
        &self,
        args: &[S],
        target: &mut T,
        offset: usize,
    ) -> Result<(), Error> {
        let registry = self.get_or_build::<T>()?;
        registry.parse(args, offset, target)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
