use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use scriptbind_core::NativeFn;

/// Shared, append-only collection of bound callables.
///
/// Cloning the store clones the handle: every clone appends to and reads
/// from the same collection. The binder pushes each callable it installs so
/// the embedding layer keeps a record of everything a class exposes.
#[derive(Clone, Default)]
pub struct CallableStore {
    inner: Arc<Mutex<Vec<NativeFn>>>,
}

impl CallableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callable.
    pub fn push(&self, function: NativeFn) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(function);
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the callables collected so far, in insertion order.
    pub fn snapshot(&self) -> Vec<NativeFn> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether two handles refer to the same collection.
    pub fn ptr_eq(&self, other: &CallableStore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for CallableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableStore")
            .field("len", &self.len())
            .finish()
    }
}
