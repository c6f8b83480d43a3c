//! The process-wide class registry.
//!
//! Class registration normally records into this registry. It is never torn
//! down; records live for the rest of the process.

use std::sync::{PoisonError, RwLock};

use lazy_static::lazy_static;

use crate::ClassRegistry;

lazy_static! {
    static ref GLOBAL_REGISTRY: RwLock<ClassRegistry> = RwLock::new(ClassRegistry::new());
}

/// Run `f` with shared access to the process-wide registry.
pub fn with_global<R>(f: impl FnOnce(&ClassRegistry) -> R) -> R {
    let registry = GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    f(&registry)
}

/// Run `f` with exclusive access to the process-wide registry.
pub fn with_global_mut<R>(f: impl FnOnce(&mut ClassRegistry) -> R) -> R {
    let mut registry = GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut registry)
}

/// Whether `T` has completed registration.
pub fn is_registered<T: 'static>() -> bool {
    with_global(ClassRegistry::is_registered::<T>)
}

/// Name `T` was registered under, or an empty string if it never was.
pub fn registered_name<T: 'static>() -> String {
    with_global(ClassRegistry::registered_name::<T>)
}
