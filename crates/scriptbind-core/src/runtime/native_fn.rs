//! Native function storage and callable trait.

use std::fmt;
use std::sync::Arc;

use crate::error::NativeError;

use super::CallContext;

/// Type-erased native function.
///
/// This wraps any callable that implements `NativeCallable`, allowing
/// functions of different signatures to be stored uniformly in a type tag.
///
/// The inner callable is reference counted: clones share it, which is how
/// one wrapper ends up both in a class's callable store and in the runtime's
/// dispatch table.
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    /// Create a new NativeFn from a callable.
    pub fn new<F>(f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Call this native function with the given context.
    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        self.inner.call(ctx)
    }

    /// Whether two wrappers share the same underlying callable.
    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of wrappers sharing the underlying callable.
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

impl Clone for NativeFn {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Trait for callable native functions.
///
/// The `call` method receives a `CallContext` that provides access to
/// arguments and allows setting the return value.
pub trait NativeCallable {
    /// Call this function with the given context.
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<(), NativeError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        (self)(ctx)
    }
}
