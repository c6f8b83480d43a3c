//! Call context bridging the runtime and native Rust functions.

use std::alloc::Layout;
use std::any;
use std::fmt;

use crate::convert::{FromScript, ToScript};
use crate::error::NativeError;
use crate::marshal::FromArgs;

use super::{Dynamic, ObjectHandle, ObjectHeap, Runtime};

/// Context for native function calls.
///
/// This bridges the runtime and Rust, providing access to function arguments
/// and the ability to set return values.
///
/// ## Typed Argument Access
///
/// Use `arg::<T>()` for a single argument or `args::<(A, B)>()` to decode
/// the whole argument list with an arity check:
///
/// ```ignore
/// let x: i32 = ctx.arg(0)?;
/// let (x, y): (i32, f64) = ctx.args()?;
/// ```
///
/// ## Return Values
///
/// ```ignore
/// ctx.set_return(x + y)?;
/// ```
pub struct CallContext<'vm> {
    /// Argument slots (for methods, slot 0 is `this`)
    slots: &'vm mut [Dynamic],
    /// Index of first argument (0 for functions, 1 for methods where 0 is `this`)
    arg_offset: usize,
    /// Return value slot
    return_slot: &'vm mut Dynamic,
    /// Owning runtime: heap, type tags and configuration
    runtime: &'vm mut Runtime,
}

impl<'vm> CallContext<'vm> {
    /// Create a new call context.
    ///
    /// # Arguments
    ///
    /// * `slots` - The argument slots (for methods, slot 0 is `this`)
    /// * `arg_offset` - Offset to first argument (0 for functions, 1 for methods)
    /// * `return_slot` - Where to store the return value
    /// * `runtime` - The runtime the call happens in
    pub fn new(
        slots: &'vm mut [Dynamic],
        arg_offset: usize,
        return_slot: &'vm mut Dynamic,
        runtime: &'vm mut Runtime,
    ) -> Self {
        Self {
            slots,
            arg_offset,
            return_slot,
            runtime,
        }
    }

    /// Get the number of arguments (excluding `this` for methods).
    pub fn arg_count(&self) -> usize {
        self.slots.len().saturating_sub(self.arg_offset)
    }

    /// Get a raw reference to an argument slot.
    pub fn arg_slot(&self, index: usize) -> Result<&Dynamic, NativeError> {
        let slot_index = self.arg_offset + index;
        self.slots
            .get(slot_index)
            .ok_or(NativeError::ArgumentIndexOutOfBounds {
                index,
                count: self.arg_count(),
            })
    }

    /// Get a typed argument value.
    pub fn arg<T: FromScript>(&self, index: usize) -> Result<T, NativeError> {
        let slot = self.arg_slot(index)?;
        T::from_vm(slot, &*self.runtime).map_err(NativeError::Conversion)
    }

    /// Check the call's argument count against a signature of `expected`
    /// parameters.
    ///
    /// Too few arguments always fail. Extra arguments fail only when the
    /// runtime is configured for strict arity.
    pub fn check_arity(&self, expected: usize) -> Result<(), NativeError> {
        let actual = self.arg_count();
        let too_many = actual > expected && self.runtime.config().strict_arity;
        if actual < expected || too_many {
            return Err(NativeError::ArityMismatch { expected, actual });
        }
        Ok(())
    }

    /// Decode the whole argument list into a tuple.
    pub fn args<A: FromArgs>(&self) -> Result<A, NativeError> {
        self.check_arity(A::ARITY)?;
        A::from_args(self)
    }

    /// Set the return value from a raw slot.
    pub fn set_return_slot(&mut self, slot: Dynamic) {
        *self.return_slot = slot;
    }

    /// Set a typed return value.
    pub fn set_return<T: ToScript>(&mut self, value: T) -> Result<(), NativeError> {
        *self.return_slot = value.to_vm(&mut *self.runtime)?;
        Ok(())
    }

    /// Treat the first slot as the receiver and the slots after it as
    /// arguments.
    ///
    /// A member can be reached with the receiver already split off
    /// (`receiver:key(args)`) or with the instance as its first argument
    /// (`Class.key(instance, args)`); both end up with the same layout.
    pub fn bind_receiver(&mut self) -> Result<(), NativeError> {
        if self.slots.is_empty() {
            return Err(NativeError::invalid_this("call has no receiver"));
        }
        self.arg_offset = self.arg_offset.max(1);
        Ok(())
    }

    /// The receiver lives in the slot just before the first argument.
    fn this_handle<T>(&self) -> Result<ObjectHandle, NativeError> {
        let Some(index) = self.arg_offset.checked_sub(1) else {
            return Err(NativeError::invalid_this("call has no receiver slot"));
        };
        match self.slots.get(index) {
            Some(Dynamic::Object(handle)) => Ok(*handle),
            Some(other) => Err(NativeError::invalid_this(format!(
                "expected {} object, got {}",
                any::type_name::<T>(),
                other.type_name()
            ))),
            None => Err(NativeError::invalid_this("no slots available")),
        }
    }

    /// Get an immutable reference to `this` for method calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the call has no receiver slot, the receiver is not
    /// an object, the handle is stale, or the buffer does not hold a `T`.
    pub fn this<T: 'static>(&self) -> Result<&T, NativeError> {
        let handle = self.this_handle::<T>()?;
        self.runtime.heap().get::<T>(handle).ok_or_else(|| {
            NativeError::invalid_this(format!(
                "object type mismatch or stale handle for {}",
                any::type_name::<T>()
            ))
        })
    }

    /// Get a mutable reference to `this` for method calls.
    ///
    /// # Errors
    ///
    /// Same as [`this`](Self::this).
    pub fn this_mut<T: 'static>(&mut self) -> Result<&mut T, NativeError> {
        let handle = self.this_handle::<T>()?;
        self.runtime.heap_mut().get_mut::<T>(handle).ok_or_else(|| {
            NativeError::invalid_this(format!(
                "object type mismatch or stale handle for {}",
                any::type_name::<T>()
            ))
        })
    }

    /// Allocate an uninitialized userdata buffer and make it the return value.
    pub fn new_userdata(&mut self, layout: Layout) -> ObjectHandle {
        let handle = self.runtime.heap_mut().allocate_uninit(layout);
        *self.return_slot = Dynamic::Object(handle);
        handle
    }

    /// Get access to the object heap.
    pub fn heap(&self) -> &ObjectHeap {
        self.runtime.heap()
    }

    /// Get mutable access to the object heap.
    pub fn heap_mut(&mut self) -> &mut ObjectHeap {
        self.runtime.heap_mut()
    }

    /// Get access to the runtime.
    pub fn runtime(&self) -> &Runtime {
        &*self.runtime
    }

    /// Get mutable access to the runtime.
    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut *self.runtime
    }
}

impl fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("arg_count", &self.arg_count())
            .field("arg_offset", &self.arg_offset)
            .finish()
    }
}
