//! Instance factory: native values constructed inside runtime-owned buffers.
//!
//! The `new` entry of a class decodes its arguments, asks the runtime for a
//! raw buffer of exactly `size_of::<T>()` bytes, constructs the value
//! directly into it and tags the buffer with the class's type tag. The
//! buffer (and the value in it) belongs to the runtime's heap from then on.

use std::alloc::Layout;
use std::any;
use std::marker::PhantomData;

use scriptbind_core::{
    CallContext, ConversionError, Dynamic, FromArgs, HeapError, NativeConstructor, NativeError,
    NativeFn, ObjectHandle, ObjectHeap, Runtime, TagId,
};

/// Creates and copies instances of the native class `T`.
pub struct InstanceFactory<T>(PhantomData<fn() -> T>);

impl<T: 'static> InstanceFactory<T> {
    /// The runtime entry point constructing a `T` tagged with `tag`.
    ///
    /// Argument decoding happens before any allocation; if it fails no
    /// buffer is created.
    pub fn entry_point<C, Args>(tag: TagId, constructor: C) -> NativeFn
    where
        C: NativeConstructor<T, Args>,
        Args: FromArgs + 'static,
    {
        NativeFn::new(move |ctx: &mut CallContext<'_>| -> Result<(), NativeError> {
            let args = ctx.args::<Args>()?;
            let handle = ctx.new_userdata(Layout::new::<T>());
            let heap = ctx.heap_mut();
            heap.construct_with(handle, || constructor.construct(args))?;
            heap.set_tag(handle, tag)?;
            Ok(())
        })
    }

    /// Construct a clone of `source` into the uninitialized buffer `handle`.
    pub fn copy(heap: &mut ObjectHeap, handle: ObjectHandle, source: &T) -> Result<(), HeapError>
    where
        T: Clone,
    {
        heap.construct_with(handle, || source.clone())
    }

    /// Move `value` into a fresh buffer tagged with `T`'s type tag.
    pub fn emplace(runtime: &mut Runtime, value: T) -> Result<Dynamic, ConversionError> {
        let tag = runtime
            .type_tags()
            .tag_of::<T>()
            .ok_or(ConversionError::UnregisteredClass {
                type_name: any::type_name::<T>(),
            })?;

        let heap = runtime.heap_mut();
        let handle = heap.allocate_uninit(Layout::new::<T>());
        heap.construct(handle, value).map_err(failed)?;
        heap.set_tag(handle, tag).map_err(failed)?;
        Ok(Dynamic::Object(handle))
    }

    /// Clone the `T` an object slot refers to.
    pub fn read(slot: &Dynamic, runtime: &Runtime) -> Result<T, ConversionError>
    where
        T: Clone,
    {
        match slot {
            Dynamic::Object(handle) => runtime
                .heap()
                .get::<T>(*handle)
                .cloned()
                .ok_or(ConversionError::TypeMismatch {
                    expected: any::type_name::<T>(),
                    actual: runtime.heap().type_name_of(*handle).unwrap_or("object"),
                }),
            Dynamic::Nil => Err(ConversionError::NilValue {
                target_type: any::type_name::<T>(),
            }),
            other => Err(ConversionError::TypeMismatch {
                expected: any::type_name::<T>(),
                actual: other.type_name(),
            }),
        }
    }
}

fn failed(err: HeapError) -> ConversionError {
    ConversionError::Failed {
        message: err.to_string(),
    }
}
