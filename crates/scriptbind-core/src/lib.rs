//! Runtime side of scriptbind.
//!
//! This crate holds everything a class binding talks to at run time: the
//! [`Dynamic`] value model, the userdata [`ObjectHeap`], per-class
//! [`TypeTagTable`]s, the [`CallContext`] native callables run in, and the
//! conversion and marshalling traits that turn typed Rust functions into
//! [`NativeFn`]s.

pub mod config;
pub mod convert;
pub mod error;
pub mod marshal;
pub mod runtime;

pub use config::RuntimeConfig;
pub use convert::{FromScript, ToScript};
pub use error::{ConversionError, HeapError, NativeError, RuntimeError, TagError};
pub use marshal::{FromArgs, IntoMethod, IntoMethodMut, IntoNativeFn, NativeConstructor};
pub use runtime::{
    CONSTRUCTOR_KEY, CallContext, Dynamic, INDEX_KEY, NativeCallable, NativeFn, ObjectHandle,
    ObjectHeap, Runtime, TagEntry, TagId, TypeTag, TypeTagTable,
};
