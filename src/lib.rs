//! scriptbind exposes native Rust types to an embedded dynamic scripting
//! runtime as script classes.
//!
//! A class is registered once at start-up with a [`ClassBuilder`]: a
//! constructor, then methods and fields in order. Registration creates the
//! class's type tag in the [`Runtime`], installs a `new` entry that
//! constructs instances in runtime-owned buffers, binds every member, and
//! records the class in a [`ClassRegistry`].
//!
//! ```
//! use scriptbind::prelude::*;
//!
//! #[derive(Clone, NativeClass)]
//! struct Point {
//!     #[native(get, set)]
//!     x: i64,
//!     #[native(get, set)]
//!     y: i64,
//! }
//!
//! let mut runtime = Runtime::new();
//! let store = CallableStore::new();
//! ClassBuilder::<Point>::from_class(|x: i64, y: i64| Point { x, y })
//!     .method("getSum", |p: &Point| p.x + p.y)
//!     .register(&mut runtime, &store)?;
//!
//! let p = runtime.construct("Point", [Dynamic::Int(3), Dynamic::Int(4)])?;
//! runtime.call_method(&p, "set_x", [Dynamic::Int(10)])?;
//! assert_eq!(runtime.call_method(&p, "getSum", [])?, Dynamic::Int(14));
//! assert_eq!(scriptbind::registered_name::<Point>(), "Point");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

extern crate self as scriptbind;

pub mod class;

pub use class::{ClassBuilder, ClassMembers, InstanceFactory, Member, NativeClass};
pub use scriptbind_core::{
    CONSTRUCTOR_KEY, CallContext, ConversionError, Dynamic, FromArgs, FromScript, HeapError,
    INDEX_KEY, IntoMethod, IntoMethodMut, IntoNativeFn, NativeCallable, NativeConstructor,
    NativeError, NativeFn, ObjectHandle, ObjectHeap, Runtime, RuntimeConfig, RuntimeError,
    TagEntry, TagError, TagId, ToScript, TypeTag, TypeTagTable,
};
pub use scriptbind_registry::{
    CallableStore, ClassBinding, ClassRegistry, RegistrationError, is_registered,
    registered_name,
};

#[cfg(feature = "derive")]
pub use scriptbind_macros::NativeClass;

/// Access to the process-wide class registry.
pub mod registry {
    pub use scriptbind_registry::global::{with_global, with_global_mut};
}

pub mod prelude {
    pub use crate::class::{Const, FieldAccessor, ReadOnlyAccessor};
    pub use crate::{
        CallableStore, ClassBuilder, ClassMembers, Dynamic, FromScript, Member, NativeClass,
        Runtime, RuntimeConfig, ToScript, field, readonly_field,
    };
}
