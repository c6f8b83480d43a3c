//! Class bindings.
//!
//! A class binding exposes a native Rust type to a [`Runtime`] as a script
//! class: a type tag holding a `new` constructor entry plus one entry per
//! method and field getter, and a `set_` entry per writable field.
//!
//! - [`ClassBuilder`] collects the constructor and [`Member`]s and registers them
//! - [`binder`] installs members into the type tag
//! - [`InstanceFactory`] constructs instances inside runtime-owned buffers
//! - [`FieldAccessor`], [`ReadOnlyAccessor`] and [`Const`] describe fields
//!
//! [`Runtime`]: scriptbind_core::Runtime

mod accessor;
pub mod binder;
mod builder;
mod factory;
mod member;

pub use accessor::{Const, FieldAccessor, ReadOnlyAccessor};
pub use binder::SETTER_PREFIX;
pub use builder::ClassBuilder;
pub use factory::InstanceFactory;
pub use member::{Member, MemberBinding};

/// A native type that can be exposed as a script class.
pub trait NativeClass: 'static {
    /// Name the class is exposed under.
    const NAME: &'static str;
}

/// A native class that describes its own members.
///
/// Usually implemented by `#[derive(NativeClass)]` from field attributes.
pub trait ClassMembers: NativeClass + Sized {
    /// Members in binding order.
    fn members() -> Vec<Member<Self>>;
}
