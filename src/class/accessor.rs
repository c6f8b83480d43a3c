//! Field accessors.
//!
//! A field accessor is a pair of projections from an instance to one of its
//! fields. Member descriptors capture accessors by value; the getter and
//! setter callables they synthesize go through these projections.

use std::fmt;
use std::ops::Deref;

use scriptbind_core::{ConversionError, Dynamic, Runtime, ToScript};

/// Read and write access to a field `F` of `T`.
///
/// Build one with [`field!`](crate::field).
pub struct FieldAccessor<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T, F> FieldAccessor<T, F> {
    pub const fn new(get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self {
        Self { get, get_mut }
    }

    pub fn get<'a>(&self, this: &'a T) -> &'a F {
        (self.get)(this)
    }

    pub fn get_mut<'a>(&self, this: &'a mut T) -> &'a mut F {
        (self.get_mut)(this)
    }

    /// Drop the write half.
    pub fn read_only(self) -> ReadOnlyAccessor<T, F> {
        ReadOnlyAccessor { get: self.get }
    }
}

impl<T, F> Clone for FieldAccessor<T, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, F> Copy for FieldAccessor<T, F> {}

impl<T, F> fmt::Debug for FieldAccessor<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor").finish_non_exhaustive()
    }
}

/// Read-only access to a field `F` of `T`.
///
/// There is no way to get a mutable projection out of it, so members built
/// from it never get a setter. Build one with
/// [`readonly_field!`](crate::readonly_field).
pub struct ReadOnlyAccessor<T, F> {
    get: fn(&T) -> &F,
}

impl<T, F> ReadOnlyAccessor<T, F> {
    pub const fn new(get: fn(&T) -> &F) -> Self {
        Self { get }
    }

    pub fn get<'a>(&self, this: &'a T) -> &'a F {
        (self.get)(this)
    }
}

impl<T, F> Clone for ReadOnlyAccessor<T, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, F> Copy for ReadOnlyAccessor<T, F> {}

impl<T, F> fmt::Debug for ReadOnlyAccessor<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyAccessor").finish_non_exhaustive()
    }
}

/// Build a [`FieldAccessor`] for a named field.
///
/// ```
/// use scriptbind::field;
///
/// struct Point { x: i64 }
///
/// let x = field!(Point, x);
/// let mut p = Point { x: 1 };
/// *x.get_mut(&mut p) = 5;
/// assert_eq!(*x.get(&p), 5);
/// ```
#[macro_export]
macro_rules! field {
    ($ty:ty, $field:ident) => {
        $crate::class::FieldAccessor::<$ty, _>::new(
            |this: &$ty| &this.$field,
            |this: &mut $ty| &mut this.$field,
        )
    };
}

/// Build a [`ReadOnlyAccessor`] for a named field.
#[macro_export]
macro_rules! readonly_field {
    ($ty:ty, $field:ident) => {
        $crate::class::ReadOnlyAccessor::<$ty, _>::new(|this: &$ty| &this.$field)
    };
}

/// A field that is never written after construction.
///
/// `Const` hands out shared references only and can be returned to scripts
/// but never read back from them. A `Const` field can therefore only be
/// exposed read-only; asking for a setter does not compile:
///
/// ```compile_fail
/// use scriptbind::class::{Const, Member};
/// use scriptbind::field;
///
/// struct Settings { limit: Const<i64> }
///
/// let _ = Member::<Settings>::field("limit", field!(Settings, limit));
/// ```
///
/// ```
/// use scriptbind::class::{Const, Member};
/// use scriptbind::readonly_field;
///
/// struct Settings { limit: Const<i64> }
///
/// let member = Member::<Settings>::readonly_field("limit", readonly_field!(Settings, limit));
/// assert_eq!(member.name(), "limit");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Const<F>(F);

impl<F> Const<F> {
    pub const fn new(value: F) -> Self {
        Self(value)
    }

    pub fn get(&self) -> &F {
        &self.0
    }

    pub fn into_inner(self) -> F {
        self.0
    }
}

impl<F> Deref for Const<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

impl<F> From<F> for Const<F> {
    fn from(value: F) -> Self {
        Self(value)
    }
}

impl<F: ToScript> ToScript for Const<F> {
    fn to_vm(self, runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        self.0.to_vm(runtime)
    }
}
