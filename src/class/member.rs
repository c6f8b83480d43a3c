//! Member descriptors.

use std::fmt;
use std::marker::PhantomData;

use scriptbind_core::{FromScript, IntoMethod, IntoMethodMut, NativeFn, ToScript};

use super::accessor::{FieldAccessor, ReadOnlyAccessor};

/// Shape of a bound member, with its already-marshalled callables.
#[derive(Clone, Debug)]
pub enum MemberBinding {
    /// Method taking `&mut self`
    MutatingMethod(NativeFn),
    /// Method taking `&self`
    ReadOnlyMethod(NativeFn),
    /// Field exposed with a getter and a setter
    MutableField { getter: NativeFn, setter: NativeFn },
    /// Field exposed with a getter only
    ImmutableField { getter: NativeFn },
}

impl MemberBinding {
    /// Number of dispatch-table entries the member installs.
    pub fn entry_count(&self) -> usize {
        match self {
            MemberBinding::MutableField { .. } => 2,
            _ => 1,
        }
    }
}

/// One member of a native class `T`, ready to be bound.
pub struct Member<T> {
    name: String,
    binding: MemberBinding,
    _marker: PhantomData<fn(T)>,
}

impl<T: 'static> Member<T> {
    fn new(name: impl Into<String>, binding: MemberBinding) -> Self {
        Self {
            name: name.into(),
            binding,
            _marker: PhantomData,
        }
    }

    /// A method that reads the receiver.
    pub fn method<M, Args, Ret>(name: impl Into<String>, method: M) -> Self
    where
        M: IntoMethod<T, Args, Ret>,
    {
        Self::new(name, MemberBinding::ReadOnlyMethod(method.into_method()))
    }

    /// A method that mutates the receiver.
    pub fn method_mut<M, Args, Ret>(name: impl Into<String>, method: M) -> Self
    where
        M: IntoMethodMut<T, Args, Ret>,
    {
        Self::new(name, MemberBinding::MutatingMethod(method.into_method_mut()))
    }

    /// A field readable and writable from scripts.
    ///
    /// The getter returns a clone of the field; the setter, installed under
    /// `set_<name>`, assigns its argument to it.
    pub fn field<F>(name: impl Into<String>, accessor: FieldAccessor<T, F>) -> Self
    where
        F: FromScript + ToScript + Clone + 'static,
    {
        let getter = IntoMethod::<T, (), F>::into_method(move |this: &T| {
            accessor.get(this).clone()
        });
        let setter = IntoMethodMut::<T, (F,), ()>::into_method_mut(move |this: &mut T, value: F| {
            *accessor.get_mut(this) = value;
        });
        Self::new(name, MemberBinding::MutableField { getter, setter })
    }

    /// A field readable from scripts.
    pub fn readonly_field<F>(name: impl Into<String>, accessor: ReadOnlyAccessor<T, F>) -> Self
    where
        F: ToScript + Clone + 'static,
    {
        let getter = IntoMethod::<T, (), F>::into_method(move |this: &T| {
            accessor.get(this).clone()
        });
        Self::new(name, MemberBinding::ImmutableField { getter })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> &MemberBinding {
        &self.binding
    }

    pub fn into_parts(self) -> (String, MemberBinding) {
        (self.name, self.binding)
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("binding", &self.binding)
            .finish()
    }
}
