//! ClassBuilder for exposing native types to a runtime.
//!
//! # Example
//!
//! ```
//! use scriptbind::{CallableStore, ClassBuilder, Dynamic, Runtime, field};
//!
//! struct Point { x: i64, y: i64 }
//!
//! let mut runtime = Runtime::new();
//! let store = CallableStore::new();
//!
//! ClassBuilder::<Point>::new("Point", |x: i64, y: i64| Point { x, y })
//!     .field("x", field!(Point, x))
//!     .method("sum", |p: &Point| p.x + p.y)
//!     .register(&mut runtime, &store)?;
//!
//! let p = runtime.construct("Point", [Dynamic::Int(3), Dynamic::Int(4)])?;
//! assert_eq!(runtime.call_method(&p, "sum", [])?, Dynamic::Int(7));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::any::TypeId;
use std::fmt;

use scriptbind_core::{
    CONSTRUCTOR_KEY, FromArgs, FromScript, INDEX_KEY, IntoMethod, IntoMethodMut,
    NativeConstructor, NativeFn, Runtime, TagEntry, TagId, ToScript,
};
use scriptbind_registry::{CallableStore, ClassRegistry, RegistrationError, global};

use super::accessor::{FieldAccessor, ReadOnlyAccessor};
use super::binder;
use super::factory::InstanceFactory;
use super::member::Member;
use super::ClassMembers;

type ConstructorFactory = Box<dyn FnOnce(TagId) -> NativeFn>;

/// Collects the constructor and members of a native class `T`, then
/// registers them with a runtime.
pub struct ClassBuilder<T: 'static> {
    name: String,
    constructor: ConstructorFactory,
    members: Vec<Member<T>>,
}

impl<T: 'static> ClassBuilder<T> {
    /// Start a class exposed under `name`, constructed by `constructor`.
    pub fn new<C, Args>(name: impl Into<String>, constructor: C) -> Self
    where
        C: NativeConstructor<T, Args>,
        Args: FromArgs + 'static,
    {
        Self {
            name: name.into(),
            constructor: Box::new(move |tag| InstanceFactory::<T>::entry_point(tag, constructor)),
            members: Vec::new(),
        }
    }

    /// Start a class from its derived name and members.
    pub fn from_class<C, Args>(constructor: C) -> Self
    where
        T: ClassMembers,
        C: NativeConstructor<T, Args>,
        Args: FromArgs + 'static,
    {
        Self::new(T::NAME, constructor).members(T::members())
    }

    /// Add a method that reads the receiver.
    pub fn method<M, Args, Ret>(self, name: impl Into<String>, method: M) -> Self
    where
        M: IntoMethod<T, Args, Ret>,
    {
        self.member(Member::method(name, method))
    }

    /// Add a method that mutates the receiver.
    pub fn method_mut<M, Args, Ret>(self, name: impl Into<String>, method: M) -> Self
    where
        M: IntoMethodMut<T, Args, Ret>,
    {
        self.member(Member::method_mut(name, method))
    }

    /// Add a field with a getter and a `set_` setter.
    pub fn field<F>(self, name: impl Into<String>, accessor: FieldAccessor<T, F>) -> Self
    where
        F: FromScript + ToScript + Clone + 'static,
    {
        self.member(Member::field(name, accessor))
    }

    /// Add a field with a getter only.
    pub fn readonly_field<F>(self, name: impl Into<String>, accessor: ReadOnlyAccessor<T, F>) -> Self
    where
        F: ToScript + Clone + 'static,
    {
        self.member(Member::readonly_field(name, accessor))
    }

    /// Add a prebuilt member.
    pub fn member(mut self, member: Member<T>) -> Self {
        self.members.push(member);
        self
    }

    /// Add members in order, e.g. from [`ClassMembers::members`].
    pub fn members(mut self, members: impl IntoIterator<Item = Member<T>>) -> Self {
        self.members.extend(members);
        self
    }

    /// Name the class will be exposed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of members added so far, not counting the constructor.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Register the class and record it in the process-wide registry.
    pub fn register(
        self,
        runtime: &mut Runtime,
        store: &CallableStore,
    ) -> Result<TagId, RegistrationError> {
        let name = self.name.clone();
        let tag = self.bind(runtime, store)?;
        global::with_global_mut(|registry| registry.record::<T>(&name, tag, store.clone()));
        Ok(tag)
    }

    /// Register the class and record it in `registry`.
    pub fn register_in(
        self,
        runtime: &mut Runtime,
        store: &CallableStore,
        registry: &mut ClassRegistry,
    ) -> Result<TagId, RegistrationError> {
        let name = self.name.clone();
        let tag = self.bind(runtime, store)?;
        registry.record::<T>(&name, tag, store.clone());
        Ok(tag)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn bind(self, runtime: &mut Runtime, store: &CallableStore) -> Result<TagId, RegistrationError> {
        if self.name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let tags = runtime.type_tags_mut();
        let tag = tags.tag_for(&self.name, TypeId::of::<T>())?;
        tags.raw_set(tag, INDEX_KEY, TagEntry::SelfRef)?;
        binder::install(tags, tag, store, CONSTRUCTOR_KEY.to_string(), (self.constructor)(tag))?;

        let member_count = self.members.len();
        for member in self.members {
            binder::bind_member(tags, tag, store, member)?;
        }

        log::debug!(
            "registered class '{}' as type tag {tag} with {member_count} members",
            self.name
        );
        Ok(tag)
    }
}

impl<T: 'static> fmt::Debug for ClassBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("name", &self.name)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}
