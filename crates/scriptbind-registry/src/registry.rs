//! ClassRegistry - one binding record per native type.
//!
//! Records are keyed by [`TypeId`], so two Rust types registered under the
//! same script name keep separate records. A record is created the first time
//! its type finishes registration and is only ever updated afterwards:
//! registering a type again overwrites its name and tag and leaves it valid.
//!
//! # Example
//!
//! ```
//! use scriptbind_core::TagId;
//! use scriptbind_registry::{CallableStore, ClassRegistry};
//!
//! struct Player;
//!
//! let mut registry = ClassRegistry::new();
//! assert_eq!(registry.registered_name::<Player>(), "");
//!
//! registry.record::<Player>("Player", TagId::new(0), CallableStore::new());
//! assert!(registry.is_registered::<Player>());
//! assert_eq!(registry.registered_name::<Player>(), "Player");
//! ```

use std::any::{self, TypeId};

use rustc_hash::FxHashMap;
use scriptbind_core::TagId;

use crate::CallableStore;

/// Registration record of a single native type.
#[derive(Clone, Debug)]
pub struct ClassBinding {
    name: String,
    valid: bool,
    callables: CallableStore,
    tag: Option<TagId>,
    type_name: &'static str,
}

impl ClassBinding {
    fn new(type_name: &'static str) -> Self {
        Self {
            name: String::new(),
            valid: false,
            callables: CallableStore::new(),
            tag: None,
            type_name,
        }
    }

    /// Name the class is exposed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether registration has completed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Store holding the class's bound callables.
    pub fn callables(&self) -> &CallableStore {
        &self.callables
    }

    /// Type tag produced by the most recent registration.
    pub fn tag(&self) -> Option<TagId> {
        self.tag
    }

    /// Rust type name of the bound class.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Binding records of all registered native types.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    bindings: FxHashMap<TypeId, ClassBinding>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `T` as registered under `name`.
    ///
    /// Called once registration of `T` has fully succeeded.
    pub fn record<T: 'static>(&mut self, name: &str, tag: TagId, callables: CallableStore) {
        let binding = self
            .bindings
            .entry(TypeId::of::<T>())
            .or_insert_with(|| ClassBinding::new(any::type_name::<T>()));
        if binding.valid && binding.name != name {
            log::debug!(
                "{} re-registered as '{name}' (was '{}')",
                binding.type_name,
                binding.name
            );
        }
        binding.name = name.to_string();
        binding.tag = Some(tag);
        binding.callables = callables;
        binding.valid = true;
    }

    /// Record of `T`, if it has been registered.
    pub fn binding<T: 'static>(&self) -> Option<&ClassBinding> {
        self.bindings.get(&TypeId::of::<T>())
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.binding::<T>().is_some_and(ClassBinding::is_valid)
    }

    /// Name `T` was registered under, or an empty string.
    pub fn registered_name<T: 'static>(&self) -> String {
        self.binding::<T>()
            .map(|binding| binding.name.clone())
            .unwrap_or_default()
    }

    pub fn callables<T: 'static>(&self) -> Option<CallableStore> {
        self.binding::<T>().map(|binding| binding.callables.clone())
    }

    pub fn tag<T: 'static>(&self) -> Option<TagId> {
        self.binding::<T>().and_then(ClassBinding::tag)
    }

    /// All records, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassBinding> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
