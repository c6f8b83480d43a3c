//! Embedded runtime: value model, userdata heap, type tags and call dispatch.
//!
//! ## Key Types
//!
//! - [`Dynamic`]: Runtime value type for call-stack slots
//! - [`NativeFn`]: Type-erased callable wrapper
//! - [`CallContext`]: Bridge between the runtime and Rust for function calls
//! - [`ObjectHeap`]: Generational arena of userdata buffers
//! - [`TypeTagTable`]: Per-class dispatch tables
//! - [`Runtime`]: Owns all of the above and performs script-side calls

mod call_context;
mod dynamic;
mod native_fn;
mod object_heap;
mod type_tag;

pub use call_context::CallContext;
pub use dynamic::Dynamic;
pub use native_fn::{NativeCallable, NativeFn};
pub use object_heap::{ObjectHandle, ObjectHeap};
pub use type_tag::{CONSTRUCTOR_KEY, INDEX_KEY, TagEntry, TagId, TypeTag, TypeTagTable};

use crate::config::RuntimeConfig;
use crate::error::{NativeError, RuntimeError};

/// A single embedded runtime instance.
///
/// The runtime owns raw userdata buffers and is meant to be driven from one
/// thread.
#[derive(Debug)]
pub struct Runtime {
    heap: ObjectHeap,
    tags: TypeTagTable,
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with an explicit configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            heap: ObjectHeap::new(),
            tags: TypeTagTable::with_limit(config.max_type_tags),
            config,
        }
    }

    pub fn heap(&self) -> &ObjectHeap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut ObjectHeap {
        &mut self.heap
    }

    pub fn type_tags(&self) -> &TypeTagTable {
        &self.tags
    }

    pub fn type_tags_mut(&mut self) -> &mut TypeTagTable {
        &mut self.tags
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Invoke a callable over raw slots and return what it left in the
    /// return slot.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(
        &mut self,
        function: &NativeFn,
        slots: &mut [Dynamic],
        arg_offset: usize,
    ) -> Result<Dynamic, NativeError> {
        let mut ret = Dynamic::Nil;
        let mut ctx = CallContext::new(slots, arg_offset, &mut ret, self);
        function.call(&mut ctx)?;
        Ok(ret)
    }

    /// Call `Class.key(args...)`: a direct entry of the class's type tag.
    pub fn call_static(
        &mut self,
        class: &str,
        key: &str,
        args: impl IntoIterator<Item = Dynamic>,
    ) -> Result<Dynamic, RuntimeError> {
        let tag = self
            .tags
            .by_name(class)
            .ok_or_else(|| RuntimeError::UnknownClass {
                name: class.to_string(),
            })?;
        let function = self
            .tags
            .entry(tag, key)
            .and_then(TagEntry::as_function)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownMember {
                class: class.to_string(),
                member: key.to_string(),
            })?;

        let mut slots: Vec<Dynamic> = args.into_iter().collect();
        Ok(self.call(&function, &mut slots, 0)?)
    }

    /// Call `Class.new(args...)`.
    pub fn construct(
        &mut self,
        class: &str,
        args: impl IntoIterator<Item = Dynamic>,
    ) -> Result<Dynamic, RuntimeError> {
        self.call_static(class, CONSTRUCTOR_KEY, args)
    }

    /// Call `receiver:key(args...)`, resolving `key` through the receiver's
    /// type tag.
    pub fn call_method(
        &mut self,
        receiver: &Dynamic,
        key: &str,
        args: impl IntoIterator<Item = Dynamic>,
    ) -> Result<Dynamic, RuntimeError> {
        let handle = receiver.as_object().ok_or(RuntimeError::NotAnObject {
            actual: receiver.type_name(),
        })?;
        let tag = self
            .heap
            .tag(handle)
            .ok_or(RuntimeError::Untagged {
                index: handle.index,
            })?;
        let function = self.tags.lookup(tag, key).cloned().ok_or_else(|| {
            RuntimeError::UnknownMember {
                class: self
                    .tags
                    .get(tag)
                    .map(|t| t.name().to_string())
                    .unwrap_or_default(),
                member: key.to_string(),
            }
        })?;

        let mut slots = vec![receiver.clone()];
        slots.extend(args);
        Ok(self.call(&function, &mut slots, 1)?)
    }

    /// Borrow the native value behind an object slot.
    pub fn instance<T: 'static>(&self, value: &Dynamic) -> Option<&T> {
        self.heap.get::<T>(value.as_object()?)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use super::*;

    fn add() -> NativeFn {
        NativeFn::new(|ctx: &mut CallContext<'_>| {
            let a: i64 = ctx.arg(0)?;
            let b: i64 = ctx.arg(1)?;
            ctx.set_return(a + b)
        })
    }

    struct Counter(i64);

    fn counter_runtime() -> (Runtime, TagId) {
        let mut rt = Runtime::new();
        let tag = rt
            .type_tags_mut()
            .tag_for("Counter", TypeId::of::<Counter>())
            .unwrap();
        let bump = NativeFn::new(|ctx: &mut CallContext<'_>| {
            let by: i64 = ctx.arg(0)?;
            let counter = ctx.this_mut::<Counter>()?;
            counter.0 += by;
            let total = counter.0;
            ctx.set_return(total)
        });
        let tags = rt.type_tags_mut();
        tags.raw_set(tag, INDEX_KEY, TagEntry::SelfRef).unwrap();
        tags.raw_set(tag, "bump", TagEntry::Function(bump)).unwrap();
        tags.raw_set(tag, "add", TagEntry::Function(add())).unwrap();
        (rt, tag)
    }

    fn counter_instance(rt: &mut Runtime, tag: TagId, start: i64) -> Dynamic {
        let handle = rt.heap_mut().allocate(Counter(start));
        rt.heap_mut().set_tag(handle, tag).unwrap();
        Dynamic::Object(handle)
    }

    #[test]
    fn native_fn_call() {
        let mut rt = Runtime::new();
        let mut slots = vec![Dynamic::Int(10), Dynamic::Int(20)];
        let ret = rt.call(&add(), &mut slots, 0).unwrap();
        assert_eq!(ret, Dynamic::Int(30));
    }

    #[test]
    fn call_context_arg_count_and_offset() {
        let mut rt = Runtime::new();
        let mut slots = vec![Dynamic::Int(1), Dynamic::Int(2), Dynamic::Int(3)];
        let mut ret = Dynamic::Nil;

        let ctx = CallContext::new(&mut slots, 1, &mut ret, &mut rt);
        assert_eq!(ctx.arg_count(), 2);
        assert_eq!(ctx.arg_slot(0).unwrap(), &Dynamic::Int(2));
        assert!(matches!(
            ctx.arg_slot(5),
            Err(NativeError::ArgumentIndexOutOfBounds { index: 5, count: 2 })
        ));
    }

    #[test]
    fn call_context_arity() {
        let mut rt = Runtime::new();
        let mut slots = vec![Dynamic::Int(1), Dynamic::Int(2)];
        let mut ret = Dynamic::Nil;
        let ctx = CallContext::new(&mut slots, 0, &mut ret, &mut rt);

        assert!(ctx.check_arity(2).is_ok());
        assert!(matches!(
            ctx.check_arity(1),
            Err(NativeError::ArityMismatch { expected: 1, actual: 2 })
        ));
        assert!(matches!(
            ctx.check_arity(3),
            Err(NativeError::ArityMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn lenient_arity_ignores_extra_arguments() {
        let mut rt = Runtime::with_config(RuntimeConfig::new().with_strict_arity(false));
        let mut slots = vec![Dynamic::Int(1), Dynamic::Int(2)];
        let mut ret = Dynamic::Nil;
        let ctx = CallContext::new(&mut slots, 0, &mut ret, &mut rt);

        assert!(ctx.check_arity(1).is_ok());
        assert!(ctx.check_arity(3).is_err());
    }

    #[test]
    fn call_context_this_requires_object() {
        let mut rt = Runtime::new();
        let mut slots = vec![Dynamic::Int(42)];
        let mut ret = Dynamic::Nil;
        let ctx = CallContext::new(&mut slots, 1, &mut ret, &mut rt);

        assert!(matches!(
            ctx.this::<Counter>(),
            Err(NativeError::InvalidThis { .. })
        ));
    }

    #[test]
    fn call_context_this_needs_a_receiver_slot() {
        let mut rt = Runtime::new();
        let handle = rt.heap_mut().allocate(Counter(1));
        let mut slots = vec![Dynamic::Object(handle), Dynamic::Int(2)];
        let mut ret = Dynamic::Nil;
        let mut ctx = CallContext::new(&mut slots, 0, &mut ret, &mut rt);

        assert!(matches!(
            ctx.this::<Counter>(),
            Err(NativeError::InvalidThis { .. })
        ));

        ctx.bind_receiver().unwrap();
        assert_eq!(ctx.arg_count(), 1);
        assert_eq!(ctx.arg::<i64>(0).unwrap(), 2);
        assert_eq!(ctx.this::<Counter>().map(|c| c.0).unwrap(), 1);
    }

    #[test]
    fn call_context_this_wrong_type() {
        let mut rt = Runtime::new();
        let handle = rt.heap_mut().allocate(7u8);
        let mut slots = vec![Dynamic::Object(handle)];
        let mut ret = Dynamic::Nil;
        let mut ctx = CallContext::new(&mut slots, 1, &mut ret, &mut rt);

        assert!(ctx.this::<Counter>().is_err());
        assert!(ctx.this_mut::<Counter>().is_err());
        assert_eq!(ctx.this::<u8>().unwrap(), &7);
    }

    #[test]
    fn new_userdata_becomes_the_return_value() {
        let mut rt = Runtime::new();
        let mut slots = Vec::new();
        let mut ret = Dynamic::Nil;
        let handle = {
            let mut ctx = CallContext::new(&mut slots, 0, &mut ret, &mut rt);
            ctx.new_userdata(std::alloc::Layout::new::<u32>())
        };

        assert_eq!(ret, Dynamic::Object(handle));
        assert!(!rt.heap().is_initialized(handle));
    }

    #[test]
    fn call_method_resolves_through_index() {
        let (mut rt, tag) = counter_runtime();
        let counter = counter_instance(&mut rt, tag, 5);

        let ret = rt.call_method(&counter, "bump", [Dynamic::Int(3)]).unwrap();
        assert_eq!(ret, Dynamic::Int(8));
        assert_eq!(rt.instance::<Counter>(&counter).map(|c| c.0), Some(8));
    }

    #[test]
    fn call_method_errors() {
        let (mut rt, tag) = counter_runtime();
        let counter = counter_instance(&mut rt, tag, 0);

        assert!(matches!(
            rt.call_method(&Dynamic::Int(1), "bump", []),
            Err(RuntimeError::NotAnObject { actual: "int" })
        ));
        assert!(matches!(
            rt.call_method(&counter, "missing", []),
            Err(RuntimeError::UnknownMember { .. })
        ));

        let untagged = Dynamic::Object(rt.heap_mut().allocate(Counter(0)));
        assert!(matches!(
            rt.call_method(&untagged, "bump", [Dynamic::Int(1)]),
            Err(RuntimeError::Untagged { .. })
        ));

        assert!(matches!(
            rt.call_method(&counter, "bump", [Dynamic::String("x".into())]),
            Err(RuntimeError::Native(NativeError::Conversion(_)))
        ));
    }

    #[test]
    fn call_static_uses_direct_entries() {
        let (mut rt, _) = counter_runtime();

        let ret = rt
            .call_static("Counter", "add", [Dynamic::Int(2), Dynamic::Int(2)])
            .unwrap();
        assert_eq!(ret, Dynamic::Int(4));

        assert!(matches!(
            rt.call_static("Nope", "add", []),
            Err(RuntimeError::UnknownClass { .. })
        ));
        assert!(matches!(
            rt.construct("Counter", []),
            Err(RuntimeError::UnknownMember { .. })
        ));
    }
}
