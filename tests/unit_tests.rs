//! End-to-end tests: classes registered with `ClassBuilder` and driven the
//! way a script would drive them, through `Runtime` calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use scriptbind::class::{Const, InstanceFactory, Member};
use scriptbind::{
    CallableStore, ClassBuilder, ClassRegistry, ConversionError, Dynamic, NativeError,
    RegistrationError, Runtime, RuntimeConfig, RuntimeError, ToScript, field, readonly_field,
    registered_name,
};

#[derive(Clone, Debug, PartialEq)]
struct Point {
    x: i64,
    y: i64,
}

impl Point {
    fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    fn get_sum(&self) -> i64 {
        self.x + self.y
    }

    fn scale(&mut self, by: i64) {
        self.x *= by;
        self.y *= by;
    }
}

fn point_runtime() -> (Runtime, CallableStore, ClassRegistry) {
    let mut rt = Runtime::new();
    let store = CallableStore::new();
    let mut registry = ClassRegistry::new();
    ClassBuilder::<Point>::new("Point", Point::new)
        .field("x", field!(Point, x))
        .field("y", field!(Point, y))
        .method("getSum", Point::get_sum)
        .method_mut("scale", Point::scale)
        .register_in(&mut rt, &store, &mut registry)
        .unwrap();
    (rt, store, registry)
}

// =============================================================================
// Point scenario
// =============================================================================

#[test]
fn test_point_scenario() {
    let (mut rt, _, _) = point_runtime();

    let p = rt
        .construct("Point", [Dynamic::Int(3), Dynamic::Int(4)])
        .unwrap();
    rt.call_method(&p, "set_x", [Dynamic::Int(10)]).unwrap();

    assert_eq!(rt.call_method(&p, "x", []).unwrap(), Dynamic::Int(10));
    assert_eq!(rt.call_method(&p, "y", []).unwrap(), Dynamic::Int(4));
    assert_eq!(rt.call_method(&p, "getSum", []).unwrap(), Dynamic::Int(14));
}

#[test]
fn test_point_scenario_through_class_table() {
    let (mut rt, _, _) = point_runtime();

    let p = rt
        .construct("Point", [Dynamic::Int(3), Dynamic::Int(4)])
        .unwrap();
    rt.call_static("Point", "set_x", [p.clone(), Dynamic::Int(10)])
        .unwrap();

    assert_eq!(
        rt.call_static("Point", "x", [p.clone()]).unwrap(),
        Dynamic::Int(10)
    );
    assert_eq!(
        rt.call_static("Point", "getSum", [p.clone()]).unwrap(),
        Dynamic::Int(14)
    );
    rt.call_static("Point", "scale", [p.clone(), Dynamic::Int(2)])
        .unwrap();
    assert_eq!(rt.call_method(&p, "getSum", []).unwrap(), Dynamic::Int(28));
}

#[test]
fn test_class_table_calls_with_lenient_arity() {
    let mut rt = Runtime::with_config(RuntimeConfig::new().with_strict_arity(false));
    let store = CallableStore::new();
    ClassBuilder::<Point>::new("Point", Point::new)
        .field("x", field!(Point, x))
        .method("getSum", Point::get_sum)
        .register_in(&mut rt, &store, &mut ClassRegistry::new())
        .unwrap();
    let p = rt
        .construct("Point", [Dynamic::Int(3), Dynamic::Int(4)])
        .unwrap();

    rt.call_static("Point", "set_x", [p.clone(), Dynamic::Int(10)])
        .unwrap();
    assert_eq!(
        rt.call_static("Point", "x", [p.clone()]).unwrap(),
        Dynamic::Int(10)
    );
    assert_eq!(
        rt.call_static("Point", "getSum", [p.clone(), Dynamic::Nil])
            .unwrap(),
        Dynamic::Int(14)
    );
    assert!(matches!(
        rt.call_static("Point", "set_x", [p]),
        Err(RuntimeError::Native(NativeError::ArityMismatch { expected: 1, actual: 0 }))
    ));
}

#[test]
fn test_class_table_call_without_instance() {
    let (mut rt, _, _) = point_runtime();

    assert!(matches!(
        rt.call_static("Point", "getSum", []),
        Err(RuntimeError::Native(NativeError::InvalidThis { .. }))
    ));
    assert!(matches!(
        rt.call_static("Point", "x", [Dynamic::Int(1)]),
        Err(RuntimeError::Native(NativeError::InvalidThis { .. }))
    ));
}

#[test]
fn test_mutating_method() {
    let (mut rt, _, _) = point_runtime();
    let p = rt
        .construct("Point", [Dynamic::Int(1), Dynamic::Int(2)])
        .unwrap();

    assert_eq!(rt.call_method(&p, "scale", [Dynamic::Int(3)]).unwrap(), Dynamic::Nil);
    assert_eq!(rt.instance::<Point>(&p), Some(&Point::new(3, 6)));
}

#[test]
fn test_constructor_equivalence() {
    let (mut rt, _, _) = point_runtime();

    for (x, y) in [(0, 0), (-5, 9), (i64::MAX, i64::MIN)] {
        let p = rt
            .construct("Point", [Dynamic::Int(x), Dynamic::Int(y)])
            .unwrap();
        assert_eq!(rt.instance::<Point>(&p), Some(&Point::new(x, y)));
    }
}

#[test]
fn test_field_round_trip() {
    let (mut rt, _, _) = point_runtime();
    let p = rt
        .construct("Point", [Dynamic::Int(0), Dynamic::Int(0)])
        .unwrap();

    for v in [1, -1, 42, i64::MIN] {
        rt.call_method(&p, "set_y", [Dynamic::Int(v)]).unwrap();
        assert_eq!(rt.call_method(&p, "y", []).unwrap(), Dynamic::Int(v));
    }
}

#[test]
fn test_instances_are_independent() {
    let (mut rt, _, _) = point_runtime();
    let a = rt
        .construct("Point", [Dynamic::Int(1), Dynamic::Int(1)])
        .unwrap();
    let b = rt
        .construct("Point", [Dynamic::Int(2), Dynamic::Int(2)])
        .unwrap();

    rt.call_method(&a, "set_x", [Dynamic::Int(100)]).unwrap();

    assert_eq!(rt.call_method(&a, "getSum", []).unwrap(), Dynamic::Int(101));
    assert_eq!(rt.call_method(&b, "getSum", []).unwrap(), Dynamic::Int(4));
}

// =============================================================================
// Signature mismatches
// =============================================================================

#[test]
fn test_wrong_argument_count() {
    let (mut rt, _, _) = point_runtime();

    let err = rt.construct("Point", [Dynamic::Int(1)]).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Native(NativeError::ArityMismatch { expected: 2, actual: 1 })
    ));

    let p = rt
        .construct("Point", [Dynamic::Int(1), Dynamic::Int(2)])
        .unwrap();
    let err = rt
        .call_method(&p, "getSum", [Dynamic::Int(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Native(NativeError::ArityMismatch { expected: 0, actual: 1 })
    ));
}

#[test]
fn test_lenient_arity() {
    let mut rt = Runtime::with_config(RuntimeConfig::new().with_strict_arity(false));
    let store = CallableStore::new();
    ClassBuilder::<Point>::new("Point", Point::new)
        .method("getSum", Point::get_sum)
        .register_in(&mut rt, &store, &mut ClassRegistry::new())
        .unwrap();

    let p = rt
        .construct("Point", [Dynamic::Int(1), Dynamic::Int(2), Dynamic::Int(3)])
        .unwrap();
    assert_eq!(
        rt.call_method(&p, "getSum", [Dynamic::Bool(true)]).unwrap(),
        Dynamic::Int(3)
    );
    assert!(rt.construct("Point", [Dynamic::Int(1)]).is_err());
}

#[test]
fn test_wrong_argument_type() {
    let (mut rt, _, _) = point_runtime();
    let err = rt
        .construct("Point", [Dynamic::Int(1), Dynamic::String("two".into())])
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Native(NativeError::Conversion(_))));
    assert_eq!(rt.heap().live_count(), 0);
}

// =============================================================================
// Name collisions and immutable fields
// =============================================================================

#[derive(Clone)]
struct Reading {
    value: i64,
}

#[test]
fn test_method_overwrites_field_getter() {
    let mut rt = Runtime::new();
    let store = CallableStore::new();
    ClassBuilder::<Reading>::new("Reading", |value: i64| Reading { value })
        .field("value", field!(Reading, value))
        .method("value", |r: &Reading| r.value * 100)
        .register_in(&mut rt, &store, &mut ClassRegistry::new())
        .unwrap();

    let r = rt.construct("Reading", [Dynamic::Int(2)]).unwrap();
    assert_eq!(rt.call_method(&r, "value", []).unwrap(), Dynamic::Int(200));

    // the setter installed by the field survives
    rt.call_method(&r, "set_value", [Dynamic::Int(5)]).unwrap();
    assert_eq!(rt.call_method(&r, "value", []).unwrap(), Dynamic::Int(500));
}

struct Account {
    id: Const<i64>,
    balance: i64,
}

#[test]
fn test_immutable_field_has_no_setter() {
    let mut rt = Runtime::new();
    let store = CallableStore::new();
    let tag = ClassBuilder::<Account>::new("Account", |id: i64| Account {
        id: Const::new(id),
        balance: 0,
    })
    .readonly_field("id", readonly_field!(Account, id))
    .readonly_field("balance", readonly_field!(Account, balance))
    .register_in(&mut rt, &store, &mut ClassRegistry::new())
    .unwrap();

    let a = rt.construct("Account", [Dynamic::Int(77)]).unwrap();
    assert_eq!(rt.call_method(&a, "id", []).unwrap(), Dynamic::Int(77));
    assert_eq!(rt.call_method(&a, "balance", []).unwrap(), Dynamic::Int(0));

    let type_tag = rt.type_tags().get(tag).unwrap();
    assert!(!type_tag.contains("set_id"));
    assert!(!type_tag.contains("set_balance"));
    assert!(matches!(
        rt.call_method(&a, "set_id", [Dynamic::Int(1)]),
        Err(RuntimeError::UnknownMember { .. })
    ));
}

// =============================================================================
// Registry
// =============================================================================

struct Lamp {
    on: bool,
}

#[test]
fn test_registered_name_before_and_after() {
    assert_eq!(registered_name::<Lamp>(), "");
    assert!(!scriptbind::is_registered::<Lamp>());

    let mut rt = Runtime::new();
    let store = CallableStore::new();
    ClassBuilder::<Lamp>::new("Lamp", |on: bool| Lamp { on })
        .method("isOn", |l: &Lamp| l.on)
        .register(&mut rt, &store)
        .unwrap();

    assert_eq!(registered_name::<Lamp>(), "Lamp");
    assert!(scriptbind::is_registered::<Lamp>());
    let lamp = rt.construct("Lamp", [Dynamic::Bool(true)]).unwrap();
    assert_eq!(rt.call_method(&lamp, "isOn", []).unwrap(), Dynamic::Bool(true));
}

struct Empty;

#[test]
fn test_failed_registration_records_nothing() {
    let mut rt = Runtime::new();
    let store = CallableStore::new();
    let err = ClassBuilder::<Empty>::new("", || Empty)
        .register(&mut rt, &store)
        .unwrap_err();

    assert_eq!(err, RegistrationError::EmptyName);
    assert!(!scriptbind::is_registered::<Empty>());
    assert_eq!(registered_name::<Empty>(), "");
}

#[test]
fn test_store_collects_every_callable() {
    let (_, store, registry) = point_runtime();

    // new, x, set_x, y, set_y, getSum, scale
    assert_eq!(store.len(), 7);
    assert!(registry.callables::<Point>().unwrap().ptr_eq(&store));
}

mod first {
    #[derive(Debug, PartialEq)]
    pub struct Widget(pub i64);
}

mod second {
    #[derive(Debug, PartialEq)]
    pub struct Widget(pub String);
}

#[test]
fn test_same_name_different_types() {
    let mut rt = Runtime::new();
    let store = CallableStore::new();
    let mut registry = ClassRegistry::new();

    let first_tag = ClassBuilder::<first::Widget>::new("Widget", first::Widget)
        .method("describe", |w: &first::Widget| w.0)
        .register_in(&mut rt, &store, &mut registry)
        .unwrap();
    let first_widget = rt.construct("Widget", [Dynamic::Int(1)]).unwrap();

    let second_tag = ClassBuilder::<second::Widget>::new("Widget", second::Widget)
        .method("describe", |w: &second::Widget| w.0.clone())
        .register_in(&mut rt, &store, &mut registry)
        .unwrap();
    let second_widget = rt
        .construct("Widget", [Dynamic::String("two".into())])
        .unwrap();

    assert_ne!(first_tag, second_tag);
    assert_eq!(registry.tag::<first::Widget>(), Some(first_tag));
    assert_eq!(registry.tag::<second::Widget>(), Some(second_tag));

    // instances keep dispatching through their own tag
    assert_eq!(
        rt.call_method(&first_widget, "describe", []).unwrap(),
        Dynamic::Int(1)
    );
    assert_eq!(
        rt.call_method(&second_widget, "describe", []).unwrap(),
        Dynamic::String("two".into())
    );
}

// =============================================================================
// Instances
// =============================================================================

fn copy_of<T: Clone + 'static>(rt: &mut Runtime, instance: &Dynamic) -> Dynamic {
    let handle = instance.as_object().unwrap();
    let source = rt.instance::<T>(instance).unwrap().clone();
    let tag = rt.heap().tag(handle).unwrap();

    let heap = rt.heap_mut();
    let copy = heap.allocate_uninit(std::alloc::Layout::new::<T>());
    InstanceFactory::<T>::copy(heap, copy, &source).unwrap();
    heap.set_tag(copy, tag).unwrap();
    Dynamic::Object(copy)
}

#[test]
fn test_copy_is_field_wise_equal() {
    let (mut rt, _, _) = point_runtime();
    let original = rt
        .construct("Point", [Dynamic::Int(8), Dynamic::Int(-2)])
        .unwrap();

    let copy = copy_of::<Point>(&mut rt, &original);

    assert_ne!(copy, original);
    for field in ["x", "y"] {
        assert_eq!(
            rt.call_method(&copy, field, []).unwrap(),
            rt.call_method(&original, field, []).unwrap()
        );
    }
}

#[derive(Clone)]
struct Label {
    text: String,
    size: i64,
}

#[test]
fn test_copy_does_not_alias_owned_fields() {
    let mut rt = Runtime::new();
    let store = CallableStore::new();
    ClassBuilder::<Label>::new("Label", |text: String, size: i64| Label { text, size })
        .field("text", field!(Label, text))
        .field("size", field!(Label, size))
        .method_mut("append", |l: &mut Label, more: String| l.text.push_str(&more))
        .register_in(&mut rt, &store, &mut ClassRegistry::new())
        .unwrap();
    let original = rt
        .construct("Label", [Dynamic::String("hello".into()), Dynamic::Int(12)])
        .unwrap();

    let copy = copy_of::<Label>(&mut rt, &original);
    rt.call_method(&original, "append", [Dynamic::String(" world".into())])
        .unwrap();
    rt.call_method(&original, "set_size", [Dynamic::Int(20)])
        .unwrap();

    assert_eq!(
        rt.call_method(&copy, "text", []).unwrap(),
        Dynamic::String("hello".into())
    );
    assert_eq!(rt.call_method(&copy, "size", []).unwrap(), Dynamic::Int(12));
    assert_eq!(
        rt.call_method(&original, "text", []).unwrap(),
        Dynamic::String("hello world".into())
    );
}

impl ToScript for Point {
    fn to_vm(self, runtime: &mut Runtime) -> Result<Dynamic, ConversionError> {
        InstanceFactory::emplace(runtime, self)
    }
}

#[test]
fn test_returning_registered_class_by_value() {
    let mut rt = Runtime::new();
    let store = CallableStore::new();
    ClassBuilder::<Point>::new("Point", Point::new)
        .field("x", field!(Point, x))
        .member(Member::method("doubled", |p: &Point| {
            Point::new(p.x * 2, p.y * 2)
        }))
        .register_in(&mut rt, &store, &mut ClassRegistry::new())
        .unwrap();

    let p = rt
        .construct("Point", [Dynamic::Int(2), Dynamic::Int(5)])
        .unwrap();
    let doubled = rt.call_method(&p, "doubled", []).unwrap();

    assert_ne!(doubled, p);
    assert_eq!(rt.call_method(&doubled, "x", []).unwrap(), Dynamic::Int(4));
    assert_eq!(rt.instance::<Point>(&doubled), Some(&Point::new(4, 10)));
    assert_eq!(rt.heap().live_count(), 2);
}

struct Tracked(Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_freeing_an_instance_runs_its_destructor() {
    let drops = Arc::new(AtomicUsize::new(0));
    let mut rt = Runtime::new();
    let store = CallableStore::new();
    let counter = drops.clone();
    ClassBuilder::<Tracked>::new("Tracked", move || Tracked(counter.clone()))
        .register_in(&mut rt, &store, &mut ClassRegistry::new())
        .unwrap();

    let a = rt.construct("Tracked", []).unwrap();
    let _b = rt.construct("Tracked", []).unwrap();
    assert!(rt.heap_mut().release(a.as_object().unwrap()));
    assert_eq!(drops.load(Ordering::SeqCst), 1);

    drop(rt);
    assert_eq!(drops.load(Ordering::SeqCst), 2);
}
