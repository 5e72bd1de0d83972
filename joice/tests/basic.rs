use joice::{Component, Context, ObjectSpecification, PropertySpec, ResolverError, Value, PROTOTYPE};
use std::cell::Cell;
use std::rc::Rc;

// --- Test Fixtures ---

#[derive(Debug)]
struct SimpleService {
  id: i64,
}

impl Component for SimpleService {}

fn context_with_simple_service() -> Context {
  let context = Context::new();
  context.register_constructor("SimpleService", |arguments| {
    let id = arguments.first().and_then(Value::as_i64).unwrap_or(0);
    Ok(SimpleService { id })
  });
  context
}

// --- Basic Tests ---

#[test]
fn test_singleton_resolves_identical_instance() {
  // Arrange
  let context = context_with_simple_service();
  let spec = ObjectSpecification::new("SimpleService")
    .named("simple")
    .with_argument(PropertySpec::value(101))
    .into_ref();
  context.add_specification(&spec).unwrap();
  let id = spec.id().unwrap();

  // Act
  let r1 = context.get_object(id).unwrap().unwrap();
  let r2 = context.get_object(id).unwrap().unwrap();

  // Assert
  assert_eq!(r1.downcast::<SimpleService>().unwrap().id, 101);
  // Ensure it's a singleton by checking pointer equality.
  assert!(r1.ptr_eq(&r2));
}

#[test]
fn test_prototype_resolves_distinct_instances() {
  // Arrange
  let context = context_with_simple_service();
  let spec = ObjectSpecification::new("SimpleService")
    .named("fresh")
    .scoped(PROTOTYPE)
    .with_argument(PropertySpec::value(303))
    .into_ref();
  context.add_specification(&spec).unwrap();

  // Act
  let r1 = context.load("fresh").unwrap().unwrap();
  let r2 = context.load("fresh").unwrap().unwrap();

  // Assert
  assert_eq!(r1.downcast::<SimpleService>().unwrap().id, 303);
  assert_eq!(r2.downcast::<SimpleService>().unwrap().id, 303);
  assert!(!r1.ptr_eq(&r2));
}

#[test]
fn test_registering_twice_is_idempotent() {
  // Arrange
  let context = context_with_simple_service();
  let spec = ObjectSpecification::new("SimpleService").named("once").into_ref();

  // Act
  context.add_specification(&spec).unwrap();
  let id = spec.id();
  context.add_specification(&spec).unwrap();

  // Assert
  assert_eq!(context.sequence_value(), 1);
  assert_eq!(context.len(), 1);
  assert_eq!(spec.id(), id);
  assert!(context.get_specification(id.unwrap()).unwrap().ptr_eq(&spec));
}

#[test]
fn test_unknown_label_loads_nothing() {
  let context = Context::new();

  assert!(context.load("nonexistent").unwrap().is_none());
  assert!(context.get_id_for_label("nonexistent").is_none());
}

#[test]
fn test_require_fails_on_unknown_label() {
  let context = Context::new();

  match context.require("nonexistent") {
    Err(ResolverError::UnknownLabel(label)) => assert_eq!(label, "nonexistent"),
    other => panic!("expected an unknown label, got {:?}", other),
  }
}

#[test]
fn test_labels_map_to_ids() {
  // Arrange
  let context = context_with_simple_service();
  let named = ObjectSpecification::new("SimpleService").named("named").into_ref();
  let anonymous = ObjectSpecification::new("SimpleService").into_ref();

  // Act
  context.add_specification(&anonymous).unwrap();
  context.add_specification(&named).unwrap();

  // Assert
  assert_eq!(context.get_id_for_label("named"), named.id());
  assert_ne!(anonymous.id(), named.id());
  assert!(context.get_object(anonymous.id().unwrap()).unwrap().is_some());
}

#[test]
fn test_properties_are_injected_after_construction() {
  // Arrange
  struct Counter {
    start: Cell<i64>,
    step: i64,
  }
  impl Component for Counter {
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), String> {
      match name {
        "start" => self.start.set(value.as_i64().ok_or("start must be an integer")?),
        "step" => self.step = value.as_i64().ok_or("step must be an integer")?,
        other => return Err(format!("no property named '{}'", other)),
      }
      Ok(())
    }
  }

  let context = Context::new();
  context.register_constructor("Counter", |_| {
    Ok(Counter {
      start: Cell::new(0),
      step: 1,
    })
  });
  let spec = ObjectSpecification::new("Counter")
    .named("counter")
    .with_property("start", PropertySpec::value(10))
    .with_property("step", PropertySpec::value(5))
    .into_ref();
  context.add_specification(&spec).unwrap();

  // Act
  let counter: Rc<Counter> = context.load("counter").unwrap().unwrap().downcast().unwrap();

  // Assert
  assert_eq!(counter.start.get(), 10);
  assert_eq!(counter.step, 5);
}
