//! Values produced by resolution and the object model constructors plug into.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A constructed object, shared by every holder of the same scope entry.
#[derive(Clone)]
pub struct Instance(Rc<dyn Any>);

impl Instance {
  pub fn new<T: Any>(value: T) -> Self {
    Self(Rc::new(value))
  }

  pub(crate) fn from_component(component: Box<dyn Component>) -> Self {
    Self(component.into_any_rc())
  }

  /// Returns a shared handle to the concrete object, if it is a `T`.
  pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
    self.0.clone().downcast::<T>().ok()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.0.downcast_ref::<T>()
  }

  pub fn is<T: Any>(&self) -> bool {
    self.0.is::<T>()
  }

  /// Identity comparison, as opposed to any notion of value equality.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({:p})", Rc::as_ptr(&self.0))
  }
}

/// A resolved argument, property or scope entry.
#[derive(Debug, Clone, Default)]
pub enum Value {
  /// The placeholder a freshly allocated scope slot holds.
  #[default]
  Empty,
  Literal(serde_json::Value),
  Object(Instance),
}

impl Value {
  pub fn is_empty(&self) -> bool {
    matches!(self, Value::Empty)
  }

  pub fn as_literal(&self) -> Option<&serde_json::Value> {
    match self {
      Value::Literal(literal) => Some(literal),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    self.as_literal().and_then(serde_json::Value::as_str)
  }

  pub fn as_i64(&self) -> Option<i64> {
    self.as_literal().and_then(serde_json::Value::as_i64)
  }

  pub fn as_f64(&self) -> Option<f64> {
    self.as_literal().and_then(serde_json::Value::as_f64)
  }

  pub fn as_bool(&self) -> Option<bool> {
    self.as_literal().and_then(serde_json::Value::as_bool)
  }

  pub fn as_instance(&self) -> Option<&Instance> {
    match self {
      Value::Object(instance) => Some(instance),
      _ => None,
    }
  }

  pub fn into_instance(self) -> Option<Instance> {
    match self {
      Value::Object(instance) => Some(instance),
      _ => None,
    }
  }

  /// Shortcut for `as_instance().and_then(Instance::downcast)`.
  pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
    self.as_instance().and_then(Instance::downcast::<T>)
  }
}

impl From<Instance> for Value {
  fn from(instance: Instance) -> Self {
    Value::Object(instance)
  }
}

impl From<serde_json::Value> for Value {
  fn from(literal: serde_json::Value) -> Self {
    Value::Literal(literal)
  }
}

/// Lets a boxed component hand itself over as a shared `Any`.
pub trait AsAny: Any {
  fn as_any(&self) -> &dyn Any;
  fn into_any_rc(self: Box<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
  fn as_any(&self) -> &dyn Any {
    self
  }

  fn into_any_rc(self: Box<Self>) -> Rc<dyn Any> {
    let boxed: Box<dyn Any> = self;
    Rc::from(boxed)
  }
}

/// An object the container can construct and inject properties into.
///
/// Properties are applied once, after construction and before the object is
/// shared, which is why injection gets `&mut self`.
pub trait Component: AsAny {
  fn set_property(&mut self, name: &str, _value: Value) -> Result<(), String> {
    Err(format!("no property named '{}'", name))
  }
}

/// The object the builtin `Array` constructor produces.
#[derive(Debug, Clone, Default)]
pub struct List(pub Vec<Value>);

impl Component for List {}

/// The object the builtin `Object` constructor produces: a bag that accepts
/// any property.
#[derive(Debug, Clone, Default)]
pub struct Record(pub std::collections::BTreeMap<String, Value>);

impl Record {
  pub fn get(&self, name: &str) -> Option<&Value> {
    self.0.get(name)
  }
}

impl Component for Record {
  fn set_property(&mut self, name: &str, value: Value) -> Result<(), String> {
    self.0.insert(name.to_owned(), value);
    Ok(())
  }
}
