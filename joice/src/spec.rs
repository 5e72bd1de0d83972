//! Declarative descriptions of how to build objects.

use crate::core::ObjectId;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub const SINGLETON: &str = "singleton";
pub const PROTOTYPE: &str = "prototype";

/// Whether an object is built when the context initializes or on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitPolicy {
  #[default]
  Lazy,
  Eager,
}

/// The specification of a constructor argument or a property.
#[derive(Debug, Clone)]
pub enum PropertySpec {
  /// A literal, handed over as is.
  Value(serde_json::Value),
  /// Another specification, resolved through the context.
  Object(SpecRef),
}

impl PropertySpec {
  pub fn value(literal: impl Into<serde_json::Value>) -> Self {
    PropertySpec::Value(literal.into())
  }

  pub fn object(target: &SpecRef) -> Self {
    PropertySpec::Object(target.clone())
  }
}

/// Describes how to build one object.
#[derive(Debug, Default)]
pub struct ObjectSpecification {
  pub(crate) id: Option<ObjectId>,
  pub name: Option<String>,
  pub constructor: Option<String>,
  pub arguments: Vec<PropertySpec>,
  pub properties: BTreeMap<String, PropertySpec>,
  pub scope: String,
  pub init: InitPolicy,
}

impl ObjectSpecification {
  pub fn new(constructor: impl Into<String>) -> Self {
    Self {
      constructor: Some(constructor.into()),
      scope: SINGLETON.to_owned(),
      ..Self::default()
    }
  }

  /// The id the owning context assigned, `None` until registered.
  pub fn id(&self) -> Option<ObjectId> {
    self.id
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn scoped(mut self, scope: impl Into<String>) -> Self {
    self.scope = scope.into();
    self
  }

  pub fn eager(mut self) -> Self {
    self.init = InitPolicy::Eager;
    self
  }

  pub fn with_argument(mut self, argument: PropertySpec) -> Self {
    self.arguments.push(argument);
    self
  }

  pub fn with_property(mut self, name: impl Into<String>, property: PropertySpec) -> Self {
    self.properties.insert(name.into(), property);
    self
  }

  pub fn into_ref(self) -> SpecRef {
    SpecRef(Rc::new(RefCell::new(self)))
  }
}

/// A shared handle to a specification.
///
/// The same specification may be reachable by label and through the
/// arguments of several other specifications; every path shares this handle,
/// which is what makes registration idempotent.
#[derive(Clone)]
pub struct SpecRef(Rc<RefCell<ObjectSpecification>>);

impl SpecRef {
  /// An empty placeholder, filled in once its definition is parsed.
  pub fn placeholder() -> Self {
    ObjectSpecification {
      scope: SINGLETON.to_owned(),
      ..ObjectSpecification::default()
    }
    .into_ref()
  }

  pub fn borrow(&self) -> Ref<'_, ObjectSpecification> {
    self.0.borrow()
  }

  pub fn borrow_mut(&self) -> RefMut<'_, ObjectSpecification> {
    self.0.borrow_mut()
  }

  pub fn id(&self) -> Option<ObjectId> {
    self.0.borrow().id
  }

  pub fn name(&self) -> Option<String> {
    self.0.borrow().name.clone()
  }

  pub fn init(&self) -> InitPolicy {
    self.0.borrow().init
  }

  pub fn ptr_eq(&self, other: &SpecRef) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  pub(crate) fn assign_id(&self, id: ObjectId) {
    self.0.borrow_mut().id = Some(id);
  }

  /// Every specification this one refers to, arguments first.
  pub(crate) fn dependencies(&self) -> Vec<SpecRef> {
    let spec = self.0.borrow();
    spec
      .arguments
      .iter()
      .chain(spec.properties.values())
      .filter_map(|property| match property {
        PropertySpec::Object(target) => Some(target.clone()),
        PropertySpec::Value(_) => None,
      })
      .collect()
  }
}

impl From<ObjectSpecification> for SpecRef {
  fn from(spec: ObjectSpecification) -> Self {
    spec.into_ref()
  }
}

impl fmt::Debug for SpecRef {
  // Specifications may refer to each other cyclically, so only the
  // identifying fields are printed.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.0.try_borrow() {
      Ok(spec) => f
        .debug_struct("SpecRef")
        .field("id", &spec.id)
        .field("name", &spec.name)
        .field("constructor", &spec.constructor)
        .finish(),
      Err(_) => f.write_str("SpecRef(<borrowed>)"),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn builder_defaults_to_lazy_singleton() {
    let spec = ObjectSpecification::new("Greeter").named("greeter");
    assert_eq!(spec.scope, SINGLETON);
    assert_eq!(spec.init, InitPolicy::Lazy);
    assert_eq!(spec.name.as_deref(), Some("greeter"));
    assert!(spec.id().is_none());
  }

  #[test]
  fn dependencies_list_arguments_then_properties() {
    let a = ObjectSpecification::new("A").named("a").into_ref();
    let b = ObjectSpecification::new("B").named("b").into_ref();
    let c = ObjectSpecification::new("C")
      .with_property("b", PropertySpec::object(&b))
      .with_argument(PropertySpec::value("literal"))
      .with_argument(PropertySpec::object(&a))
      .into_ref();

    let deps = c.dependencies();
    assert_eq!(deps.len(), 2);
    assert!(deps[0].ptr_eq(&a));
    assert!(deps[1].ptr_eq(&b));
  }
}
