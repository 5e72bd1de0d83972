//! Object lifecycle policies.
//!
//! A scope is a storage point for objects. Every specification registered
//! with a [`Context`](crate::Context) has a unique [`ObjectId`], and whether
//! the scope already holds an object for that id decides if resolving the
//! specification builds a new object or hands out an existing one.
//!
//! Beyond the builtin [`SingletonScope`] and [`PrototypeScope`], scopes are
//! meant to come from the environment, e.g. a scope bound to regions of a
//! document, and are plugged in with [`Context::add_scope`](crate::Context::add_scope).

use crate::core::ObjectId;
use crate::error::ContextError;
use crate::spec::{PROTOTYPE, SINGLETON};
use crate::value::Instance;
use std::cell::RefCell;
use std::collections::HashMap;

/// Builds a new object for a specification.
pub type Factory<'a> = &'a dyn Fn() -> Result<Instance, ContextError>;

pub trait Scope {
  fn name(&self) -> &str;

  /// Fetches the object for `id` from the active storage, or creates it with
  /// `factory` and stores it. Never succeeds without an object.
  fn get(&self, id: ObjectId, factory: Factory<'_>) -> Result<Instance, ContextError>;

  /// Forgets the object stored for `id`, returning whether the scope now
  /// holds nothing for it.
  fn remove(&self, id: ObjectId) -> bool;
}

/// A create-once scope: the object lives as long as the scope.
#[derive(Default)]
pub struct SingletonScope {
  beans: RefCell<HashMap<ObjectId, Instance>>,
}

impl SingletonScope {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, id: ObjectId) -> bool {
    self.beans.borrow().contains_key(&id)
  }

  pub fn len(&self) -> usize {
    self.beans.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.beans.borrow().is_empty()
  }
}

impl Scope for SingletonScope {
  fn name(&self) -> &str {
    SINGLETON
  }

  fn get(&self, id: ObjectId, factory: Factory<'_>) -> Result<Instance, ContextError> {
    if let Some(instance) = self.beans.borrow().get(&id) {
      tracing::trace!(%id, "singleton cache hit");
      return Ok(instance.clone());
    }

    // The borrow is released before building: the factory resolves
    // dependencies, which may live in this very scope.
    let instance = factory()?;
    tracing::trace!(%id, "singleton cached");
    self.beans.borrow_mut().insert(id, instance.clone());
    Ok(instance)
  }

  fn remove(&self, id: ObjectId) -> bool {
    self.beans.borrow_mut().remove(&id);
    true
  }
}

/// A create-always scope that never keeps a reference to what it builds.
#[derive(Debug, Default)]
pub struct PrototypeScope;

impl PrototypeScope {
  pub fn new() -> Self {
    Self
  }
}

impl Scope for PrototypeScope {
  fn name(&self) -> &str {
    PROTOTYPE
  }

  fn get(&self, id: ObjectId, factory: Factory<'_>) -> Result<Instance, ContextError> {
    tracing::trace!(%id, "prototype build");
    factory()
  }

  fn remove(&self, _id: ObjectId) -> bool {
    true
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::cell::Cell;

  #[test]
  fn singleton_builds_once_until_removed() {
    let scope = SingletonScope::new();
    let builds = Cell::new(0);
    let factory = || -> Result<Instance, ContextError> {
      builds.set(builds.get() + 1);
      Ok(Instance::new(builds.get()))
    };

    let first = scope.get(ObjectId(1), &factory).unwrap();
    let second = scope.get(ObjectId(1), &factory).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(builds.get(), 1);
    assert!(scope.contains(ObjectId(1)));

    assert!(scope.remove(ObjectId(1)));
    assert!(!scope.contains(ObjectId(1)));

    let third = scope.get(ObjectId(1), &factory).unwrap();
    assert!(!third.ptr_eq(&first));
    assert_eq!(builds.get(), 2);
  }

  #[test]
  fn singleton_leaves_cache_unset_on_failure() {
    let scope = SingletonScope::new();
    let failing = || -> Result<Instance, ContextError> {
      Err(ContextError::Construction {
        constructor: "Broken".into(),
        message: "boom".into(),
      })
    };

    assert!(scope.get(ObjectId(3), &failing).is_err());
    assert!(scope.is_empty());
  }

  #[test]
  fn prototype_always_builds() {
    let scope = PrototypeScope::new();
    let factory = || -> Result<Instance, ContextError> { Ok(Instance::new(String::from("fresh"))) };

    let a = scope.get(ObjectId(0), &factory).unwrap();
    let b = scope.get(ObjectId(0), &factory).unwrap();
    assert!(!a.ptr_eq(&b));
    assert!(scope.remove(ObjectId(0)));
  }
}
