//! Named constructors, the container's stand-in for reflective construction.

use crate::value::{Component, List, Record, Value};
use std::collections::HashMap;
use std::rc::Rc;

pub const ARRAY: &str = "Array";
pub const OBJECT: &str = "Object";

/// Builds a new object from positional arguments.
pub type Constructor = Rc<dyn Fn(Vec<Value>) -> Result<Box<dyn Component>, String>>;

/// The table of constructors a context can invoke by label.
pub struct ConstructorRegistry {
  constructors: HashMap<String, Constructor>,
}

impl Default for ConstructorRegistry {
  fn default() -> Self {
    let mut registry = Self {
      constructors: HashMap::new(),
    };
    registry.register(ARRAY, |arguments| Ok(List(arguments)));
    registry.register(OBJECT, |_| Ok(Record::default()));
    registry
  }
}

impl ConstructorRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a constructor, replacing any previous one with the same name.
  pub fn register<T: Component>(
    &mut self,
    name: &str,
    constructor: impl Fn(Vec<Value>) -> Result<T, String> + 'static,
  ) {
    let constructor: Constructor = Rc::new(move |arguments| {
      constructor(arguments).map(|component| Box::new(component) as Box<dyn Component>)
    });
    self.constructors.insert(name.to_owned(), constructor);
  }

  pub fn get(&self, name: &str) -> Option<Constructor> {
    self.constructors.get(name).cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.constructors.contains_key(name)
  }
}
