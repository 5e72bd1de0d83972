//! Core, mostly non-public data structures for the container.

use crate::error::ContextError;
use std::cell::{Cell, RefCell};
use std::fmt;

/// The unique identifier of a specification within one [`Context`](crate::Context).
///
/// Scopes key their storage off this identifier, never off the label, so an
/// object can be stored in a scope without ever having been named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
  pub fn as_u64(self) -> u64 {
    self.0
  }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "object#{}", self.0)
  }
}

/// A monotonic id source owned by a single context.
#[derive(Debug, Default)]
pub(crate) struct Sequence {
  next: Cell<u64>,
}

impl Sequence {
  pub(crate) fn next_value(&self) -> ObjectId {
    let id = self.next.get();
    self.next.set(id + 1);
    ObjectId(id)
  }

  pub(crate) fn current(&self) -> u64 {
    self.next.get()
  }
}

/// The set of specifications currently being assembled by one context.
#[derive(Debug, Default)]
pub(crate) struct ResolvingStack {
  stack: RefCell<Vec<ObjectId>>,
}

/// An RAII guard to detect and prevent circular dependencies.
///
/// When created, it pushes an id onto the owning context's resolution stack.
/// If the id is already present, the object graph is cyclic and creation
/// fails. When the guard is dropped, the id is popped again.
pub(crate) struct ResolutionGuard<'a> {
  resolving: &'a ResolvingStack,
}

impl<'a> ResolutionGuard<'a> {
  pub(crate) fn new(resolving: &'a ResolvingStack, id: ObjectId) -> Result<Self, ContextError> {
    let mut stack = resolving.stack.borrow_mut();
    if let Some(start) = stack.iter().position(|entry| *entry == id) {
      let mut path = stack[start..].to_vec();
      path.push(id);
      return Err(ContextError::CircularDependency(path));
    }
    stack.push(id);
    Ok(Self { resolving })
  }
}

impl Drop for ResolutionGuard<'_> {
  fn drop(&mut self) {
    self.resolving.stack.borrow_mut().pop();
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn sequence_is_monotonic() {
    let sequence = Sequence::default();
    assert_eq!(sequence.next_value(), ObjectId(0));
    assert_eq!(sequence.next_value(), ObjectId(1));
    assert_eq!(sequence.current(), 2);
  }

  #[test]
  fn guard_reports_the_cycle_path() {
    let resolving = ResolvingStack::default();
    let _a = ResolutionGuard::new(&resolving, ObjectId(0)).unwrap();
    let _b = ResolutionGuard::new(&resolving, ObjectId(1)).unwrap();

    match ResolutionGuard::new(&resolving, ObjectId(0)) {
      Err(ContextError::CircularDependency(path)) => {
        assert_eq!(path, vec![ObjectId(0), ObjectId(1), ObjectId(0)]);
      }
      other => panic!("expected a cycle, got {:?}", other.map(|_| ())),
    };
  }

  #[test]
  fn guard_pops_on_drop() {
    let resolving = ResolvingStack::default();
    {
      let _guard = ResolutionGuard::new(&resolving, ObjectId(7)).unwrap();
    }
    assert!(ResolutionGuard::new(&resolving, ObjectId(7)).is_ok());
  }
}
