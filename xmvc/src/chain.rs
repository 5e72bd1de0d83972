//! Lexically scoped key/value frames.
//!
//! A [`ScopeChain`] owns a tree of frames. Each frame has a table of its own
//! and at most one parent, fixed when the frame is created. Looking a key up
//! from a frame searches the frame itself, then its ancestors. Writing a key
//! distinguishes declaration from assignment: the first write of a key
//! declares it in the frame it was written from, later writes from any
//! descendant update the declaring frame rather than shadowing it.

use generational_arena::{Arena, Index};
use std::collections::HashMap;

/// A handle to one frame of a [`ScopeChain`].
///
/// Handles are only meaningful for the chain that created them; passing one
/// to another chain panics or addresses an unrelated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRef(Index);

#[derive(Debug)]
struct Frame<V> {
  table: HashMap<String, V>,
  parent: Option<FrameRef>,
}

impl<V> Frame<V> {
  fn new(parent: Option<FrameRef>) -> Self {
    Self {
      table: HashMap::new(),
      parent,
    }
  }
}

#[derive(Debug)]
pub struct ScopeChain<V> {
  frames: Arena<Frame<V>>,
  root: FrameRef,
}

impl<V> Default for ScopeChain<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> ScopeChain<V> {
  /// Creates a chain holding a single, empty root frame.
  pub fn new() -> Self {
    let mut frames = Arena::new();
    let root = FrameRef(frames.insert(Frame::new(None)));
    Self { frames, root }
  }

  pub fn root(&self) -> FrameRef {
    self.root
  }

  /// Creates an empty frame below `parent`.
  pub fn child(&mut self, parent: FrameRef) -> FrameRef {
    assert!(self.frames.contains(parent.0), "no frame {:?} in this chain", parent);
    FrameRef(self.frames.insert(Frame::new(Some(parent))))
  }

  /// The number of frames in the chain, root included.
  pub fn len(&self) -> usize {
    self.frames.len()
  }

  pub fn is_empty(&self) -> bool {
    self.frames.is_empty()
  }

  pub fn parent(&self, frame: FrameRef) -> Option<FrameRef> {
    self.frames[frame.0].parent
  }

  /// Whether `frame` is the top of its chain.
  pub fn top(&self, frame: FrameRef) -> bool {
    self.parent(frame).is_none()
  }

  /// Finds the nearest frame, starting at `frame`, whose own table holds `key`.
  pub fn contains(&self, frame: FrameRef, key: &str) -> Option<FrameRef> {
    let mut cursor = Some(frame);
    while let Some(current) = cursor {
      let entry = &self.frames[current.0];
      if entry.table.contains_key(key) {
        return Some(current);
      }
      cursor = entry.parent;
    }
    None
  }

  /// The value held for `key` by the nearest owning frame.
  pub fn value_of(&self, frame: FrameRef, key: &str) -> Option<&V> {
    let owner = self.contains(frame, key)?;
    self.frames[owner.0].table.get(key)
  }

  /// Assigns `value` to `key`.
  ///
  /// Overwrites the entry if `frame` owns `key` and returns `true`. Otherwise
  /// the write goes to the nearest ancestor that owns `key`, returning what
  /// that frame returns. When no frame in the chain owns `key` it is declared
  /// in `frame` and `false` is returned.
  pub fn set(&mut self, frame: FrameRef, key: &str, value: V) -> bool {
    let entry = &mut self.frames[frame.0];
    if let Some(slot) = entry.table.get_mut(key) {
      *slot = value;
      return true;
    }

    if let Some(owner) = entry.parent.and_then(|parent| self.contains(parent, key)) {
      return self.set(owner, key, value);
    }

    self.frames[frame.0].table.insert(key.to_owned(), value);
    false
  }

  /// Removes `key` from the frame that owns it, as seen from `frame`.
  pub fn remove(&mut self, frame: FrameRef, key: &str) -> Option<V> {
    let owner = self.contains(frame, key)?;
    self.frames[owner.0].table.remove(key)
  }
}

impl<V: Default> ScopeChain<V> {
  /// Declares `key` in `frame` with an empty value, whether or not an
  /// ancestor already owns it.
  pub fn allocate(&mut self, frame: FrameRef, key: &str) {
    self.frames[frame.0].table.insert(key.to_owned(), V::default());
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use pretty_assertions::assert_eq;

  /// Builds a root and nine nested descendants, deepest last.
  fn ten_frames() -> (ScopeChain<String>, Vec<FrameRef>) {
    let mut chain = ScopeChain::new();
    let mut frames = vec![chain.root()];
    for _ in 1..10 {
      let parent = *frames.last().unwrap();
      frames.push(chain.child(parent));
    }
    (chain, frames)
  }

  #[test]
  fn lookup_searches_every_ancestor() {
    let (mut chain, frames) = ten_frames();
    for (depth, frame) in frames.iter().enumerate() {
      chain.set(*frame, &format!("key{}", depth), format!("value{}", depth));
    }

    let deepest = frames[9];
    for depth in 0..10 {
      let key = format!("key{}", depth);
      assert_eq!(chain.value_of(deepest, &key), Some(&format!("value{}", depth)));
      assert_eq!(chain.contains(deepest, &key), Some(frames[depth]));
    }

    // Lookups never search downward.
    assert_eq!(chain.value_of(frames[0], "key9"), None);
    assert_eq!(chain.contains(frames[4], "key5"), None);
    assert_eq!(chain.value_of(deepest, "absent"), None);
  }

  #[test]
  fn set_updates_the_declaring_frame() {
    let (mut chain, frames) = ten_frames();
    assert!(!chain.set(frames[2], "shared", "declared".to_string()));

    assert!(chain.set(frames[9], "shared", "updated".to_string()));

    assert_eq!(chain.contains(frames[9], "shared"), Some(frames[2]));
    assert_eq!(chain.value_of(frames[2], "shared"), Some(&"updated".to_string()));
    assert_eq!(chain.value_of(frames[0], "shared"), None);
  }

  #[test]
  fn new_keys_are_declared_locally() {
    let (mut chain, frames) = ten_frames();

    assert!(!chain.set(frames[5], "local", "here".to_string()));

    assert_eq!(chain.contains(frames[9], "local"), Some(frames[5]));
    assert_eq!(chain.value_of(frames[4], "local"), None);
    assert_eq!(chain.value_of(frames[6], "local"), Some(&"here".to_string()));
  }

  #[test]
  fn allocate_shadows_ancestor_declarations() {
    let (mut chain, frames) = ten_frames();
    chain.set(frames[0], "handler", "outer".to_string());

    chain.allocate(frames[3], "handler");
    assert_eq!(chain.value_of(frames[3], "handler"), Some(&String::new()));

    assert!(chain.set(frames[7], "handler", "inner".to_string()));
    assert_eq!(chain.value_of(frames[7], "handler"), Some(&"inner".to_string()));
    assert_eq!(chain.value_of(frames[0], "handler"), Some(&"outer".to_string()));
  }

  #[test]
  fn parent_and_top_follow_creation() {
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let root = chain.root();
    let child = chain.child(root);
    let sibling = chain.child(root);

    assert!(chain.top(root));
    assert!(!chain.top(child));
    assert_eq!(chain.parent(child), Some(root));
    assert_eq!(chain.parent(sibling), Some(root));
    assert_eq!(chain.parent(root), None);
    assert_eq!(chain.len(), 3);
  }

  #[test]
  fn remove_takes_the_owned_entry() {
    let mut chain = ScopeChain::new();
    let root = chain.root();
    let child = chain.child(root);
    chain.set(root, "count", 1);

    assert_eq!(chain.remove(child, "count"), Some(1));
    assert_eq!(chain.contains(child, "count"), None);
    assert_eq!(chain.remove(child, "count"), None);
  }
}
