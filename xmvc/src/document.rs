//! The view of a document a [`DocumentScope`](crate::DocumentScope) needs.

use generational_arena::{Arena, Index};
use std::cell::RefCell;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// A tree of nodes, as far as scoping is concerned.
pub trait Document {
  type Node: Copy + Eq + Hash + Debug;

  /// The document element.
  fn root(&self) -> Self::Node;

  /// The parent of `node`, `None` for the root and for detached nodes.
  fn parent(&self, node: Self::Node) -> Option<Self::Node>;

  /// Whether `node` was created by this document.
  fn owns(&self, node: Self::Node) -> bool;
}

static NEXT_TREE: AtomicU64 = AtomicU64::new(0);

/// A node of a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
  tree: u64,
  index: Index,
}

#[derive(Debug)]
struct TreeNode {
  name: String,
  parent: Option<NodeId>,
}

/// A minimal element tree.
///
/// Nodes are never destroyed; detaching one cuts it (and its subtree) off
/// from the document element while keeping its identity.
#[derive(Debug)]
pub struct Tree {
  id: u64,
  root: NodeId,
  nodes: RefCell<Arena<TreeNode>>,
}

impl Tree {
  pub fn new(root_name: impl Into<String>) -> Self {
    let id = NEXT_TREE.fetch_add(1, Ordering::Relaxed);
    let mut nodes = Arena::new();
    let index = nodes.insert(TreeNode {
      name: root_name.into(),
      parent: None,
    });
    Self {
      id,
      root: NodeId { tree: id, index },
      nodes: RefCell::new(nodes),
    }
  }

  /// Appends a new element below `parent`.
  ///
  /// # Panics
  ///
  /// If `parent` belongs to another tree.
  pub fn append(&self, parent: NodeId, name: impl Into<String>) -> NodeId {
    assert!(self.owns(parent), "{:?} does not belong to this tree", parent);
    self.insert(name.into(), Some(parent))
  }

  /// Creates an element that belongs to this tree but is not attached to it.
  pub fn create_detached(&self, name: impl Into<String>) -> NodeId {
    self.insert(name.into(), None)
  }

  /// Cuts `node` off from its parent. Detaching the document element does
  /// nothing.
  pub fn detach(&self, node: NodeId) {
    if node == self.root || !self.owns(node) {
      return;
    }
    if let Some(entry) = self.nodes.borrow_mut().get_mut(node.index) {
      entry.parent = None;
    }
  }

  pub fn name(&self, node: NodeId) -> Option<String> {
    if !self.owns(node) {
      return None;
    }
    self.nodes.borrow().get(node.index).map(|entry| entry.name.clone())
  }

  fn insert(&self, name: String, parent: Option<NodeId>) -> NodeId {
    let index = self.nodes.borrow_mut().insert(TreeNode { name, parent });
    NodeId { tree: self.id, index }
  }
}

impl Document for Tree {
  type Node = NodeId;

  fn root(&self) -> NodeId {
    self.root
  }

  fn parent(&self, node: NodeId) -> Option<NodeId> {
    if !self.owns(node) {
      return None;
    }
    self.nodes.borrow().get(node.index).and_then(|entry| entry.parent)
  }

  fn owns(&self, node: NodeId) -> bool {
    node.tree == self.id
  }
}
