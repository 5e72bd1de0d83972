use crate::chain::{FrameRef, ScopeChain};
use crate::document::Document;
use crate::error::{DocumentScopeError, Result};
use joice::{ContextError, Factory, Instance, ObjectId, Scope, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The name a [`DocumentScope`] is registered under in a joice context.
pub const DOCUMENT: &str = "document";

struct State<N> {
  chain: ScopeChain<Value>,
  frames: HashMap<N, FrameRef>,
  active: Option<FrameRef>,
  selected: Option<N>,
  // Whether `active` is the selected node's own frame.
  live: bool,
}

/// A lazily vivified scope matching the lexical areas of a document.
///
/// The document element gets the root frame. Every other node is frame-less
/// until something is stored on its behalf, at which point it and all of its
/// frame-less ancestors get frames of their own, nested like the nodes are.
///
/// The active area is chosen with [`select`](DocumentScope::select); values
/// are then fetched or created relative to it with
/// [`get`](DocumentScope::get). As a [`Scope`], this lets a joice context
/// keep one object per document area.
pub struct DocumentScope<D: Document> {
  document: Rc<D>,
  state: RefCell<State<D::Node>>,
}

impl<D: Document> DocumentScope<D> {
  pub fn new(document: Rc<D>) -> Self {
    let chain = ScopeChain::new();
    let mut frames = HashMap::new();
    frames.insert(document.root(), chain.root());
    Self {
      document,
      state: RefCell::new(State {
        chain,
        frames,
        active: None,
        selected: None,
        live: false,
      }),
    }
  }

  pub fn document(&self) -> &Rc<D> {
    &self.document
  }

  /// Makes the frame of `node`, or of its nearest scoped ancestor, the active
  /// chain.
  ///
  /// Returns `true` if `node` has a frame of its own. A node without any
  /// scoped ancestor is vivified, which fails for nodes detached from the
  /// document.
  pub fn select(&self, node: D::Node) -> Result<bool> {
    self.check(node)?;
    let mut state = self.state.borrow_mut();
    state.selected = Some(node);

    if let Some(frame) = state.frames.get(&node).copied() {
      state.active = Some(frame);
      state.live = true;
      tracing::trace!(?node, "selected scoped node");
      return Ok(true);
    }

    let inherited = self.ancestors(node).find_map(|ancestor| state.frames.get(&ancestor).copied());
    match inherited {
      Some(frame) => {
        state.active = Some(frame);
        state.live = false;
      }
      None => {
        let frame = vivify_in(&mut state, &*self.document, node)?;
        state.active = Some(frame);
        state.live = true;
      }
    }
    tracing::trace!(?node, live = state.live, "selected node");
    Ok(state.live)
  }

  /// Fetches `key` from the active chain, or creates it with `factory` and
  /// stores it.
  ///
  /// A new value is assigned the way [`ScopeChain::set`] does, after the
  /// selected node was vivified. Empty placeholders count as absent.
  pub fn get<E>(&self, key: &str, factory: impl FnOnce() -> Result<Value, E>) -> Result<Value, E>
  where
    E: From<DocumentScopeError>,
  {
    if let Some(value) = self.lookup(key)? {
      return Ok(value);
    }

    let frame = self.ensure_live()?;
    // No borrow is held while the factory runs; it may use this scope.
    let value = factory()?;
    self.state.borrow_mut().chain.set(frame, key, value.clone());
    Ok(value)
  }

  /// Declares `key` in the selected node's own frame, vivifying it first.
  pub fn allocate(&self, key: &str) -> Result<()> {
    let frame = self.ensure_live()?;
    self.state.borrow_mut().chain.allocate(frame, key);
    Ok(())
  }

  /// Attaches frames to `node` and every frame-less node above it, up to the
  /// first node that already has one.
  ///
  /// Returns the frame of `node`. Nodes that already have a frame keep it.
  pub fn vivify(&self, node: D::Node) -> Result<FrameRef> {
    self.check(node)?;
    let mut state = self.state.borrow_mut();
    vivify_in(&mut state, &*self.document, node)
  }

  /// The frame attached to `node` itself. Ancestors are not searched.
  pub fn for_node(&self, node: D::Node) -> Result<Option<FrameRef>> {
    self.check(node)?;
    Ok(self.state.borrow().frames.get(&node).copied())
  }

  /// The value of `key` as seen from `frame`, placeholders included.
  pub fn value_of(&self, frame: FrameRef, key: &str) -> Option<Value> {
    self.state.borrow().chain.value_of(frame, key).cloned()
  }

  /// The owning frame of `key` as seen from `frame`.
  pub fn contains(&self, frame: FrameRef, key: &str) -> Option<FrameRef> {
    self.state.borrow().chain.contains(frame, key)
  }

  pub fn parent_frame(&self, frame: FrameRef) -> Option<FrameRef> {
    self.state.borrow().chain.parent(frame)
  }

  pub fn active(&self) -> Option<FrameRef> {
    self.state.borrow().active
  }

  pub fn frame_count(&self) -> usize {
    self.state.borrow().chain.len()
  }

  fn check(&self, node: D::Node) -> Result<()> {
    if self.document.owns(node) {
      Ok(())
    } else {
      Err(DocumentScopeError::ForeignNode {
        node: format!("{:?}", node),
      })
    }
  }

  fn ancestors(&self, node: D::Node) -> impl Iterator<Item = D::Node> + '_ {
    std::iter::successors(self.document.parent(node), move |current| self.document.parent(*current))
  }

  fn lookup(&self, key: &str) -> Result<Option<Value>> {
    let state = self.state.borrow();
    let active = state.active.ok_or(DocumentScopeError::NothingSelected)?;
    Ok(
      state
        .chain
        .value_of(active, key)
        .filter(|value| !value.is_empty())
        .cloned(),
    )
  }

  /// Makes sure the selected node has a frame of its own and returns it.
  fn ensure_live(&self) -> Result<FrameRef> {
    let mut state = self.state.borrow_mut();
    let selected = state.selected.ok_or(DocumentScopeError::NothingSelected)?;
    if state.live {
      return state.active.ok_or(DocumentScopeError::NothingSelected);
    }

    let frame = vivify_in(&mut state, &*self.document, selected)?;
    state.active = Some(frame);
    state.live = true;
    Ok(frame)
  }

  fn scope_error(error: DocumentScopeError) -> ContextError {
    ContextError::Scope {
      scope: DOCUMENT.to_owned(),
      source: Box::new(error),
    }
  }
}

fn vivify_in<D: Document>(state: &mut State<D::Node>, document: &D, node: D::Node) -> Result<FrameRef> {
  let mut pending = Vec::new();
  let mut cursor = Some(node);
  let mut anchor = None;
  while let Some(current) = cursor {
    if let Some(frame) = state.frames.get(&current) {
      anchor = Some(*frame);
      break;
    }
    pending.push(current);
    cursor = document.parent(current);
  }

  let mut frame = anchor.ok_or_else(|| DocumentScopeError::Detached {
    node: format!("{:?}", node),
  })?;
  if !pending.is_empty() {
    tracing::debug!(?node, frames = pending.len(), "vivifying document scope");
  }
  for current in pending.into_iter().rev() {
    frame = state.chain.child(frame);
    state.frames.insert(current, frame);
  }
  Ok(frame)
}

impl<D: Document> Scope for DocumentScope<D> {
  fn name(&self) -> &str {
    DOCUMENT
  }

  fn get(&self, id: ObjectId, factory: Factory<'_>) -> std::result::Result<Instance, ContextError> {
    let key = id.to_string();
    if let Some(Value::Object(instance)) = self.lookup(&key).map_err(Self::scope_error)? {
      tracing::trace!(%id, "document scope hit");
      return Ok(instance);
    }

    let frame = self.ensure_live().map_err(Self::scope_error)?;
    let instance = factory()?;
    self
      .state
      .borrow_mut()
      .chain
      .set(frame, &key, Value::Object(instance.clone()));
    Ok(instance)
  }

  fn remove(&self, id: ObjectId) -> bool {
    let mut state = self.state.borrow_mut();
    let active = state.active;
    if let Some(active) = active {
      state.chain.remove(active, &id.to_string());
    }
    true
  }
}
