//! The `Context` struct, the root of the container.

use crate::core::{ObjectId, ResolutionGuard, ResolvingStack, Sequence};
use crate::error::{ContextError, ResolverError, Result};
use crate::factory::ObjectFactory;
use crate::registry::{Constructor, ConstructorRegistry};
use crate::scope::{PrototypeScope, Scope, SingletonScope};
use crate::spec::{InitPolicy, SpecRef, PROTOTYPE, SINGLETON};
use crate::value::{Component, Instance, Value};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// The dependency injection context.
///
/// A context resolves labels to specifications and assembles objects
/// accordingly. Specifications can be added at any point, before or after
/// [`initialize`](Context::initialize); configuration is expected to arrive
/// in several fragments. Contexts share no state with each other.
///
/// # Note on API
///
/// All methods take `&self`: building an object re-enters the context to
/// resolve its dependencies, so the tables use interior mutability and no
/// borrow is held across a construction.
pub struct Context {
  initialized: Cell<bool>,
  sequence: Sequence,
  specifications: RefCell<BTreeMap<ObjectId, SpecRef>>,
  factories: RefCell<HashMap<ObjectId, Rc<ObjectFactory>>>,
  labels: RefCell<HashMap<String, ObjectId>>,
  scopes: RefCell<HashMap<String, Rc<dyn Scope>>>,
  singletons: Rc<SingletonScope>,
  constructors: RefCell<ConstructorRegistry>,
  resolving: ResolvingStack,
}

impl Default for Context {
  fn default() -> Self {
    let singletons = Rc::new(SingletonScope::new());
    let mut scopes: HashMap<String, Rc<dyn Scope>> = HashMap::new();
    scopes.insert(SINGLETON.to_owned(), singletons.clone());
    scopes.insert(PROTOTYPE.to_owned(), Rc::new(PrototypeScope::new()));

    Self {
      initialized: Cell::new(false),
      sequence: Sequence::default(),
      specifications: RefCell::new(BTreeMap::new()),
      factories: RefCell::new(HashMap::new()),
      labels: RefCell::new(HashMap::new()),
      scopes: RefCell::new(scopes),
      singletons,
      constructors: RefCell::new(ConstructorRegistry::new()),
      resolving: ResolvingStack::default(),
    }
  }
}

impl Context {
  /// Creates a new, empty `Context` with the `singleton` and `prototype`
  /// scopes and the builtin constructors.
  pub fn new() -> Self {
    Self::default()
  }

  // --- Constructors ---

  pub fn register_constructor<T: Component>(
    &self,
    name: &str,
    constructor: impl Fn(Vec<Value>) -> std::result::Result<T, String> + 'static,
  ) {
    self.constructors.borrow_mut().register(name, constructor);
  }

  pub fn has_constructor(&self, name: &str) -> bool {
    self.constructors.borrow().contains(name)
  }

  pub(crate) fn constructor(&self, name: &str) -> Option<Constructor> {
    self.constructors.borrow().get(name)
  }

  // --- Registration ---

  /// Registers a specification and, depth first, every specification its
  /// arguments and properties refer to.
  ///
  /// Specifications that already carry an id are skipped, so one reachable
  /// through several paths is registered once. After
  /// [`initialize`](Context::initialize), an eager specification is resolved
  /// right away.
  pub fn add_specification(&self, spec: &SpecRef) -> Result<()> {
    let mut added = Vec::new();
    self.register(spec, &mut added);

    // Everything is stored before anything is built, so a failing eager
    // object leaves the graph registered and resolvable later.
    if self.initialized.get() {
      for id in added {
        if self.get_specification(id).is_some_and(|spec| spec.init() == InitPolicy::Eager) {
          self.get_object(id)?;
        }
      }
    }
    Ok(())
  }

  fn register(&self, spec: &SpecRef, added: &mut Vec<ObjectId>) {
    if spec.id().is_some() {
      return;
    }

    // The id goes onto the specification before descending, so cyclic
    // specification graphs terminate here.
    let id = self.sequence.next_value();
    spec.assign_id(id);

    for dependency in spec.dependencies() {
      self.register(&dependency, added);
    }

    self.specifications.borrow_mut().insert(id, spec.clone());
    self
      .factories
      .borrow_mut()
      .insert(id, Rc::new(ObjectFactory::new(id, spec.clone())));

    let name = spec.name();
    if let Some(label) = &name {
      self.labels.borrow_mut().insert(label.clone(), id);
    }
    tracing::debug!(%id, label = ?name, "specification registered");
    added.push(id);
  }

  pub fn get_specification(&self, id: ObjectId) -> Option<SpecRef> {
    self.specifications.borrow().get(&id).cloned()
  }

  pub fn get_id_for_label(&self, label: &str) -> Option<ObjectId> {
    self.labels.borrow().get(label).copied()
  }

  /// The number of registered specifications.
  pub fn len(&self) -> usize {
    self.specifications.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.specifications.borrow().is_empty()
  }

  /// The next id the sequence will hand out.
  pub fn sequence_value(&self) -> u64 {
    self.sequence.current()
  }

  // --- Scopes ---

  /// Adds a scope under `name`. Scope names are fixed once taken, including
  /// the builtin `singleton` and `prototype`.
  pub fn add_scope(&self, name: &str, scope: Rc<dyn Scope>) -> Result<()> {
    let mut scopes = self.scopes.borrow_mut();
    if scopes.contains_key(name) {
      return Err(ContextError::DuplicateScope(name.to_owned()));
    }
    tracing::debug!(scope = name, "scope added");
    scopes.insert(name.to_owned(), scope);
    Ok(())
  }

  pub fn scope(&self, name: &str) -> Option<Rc<dyn Scope>> {
    self.scopes.borrow().get(name).cloned()
  }

  /// The builtin singleton scope, mostly useful to inspect what was built.
  pub fn singletons(&self) -> &SingletonScope {
    &self.singletons
  }

  // --- Resolution ---

  /// Resolves the object for `id` through its specification's scope.
  ///
  /// Unknown ids are not an error: configuration may still be arriving, so
  /// `Ok(None)` means there is nothing to resolve yet.
  pub fn get_object(&self, id: ObjectId) -> Result<Option<Instance>> {
    let spec = match self.get_specification(id) {
      Some(spec) => spec,
      None => return Ok(None),
    };

    let scope_name = spec.borrow().scope.clone();
    let scope = self
      .scope(&scope_name)
      .ok_or_else(|| ContextError::UnknownScope {
        id,
        scope: scope_name.clone(),
      })?;
    let factory = match self.factories.borrow().get(&id) {
      Some(factory) => factory.clone(),
      None => return Ok(None),
    };

    let _guard = ResolutionGuard::new(&self.resolving, id)?;
    let build = || factory.create_object(self);
    scope.get(id, &build).map(Some)
  }

  /// Resolves the object registered under `label`, `Ok(None)` if the label
  /// is unknown.
  pub fn load(&self, label: &str) -> Result<Option<Instance>> {
    match self.get_id_for_label(label) {
      Some(id) => self.get_object(id),
      None => Ok(None),
    }
  }

  /// Like [`load`](Context::load), for labels that must exist.
  pub fn require(&self, label: &str) -> Result<Instance, ResolverError> {
    self
      .load(label)?
      .ok_or_else(|| ResolverError::UnknownLabel(label.to_owned()))
  }

  /// Evicts the object for `id` from its scope, so the next resolution
  /// builds it again.
  pub fn release(&self, id: ObjectId) -> bool {
    let scope_name = match self.get_specification(id) {
      Some(spec) => spec.borrow().scope.clone(),
      None => return false,
    };
    match self.scope(&scope_name) {
      Some(scope) => scope.remove(id),
      None => false,
    }
  }

  // --- Lifecycle ---

  /// Initializes the context by building every eager specification.
  ///
  /// Called once all known configuration is loaded. Returns `true` if this
  /// call performed the initialization, `false` if it already happened.
  pub fn initialize(&self) -> Result<bool> {
    if self.initialized.get() {
      return Ok(false);
    }

    let eager: Vec<ObjectId> = self
      .specifications
      .borrow()
      .iter()
      .filter(|(_, spec)| spec.init() == InitPolicy::Eager)
      .map(|(id, _)| *id)
      .collect();

    tracing::debug!(eager = eager.len(), "initializing context");
    // An eager prototype is built and dropped unless its constructor
    // attaches it somewhere.
    for id in eager {
      self.get_object(id)?;
    }

    self.initialized.set(true);
    Ok(true)
  }

  pub fn is_initialized(&self) -> bool {
    self.initialized.get()
  }
}
