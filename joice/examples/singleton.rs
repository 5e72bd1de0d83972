use joice::{Component, Context, ObjectSpecification, PROTOTYPE};
use std::cell::Cell;
use std::rc::Rc;

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

impl Component for RequestTracker {}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  // A counter shared by every RequestTracker construction.
  let counter = Rc::new(Cell::new(0));
  let context = Context::new();
  context.register_constructor("RequestTracker", move |_| {
    let id = counter.get();
    counter.set(id + 1);
    println!("Creating RequestTracker {}...", id);
    Ok(RequestTracker { id })
  });

  // --- Singleton Registration ---
  // This object is only built ONCE.
  let singleton = ObjectSpecification::new("RequestTracker")
    .named("singleton_tracker")
    .into_ref();
  // --- Prototype Registration ---
  // This object is built EVERY time it is resolved.
  let prototype = ObjectSpecification::new("RequestTracker")
    .named("prototype_tracker")
    .scoped(PROTOTYPE)
    .into_ref();
  context.add_specification(&singleton).unwrap();
  context.add_specification(&prototype).unwrap();

  println!("--- Resolving Singletons ---");
  let s1 = context.require("singleton_tracker").unwrap();
  let s2 = context.require("singleton_tracker").unwrap();
  let (s1, s2) = (
    s1.downcast::<RequestTracker>().unwrap(),
    s2.downcast::<RequestTracker>().unwrap(),
  );
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert!(Rc::ptr_eq(&s1, &s2), "Singleton instances should be identical");
  println!("Singleton instances are the same pointer, as expected.\n");

  println!("--- Resolving Prototypes ---");
  let t1 = context.require("prototype_tracker").unwrap();
  let t2 = context.require("prototype_tracker").unwrap();
  let (t1, t2) = (
    t1.downcast::<RequestTracker>().unwrap(),
    t2.downcast::<RequestTracker>().unwrap(),
  );
  println!("Prototype 1 ID: {}, Prototype 2 ID: {}", t1.id, t2.id);
  assert_eq!(t1.id, 1);
  assert_eq!(t2.id, 2);
  assert!(!Rc::ptr_eq(&t1, &t2), "Prototype instances should be different");
  println!("Prototype instances are different pointers, as expected.");
}
