use joice::{Component, Context, ObjectSpecification};
use std::cell::RefCell;
use std::rc::Rc;
use xmvc::{Document, DocumentScope, Tree, DOCUMENT};

// One controller per form, shared by every field inside it.
struct FormController {
  edits: RefCell<Vec<String>>,
}

impl Component for FormController {}

impl FormController {
  fn edit(&self, field: &str) {
    self.edits.borrow_mut().push(field.to_string());
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let tree = Rc::new(Tree::new("html"));
  let body = tree.append(tree.root(), "body");
  let login = tree.append(body, "form");
  let user = tree.append(login, "input");
  let password = tree.append(login, "input");
  let search = tree.append(body, "form");
  let query = tree.append(search, "input");

  let scope = Rc::new(DocumentScope::new(tree.clone()));
  let context = Context::new();
  context.add_scope(DOCUMENT, scope.clone()).unwrap();
  context.register_constructor("FormController", |_| {
    println!("Creating FormController...");
    Ok(FormController {
      edits: RefCell::new(Vec::new()),
    })
  });
  let spec = ObjectSpecification::new("FormController")
    .named("form_controller")
    .scoped(DOCUMENT)
    .into_ref();
  context.add_specification(&spec).unwrap();

  // Each form gets its controller the first time one of its fields needs it.
  for (form, field, name) in [
    (login, user, "user"),
    (login, password, "password"),
    (search, query, "query"),
  ] {
    scope.select(form).unwrap();
    let controller = context.require("form_controller").unwrap();
    scope.select(field).unwrap();
    controller.downcast::<FormController>().unwrap().edit(name);
  }

  scope.select(user).unwrap();
  let login_controller = context.require("form_controller").unwrap();
  let login_controller = login_controller.downcast::<FormController>().unwrap();
  println!("Login form saw edits: {:?}", login_controller.edits.borrow());
  assert_eq!(*login_controller.edits.borrow(), vec!["user", "password"]);

  scope.select(query).unwrap();
  let search_controller = context.require("form_controller").unwrap();
  let search_controller = search_controller.downcast::<FormController>().unwrap();
  println!("Search form saw edits: {:?}", search_controller.edits.borrow());
  assert_eq!(*search_controller.edits.borrow(), vec!["query"]);

  println!("{} frames were vivified for {} forms.", scope.frame_count(), 2);
}
