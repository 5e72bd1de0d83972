//! # XMVC scoping
//!
//! Controller state that follows the structure of a document.
//!
//! A [`ScopeChain`] is a tree of key/value frames with lexical lookup: a key
//! is declared by its first write and later writes update the declaring
//! frame. A [`DocumentScope`] binds such frames to the nodes of a
//! [`Document`], creating them lazily as state is stored for a node, and
//! plugs into a [`joice::Context`] as the `document` scope.
//!
//! ```
//! use joice::{Instance, Value};
//! use std::rc::Rc;
//! use xmvc::{Document, DocumentScope, DocumentScopeError, Tree};
//!
//! let tree = Rc::new(Tree::new("html"));
//! let form = tree.append(tree.root(), "form");
//! let input = tree.append(form, "input");
//!
//! let scope = DocumentScope::new(tree.clone());
//! scope.select(input).unwrap();
//! let value = scope
//!   .get("draft", || Ok::<_, DocumentScopeError>(Value::from(Instance::new(String::from("hello")))))
//!   .unwrap();
//!
//! assert_eq!(value.downcast::<String>().unwrap().as_str(), "hello");
//! assert!(scope.for_node(input).unwrap().is_some());
//! assert!(scope.for_node(form).unwrap().is_some());
//! ```

mod chain;
mod document;
mod document_scope;
pub mod error;

pub use chain::{FrameRef, ScopeChain};
pub use document::{Document, NodeId, Tree};
pub use document_scope::{DocumentScope, DOCUMENT};
pub use error::DocumentScopeError;
