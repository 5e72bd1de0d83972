//! # Joice
//!
//! A small dependency injection container that assembles objects from
//! declarative specifications.
//!
//! A [`Context`] holds [`ObjectSpecification`]s: a constructor label, the
//! positional arguments and named properties to build an object with, the
//! name of the [`Scope`] that governs its lifecycle and whether it is built
//! eagerly. Arguments and properties are either literals or references to
//! other specifications, resolved recursively on demand.
//!
//! Unlike containers that need one upfront initialization, specifications
//! can keep arriving after [`Context::initialize`], for instance from
//! configuration fragments loaded one at a time through a [`Loader`].
//!
//! ## Quick Start
//!
//! ```
//! use joice::{Component, Context, ObjectSpecification, PropertySpec, Value};
//!
//! struct Greeter {
//!   greeting: String,
//!   target: String,
//! }
//!
//! impl Component for Greeter {
//!   fn set_property(&mut self, name: &str, value: Value) -> Result<(), String> {
//!     match name {
//!       "target" => {
//!         self.target = value.as_str().ok_or("target must be a string")?.to_owned();
//!         Ok(())
//!       }
//!       other => Err(format!("no property named '{}'", other)),
//!     }
//!   }
//! }
//!
//! let context = Context::new();
//! context.register_constructor("Greeter", |arguments| {
//!   let greeting = arguments
//!     .first()
//!     .and_then(Value::as_str)
//!     .ok_or("Greeter needs a greeting")?;
//!   Ok(Greeter { greeting: greeting.to_owned(), target: String::new() })
//! });
//!
//! let greeter = ObjectSpecification::new("Greeter")
//!   .named("greeter")
//!   .with_argument(PropertySpec::value("Hello"))
//!   .with_property("target", PropertySpec::value("World"))
//!   .into_ref();
//! context.add_specification(&greeter).unwrap();
//!
//! let instance = context.load("greeter").unwrap().unwrap();
//! let greeter = instance.downcast::<Greeter>().unwrap();
//! assert_eq!(format!("{}, {}!", greeter.greeting, greeter.target), "Hello, World!");
//! ```

pub mod config;
mod context;
mod core;
pub mod error;
mod factory;
pub mod loader;
pub mod properties;
mod registry;
pub mod scope;
mod spec;
mod value;

pub use crate::core::ObjectId;
pub use context::Context;
pub use error::{ConfigurationError, ContextError, ResolverError, Result};
pub use loader::{ConfigFormat, Lease, Loader};
pub use properties::{Interpolator, Properties};
pub use registry::{Constructor, ConstructorRegistry, ARRAY, OBJECT};
pub use scope::{Factory, PrototypeScope, Scope, SingletonScope};
pub use spec::{InitPolicy, ObjectSpecification, PropertySpec, SpecRef, PROTOTYPE, SINGLETON};
pub use value::{AsAny, Component, Instance, List, Record, Value};
