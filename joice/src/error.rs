use crate::core::ObjectId;
use thiserror::Error;

/// Errors raised by a [`Context`](crate::Context) while registering or
/// assembling objects.
#[derive(Debug, Error)]
pub enum ContextError {
  #[error("Cannot redefine scope {0}")]
  DuplicateScope(String),

  #[error("Specification {id} uses unknown scope '{scope}'")]
  UnknownScope { id: ObjectId, scope: String },

  #[error("Specification {0} has no constructor")]
  MissingConstructor(ObjectId),

  #[error("No constructor registered under '{0}'")]
  UnknownConstructor(String),

  #[error("Unable to initialize {constructor}: {message}")]
  Construction { constructor: String, message: String },

  #[error("Unable to set property '{property}' on {constructor}: {message}")]
  PropertyInjection {
    constructor: String,
    property: String,
    message: String,
  },

  #[error("Specification {dependent} depends on a specification that was never registered")]
  UnregisteredDependency { dependent: ObjectId },

  #[error("Circular dependency detected while resolving {}", format_path(.0))]
  CircularDependency(Vec<ObjectId>),

  #[error("Scope '{scope}' failed: {source}")]
  Scope {
    scope: String,
    #[source]
    source: Box<dyn std::error::Error + 'static>,
  },
}

fn format_path(path: &[ObjectId]) -> String {
  path
    .iter()
    .map(ObjectId::to_string)
    .collect::<Vec<_>>()
    .join(" -> ")
}

/// Errors raised while turning declarative configuration into
/// specifications.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error("All properties must have a name attribute (object '{object}')")]
  MissingPropertyName { object: String },

  #[error(
    "Property '{property}' has {count} values. Properties may only have a single value, \
     use an array if multiple values are desired"
  )]
  AmbiguousProperty { property: String, count: usize },

  #[error("Property '{property}' must have a value, an object or an array")]
  EmptyProperty { property: String },

  #[error("Unable to find object definition with id \"{0}\"")]
  MissingDefinition(String),

  #[error("Reference to undefined property '{0}'")]
  UndefinedProperty(String),

  #[error("Failed to parse configuration: {0}")]
  Parse(String),

  #[error("Failed to read configuration: {0}")]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Context(#[from] ContextError),
}

/// Raised when a label that callers expect to exist cannot be resolved.
#[derive(Debug, Error)]
pub enum ResolverError {
  #[error("No object is registered under the label '{0}'")]
  UnknownLabel(String),

  #[error(transparent)]
  Context(#[from] ContextError),
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ContextError> = std::result::Result<T, E>;
