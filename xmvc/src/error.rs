use thiserror::Error;

/// Errors raised by a [`DocumentScope`](crate::DocumentScope).
///
/// These signal misuse by the caller; an operation that fails with one of
/// them is not meant to be retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentScopeError {
  #[error("Node {node} is not a part of this scope's document")]
  ForeignNode { node: String },

  #[error(
    "Unable to find a node in the parent tree of {node} which has scope attached. \
     Has this element been added to the document?"
  )]
  Detached { node: String },

  #[error("No node has been selected")]
  NothingSelected,
}

pub type Result<T, E = DocumentScopeError> = std::result::Result<T, E>;
