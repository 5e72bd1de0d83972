//! Declarative configuration of a [`Context`](crate::Context).
//!
//! Configuration arrives as fragments, each a list of object definitions in
//! YAML or JSON:
//!
//! ```yaml
//! objects:
//!   - id: greeter
//!     constructor: Greeter
//!     initialization: eager
//!     arguments:
//!       - value: "${greeting}"
//!     properties:
//!       - name: audience
//!         object: audience
//!       - name: extras
//!         array:
//!           - value: 1
//!           - object: { constructor: Object }
//!   - id: audience
//!     constructor: Audience
//!     scope: prototype
//! ```

mod de;
mod parser;
pub mod raw;

pub use parser::ContextConfiguration;
pub use raw::{ConfigFragment, InitializationRaw, ObjectRaw, ObjectRefRaw, PropertyRaw};

use crate::error::ConfigurationError;

impl ConfigFragment {
  pub fn from_yaml(text: &str) -> Result<Self, ConfigurationError> {
    serde_yaml::from_str(text).map_err(|e| ConfigurationError::Parse(e.to_string()))
  }

  pub fn from_json(text: &str) -> Result<Self, ConfigurationError> {
    serde_json::from_str(text).map_err(|e| ConfigurationError::Parse(e.to_string()))
  }
}
