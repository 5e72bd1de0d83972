//! Bootstraps a [`Context`] from configuration that arrives piece by piece.
//!
//! Every fragment that is about to be fetched takes a [`Lease`]. Fetched
//! fragments are queued when their lease is returned; once no lease is
//! outstanding, queued properties are merged, queued configuration is parsed
//! in arrival order and the context is initialized. Fragments arriving after
//! that are parsed as soon as the last outstanding lease comes back, and the
//! context registers them on the fly.

use crate::config::{ConfigFragment, ContextConfiguration};
use crate::context::Context;
use crate::error::ConfigurationError;
use crate::properties::Properties;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// The serialization format of a configuration fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
  Yaml,
  Json,
}

impl ConfigFormat {
  /// Guesses the format from a file extension.
  pub fn from_path(path: &Path) -> Option<Self> {
    match path.extension()?.to_str()? {
      "yaml" | "yml" => Some(ConfigFormat::Yaml),
      "json" => Some(ConfigFormat::Json),
      _ => None,
    }
  }

  pub fn parse(self, text: &str) -> Result<ConfigFragment, ConfigurationError> {
    match self {
      ConfigFormat::Yaml => ConfigFragment::from_yaml(text),
      ConfigFormat::Json => ConfigFragment::from_json(text),
    }
  }
}

/// A claim on a fragment that has not arrived yet.
///
/// Handing a lease back is the only way to deliver a fragment, so each
/// pending fragment is accounted for exactly once.
#[must_use = "an outstanding lease keeps the loader from initializing the context"]
#[derive(Debug)]
pub struct Lease {
  _private: (),
}

pub struct Loader {
  configuration: ContextConfiguration,
  outstanding: usize,
  properties: VecDeque<String>,
  configs: VecDeque<(ConfigFormat, String)>,
}

impl Default for Loader {
  fn default() -> Self {
    Self::with_context(Rc::new(Context::new()))
  }
}

impl Loader {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_context(context: Rc<Context>) -> Self {
    Self {
      configuration: ContextConfiguration::new(context),
      outstanding: 0,
      properties: VecDeque::new(),
      configs: VecDeque::new(),
    }
  }

  pub fn context(&self) -> &Rc<Context> {
    self.configuration.context()
  }

  pub fn outstanding(&self) -> usize {
    self.outstanding
  }

  /// Announces a fragment that is about to be fetched.
  pub fn lease(&mut self) -> Lease {
    self.outstanding += 1;
    Lease { _private: () }
  }

  /// Delivers the text of a `.properties` fragment.
  ///
  /// Returns whether this delivery let the loader parse what was queued.
  pub fn deliver_properties(&mut self, lease: Lease, text: impl Into<String>) -> Result<bool, ConfigurationError> {
    self.properties.push_back(text.into());
    self.release(lease)
  }

  /// Delivers the text of a configuration fragment.
  ///
  /// Returns whether this delivery let the loader parse what was queued.
  pub fn deliver_config(
    &mut self,
    lease: Lease,
    format: ConfigFormat,
    text: impl Into<String>,
  ) -> Result<bool, ConfigurationError> {
    self.configs.push_back((format, text.into()));
    self.release(lease)
  }

  /// Returns a lease without delivering anything, e.g. after a failed fetch.
  pub fn release(&mut self, lease: Lease) -> Result<bool, ConfigurationError> {
    let Lease { _private: () } = lease;
    self.outstanding = self.outstanding.saturating_sub(1);
    self.initialize()
  }

  /// Reads a fragment from disk. `.properties` files are treated as
  /// properties, everything else by its extension.
  pub fn load_file(&mut self, path: &Path) -> Result<bool, ConfigurationError> {
    let lease = self.lease();
    let text = match fs::read_to_string(path) {
      Ok(text) => text,
      Err(e) => {
        self.release(lease)?;
        return Err(e.into());
      }
    };

    if path.extension().and_then(|extension| extension.to_str()) == Some("properties") {
      return self.deliver_properties(lease, text);
    }
    match ConfigFormat::from_path(path) {
      Some(format) => self.deliver_config(lease, format, text),
      None => {
        self.release(lease)?;
        Err(ConfigurationError::Parse(format!(
          "unrecognized configuration format: {}",
          path.display()
        )))
      }
    }
  }

  /// Parses everything queued and initializes the context, unless fragments
  /// are still outstanding.
  fn initialize(&mut self) -> Result<bool, ConfigurationError> {
    if self.outstanding > 0 {
      tracing::trace!(outstanding = self.outstanding, "waiting for fragments");
      return Ok(false);
    }

    while let Some(text) = self.properties.pop_front() {
      self.configuration.add_properties(&Properties::parse(&text));
    }
    while let Some((format, text)) = self.configs.pop_front() {
      let fragment = format.parse(&text)?;
      self.configuration.parse_config(fragment)?;
    }

    if self.context().initialize()? {
      tracing::debug!(specifications = self.context().len(), "context initialized");
    }
    Ok(true)
  }
}
