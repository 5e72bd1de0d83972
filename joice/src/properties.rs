//! Java-style properties and `${name}` interpolation of configuration values.

use crate::error::ConfigurationError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").expect("valid variable pattern"));

/// A flat key/value bundle, usually parsed from a `.properties` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
  entries: HashMap<String, String>,
}

impl Properties {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parses `.properties` text.
  ///
  /// Blank lines and lines starting with `#` or `!` are skipped, a trailing
  /// `\` continues the record on the next line, and the key ends at the first
  /// `=` or `:`. Keys are trimmed, values lose their leading whitespace.
  pub fn parse(text: &str) -> Self {
    let mut properties = Self::new();
    let mut record = String::new();

    for line in text.lines() {
      if record.is_empty() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
          continue;
        }
      }

      let line = if record.is_empty() { line } else { line.trim_start() };
      if let Some(continued) = line.strip_suffix('\\') {
        record.push_str(continued);
        continue;
      }

      record.push_str(line);
      properties.insert_record(&record);
      record.clear();
    }

    if !record.is_empty() {
      properties.insert_record(&record);
    }
    properties
  }

  fn insert_record(&mut self, record: &str) {
    let (key, value) = match record.find(['=', ':']) {
      Some(separator) => (&record[..separator], &record[separator + 1..]),
      None => (record, ""),
    };
    self
      .entries
      .insert(key.trim().to_owned(), value.trim_start().to_owned());
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }

  pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
    self.get(key).unwrap_or(default)
  }

  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.entries.insert(key.into(), value.into());
  }

  /// Merges `other` into `self`, overriding keys defined in both.
  pub fn merge(&mut self, other: &Properties) {
    for (key, value) in &other.entries {
      self.entries.insert(key.clone(), value.clone());
    }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Replaces `${name}` references with property values.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
  properties: Properties,
}

impl Interpolator {
  pub fn new(properties: Properties) -> Self {
    Self { properties }
  }

  pub fn add_properties(&mut self, properties: &Properties) {
    self.properties.merge(properties);
  }

  pub fn properties(&self) -> &Properties {
    &self.properties
  }

  pub fn has_variables(value: &str) -> bool {
    VARIABLE.is_match(value)
  }

  /// Interpolates every variable in `value`.
  ///
  /// Fails on the first reference to a property that is not defined.
  pub fn configure(&self, value: &str) -> Result<String, ConfigurationError> {
    if !Self::has_variables(value) {
      return Ok(value.to_owned());
    }

    let mut missing = None;
    let replaced = VARIABLE.replace_all(value, |captures: &Captures<'_>| {
      let key = &captures[1];
      match self.properties.get(key) {
        Some(replacement) => replacement.to_owned(),
        None => {
          missing.get_or_insert_with(|| key.to_owned());
          String::new()
        }
      }
    });

    match missing {
      Some(key) => Err(ConfigurationError::UndefinedProperty(key)),
      None => Ok(replaced.into_owned()),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn parses_records_comments_and_continuations() {
    let text = "# comment\n\
                ! also a comment\n\
                \n\
                host = example.org\n\
                port:8080\n\
                greeting = hello \\\n    world\n\
                empty\n";
    let properties = Properties::parse(text);

    assert_eq!(properties.get("host"), Some("example.org"));
    assert_eq!(properties.get("port"), Some("8080"));
    assert_eq!(properties.get("greeting"), Some("hello world"));
    assert_eq!(properties.get("empty"), Some(""));
    assert_eq!(properties.len(), 4);
  }

  #[test]
  fn merge_overrides_existing_keys() {
    let mut base = Properties::parse("a=1\nb=2");
    base.merge(&Properties::parse("b=3\nc=4"));

    assert_eq!(base.get("a"), Some("1"));
    assert_eq!(base.get("b"), Some("3"));
    assert_eq!(base.get("c"), Some("4"));
    assert_eq!(base.get_or("d", "default"), "default");
  }

  #[test]
  fn interpolates_known_variables() {
    let interpolator = Interpolator::new(Properties::parse("host=example.org\nport=80"));
    assert_eq!(
      interpolator.configure("http://${host}:${port}/").unwrap(),
      "http://example.org:80/"
    );
    assert_eq!(interpolator.configure("plain").unwrap(), "plain");
  }

  #[test]
  fn undefined_variable_is_an_error() {
    let interpolator = Interpolator::default();
    match interpolator.configure("${missing}") {
      Err(ConfigurationError::UndefinedProperty(key)) => assert_eq!(key, "missing"),
      other => panic!("expected an undefined property, got {:?}", other),
    }
  }
}
