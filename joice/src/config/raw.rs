use super::de::present_literal;
use serde::Deserialize;

// --- Top Level Fragment ---
#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFragment {
  #[serde(default)] // A fragment may be empty
  pub objects: Vec<ObjectRaw>,
}

// --- Object Definition ---
#[derive(Debug, Deserialize, PartialEq, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ObjectRaw {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub constructor: Option<String>,
  #[serde(default)]
  pub scope: Option<String>,
  #[serde(default)]
  pub initialization: Option<InitializationRaw>,
  #[serde(default)]
  pub arguments: Vec<PropertyRaw>,
  #[serde(default)]
  pub properties: Vec<PropertyRaw>,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum InitializationRaw {
  Lazy,
  Eager,
}

// --- Arguments and Properties ---
// Exactly one of `value`, `object` and `array` must be set; that rule is
// checked while parsing so the error can name the property.
#[derive(Debug, Deserialize, PartialEq, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PropertyRaw {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default, deserialize_with = "present_literal")]
  pub value: Option<serde_json::Value>,
  #[serde(default)]
  pub object: Option<ObjectRefRaw>,
  #[serde(default)]
  pub array: Option<Vec<PropertyRaw>>,
}

/// Either the label of an object defined elsewhere or an inline definition.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum ObjectRefRaw {
  Label(String),
  Inline(Box<ObjectRaw>),
}
