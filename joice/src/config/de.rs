// Custom deserialization helpers for the raw configuration model.

use serde::{Deserialize, Deserializer};

/// Keeps an explicit `null` apart from an absent field: used together with
/// `#[serde(default)]`, a missing field stays `None` while `value: null`
/// becomes `Some(Value::Null)`.
pub(crate) fn present_literal<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
  D: Deserializer<'de>,
{
  serde_json::Value::deserialize(deserializer).map(Some)
}
