//! Field-by-field inspection of JSON objects

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::checked::Checked;

/// Returns the JSON type name of a value
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Expected primitive type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Bool,
    String,
    /// Non-negative integer
    Uint,
    Array,
    Object,
}

impl Kind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Kind::Bool => value.is_boolean(),
            Kind::String => value.is_string(),
            Kind::Uint => value.is_u64(),
            Kind::Array => value.is_array(),
            Kind::Object => value.is_object(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Kind::Bool => "boolean",
            Kind::String => "string",
            Kind::Uint => "non-negative integer",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

/// Accumulates rejection reasons for one JSON object.
///
/// A `null` optional field counts as absent.
pub(crate) struct Inspector<'a> {
    value: &'a Value,
    object: Option<&'a Map<String, Value>>,
    reasons: Vec<String>,
}

impl<'a> Inspector<'a> {
    pub(crate) fn new(value: &'a Value, what: &str) -> Self {
        let object = value.as_object();
        let reasons = match object {
            Some(_) => Vec::new(),
            None => vec![format!(
                "{} must be an object, got {}",
                what,
                json_type_name(value)
            )],
        };
        Self {
            value,
            object,
            reasons,
        }
    }

    /// Raw field value, `None` when absent or null
    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.object?.get(key).filter(|v| !v.is_null())
    }

    /// Whether the key exists, even with a null value
    pub(crate) fn has_key(&self, key: &str) -> bool {
        self.object.map_or(false, |o| o.contains_key(key))
    }

    pub(crate) fn required(&mut self, key: &str, kind: Kind) -> &mut Self {
        if self.object.is_none() {
            return self;
        }
        match self.get(key) {
            Some(v) if kind.matches(v) => {}
            Some(v) => self.reject(format!(
                "field `{}` must be a {}, got {}",
                key,
                kind.name(),
                json_type_name(v)
            )),
            None => self.reject(format!("missing field `{}`", key)),
        }
        self
    }

    pub(crate) fn optional(&mut self, key: &str, kind: Kind) -> &mut Self {
        if let Some(v) = self.get(key) {
            if !kind.matches(v) {
                self.reject(format!(
                    "field `{}` must be a {} when present, got {}",
                    key,
                    kind.name(),
                    json_type_name(v)
                ));
            }
        }
        self
    }

    pub(crate) fn reject(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    /// Build the typed value once every check passed.
    ///
    /// Null fields are dropped first so they take their defaults.
    pub(crate) fn finish<T: DeserializeOwned>(self) -> Checked<T> {
        if !self.reasons.is_empty() {
            return Checked::Invalid(self.reasons);
        }
        let stripped = match self.object {
            Some(object) => Value::Object(
                object
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            None => self.value.clone(),
        };
        match serde_json::from_value(stripped) {
            Ok(typed) => Checked::Valid(typed),
            Err(e) => Checked::Invalid(vec![e.to_string()]),
        }
    }
}
