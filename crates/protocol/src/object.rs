use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// Structured payload segment: `NAME[.key=value...]`.
///
/// Attributes keep insertion order for stable serialization and keys
/// are unique. Values are untyped strings; no coercion is applied.
///
/// Pairs are separated by `.` and split on the first `=`, so a value
/// may contain `=` but not `.` or `::`. There is no escape syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectExpr {
    pub name: String,
    /// `key=value` attributes in insertion order.
    pub fields: Vec<(String, String)>,
}

impl ObjectExpr {
    /// Create an object expression with no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append an attribute, replacing any existing value for the key so
    /// the keys-unique invariant holds for built values too.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Look up an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse `NAME[.key=value...]` into an object expression.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = raw.trim().split('.');

        let name = segments
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            return Err(ParseError::malformed_object("empty object name"));
        }

        let mut fields: Vec<(String, String)> = Vec::new();
        for segment in segments {
            let Some((key, value)) = segment.split_once('=') else {
                return Err(ParseError::malformed_object(format!(
                    "attribute '{segment}' has no '='"
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ParseError::malformed_object("empty attribute key"));
            }
            if fields.iter().any(|(k, _)| k == key) {
                return Err(ParseError::malformed_object(format!(
                    "duplicate attribute key '{key}'"
                )));
            }
            fields.push((key.to_string(), value.trim().to_string()));
        }

        Ok(Self { name, fields })
    }
}

impl fmt::Display for ObjectExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.fields {
            write!(f, ".{key}={value}")?;
        }
        Ok(())
    }
}
