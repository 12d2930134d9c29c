//! Field access over raw feed objects.
//!
//! Feed payloads are kept as [`serde_json::Value`] until a record is mapped so
//! that a missing key can be reported by name instead of surfacing as a
//! generic deserialization failure.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Errors raised while mapping a feed object into a domain record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A key the row mapper relies on is absent.
    #[error("{entity} record is missing field `{field}`")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    /// A key is present but holds a value of the wrong shape.
    #[error("{entity} field `{field}` is invalid: {reason}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// Borrowed view over the keys of one feed object.
pub(crate) struct Fields<'a> {
    entity: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(entity: &'static str, value: &'a Value) -> Result<Self, RecordError> {
        match value.as_object() {
            Some(map) => Ok(Self { entity, map }),
            None => Err(RecordError::InvalidField {
                entity,
                field: "record",
                reason: "expected a JSON object".to_string(),
            }),
        }
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> RecordError {
        RecordError::InvalidField {
            entity: self.entity,
            field,
            reason: reason.into(),
        }
    }

    /// Returns the raw value, failing when the key is absent.
    pub(crate) fn value(&self, field: &'static str) -> Result<&'a Value, RecordError> {
        self.map.get(field).ok_or(RecordError::MissingField {
            entity: self.entity,
            field,
        })
    }

    /// Returns the raw value when the key is present and not null.
    pub(crate) fn optional(&self, field: &'static str) -> Option<&'a Value> {
        self.map.get(field).filter(|value| !value.is_null())
    }

    /// Required integer, typically an identifier.
    pub(crate) fn integer(&self, field: &'static str) -> Result<i64, RecordError> {
        self.value(field)?
            .as_i64()
            .ok_or_else(|| self.invalid(field, "expected an integer"))
    }

    /// Required integer-valued identifier wrapped in a domain newtype.
    pub(crate) fn id<T>(&self, field: &'static str) -> Result<T, RecordError>
    where
        T: TryFrom<i64, Error = TypeConstraintError>,
    {
        let raw = self.integer(field)?;
        T::try_from(raw).map_err(|e| self.invalid(field, e.to_string()))
    }

    /// Present key holding a scalar, rendered as cell text. Null renders empty.
    pub(crate) fn scalar(&self, field: &'static str) -> Result<String, RecordError> {
        let value = self.value(field)?;
        render_scalar(value).ok_or_else(|| self.invalid(field, "expected a scalar value"))
    }

    /// Present key holding a string or null.
    pub(crate) fn text(&self, field: &'static str) -> Result<Option<String>, RecordError> {
        match self.value(field)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(self.invalid(field, "expected a string")),
        }
    }

    /// Present key holding a boolean or null.
    pub(crate) fn flag(&self, field: &'static str) -> Result<Option<bool>, RecordError> {
        match self.value(field)? {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            _ => Err(self.invalid(field, "expected a boolean")),
        }
    }

    /// Present key holding an array of strings.
    pub(crate) fn strings(&self, field: &'static str) -> Result<Vec<String>, RecordError> {
        match self.value(field)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.invalid(field, "expected an array of strings"))
                })
                .collect(),
            _ => Err(self.invalid(field, "expected an array of strings")),
        }
    }

    /// Present key holding an array of objects.
    pub(crate) fn array(&self, field: &'static str) -> Result<&'a [Value], RecordError> {
        match self.value(field)? {
            Value::Array(items) => Ok(items.as_slice()),
            Value::Null => Ok(&[]),
            _ => Err(self.invalid(field, "expected an array")),
        }
    }
}

/// Renders a JSON scalar the way it is stored in a CSV cell.
///
/// Returns `None` for arrays and objects.
pub fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Renders an optional value as a cell; `None` becomes empty.
pub(crate) fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
