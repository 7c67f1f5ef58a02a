//! Field-by-field access to a JSON object with type checks.

use jiff::Timestamp;
use serde_json::{Map, Value};

use crate::timestamp;
use crate::DecodeError;

/// A JSON object being taken apart one field at a time.
///
/// Every accessor removes the key it reads, so whatever is left at the
/// end is the set of fields nobody asked for.
pub(crate) struct Fields {
    map: Map<String, Value>,
}

impl Fields {
    pub fn new(value: Value, what: &'static str) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            _ => Err(DecodeError::NotAnObject(what)),
        }
    }

    /// Removes a key, treating `null` as absent.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key).filter(|v| !v.is_null())
    }

    pub fn required_str(&mut self, key: &'static str) -> Result<String, DecodeError> {
        self.optional_str(key)?.ok_or(DecodeError::MissingField(key))
    }

    pub fn optional_str(&mut self, key: &'static str) -> Result<Option<String>, DecodeError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(DecodeError::WrongType {
                field: key,
                expected: "a string",
            }),
        }
    }

    /// Reads a non-negative integer. Numeric strings are accepted.
    pub fn u64_or(&mut self, key: &'static str, default: u64) -> Result<u64, DecodeError> {
        let wrong_type = DecodeError::WrongType {
            field: key,
            expected: "a non-negative integer",
        };
        match self.take(key) {
            None => Ok(default),
            Some(Value::Number(n)) => n.as_u64().ok_or(wrong_type),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| wrong_type),
            Some(_) => Err(wrong_type),
        }
    }

    pub fn f64_or(&mut self, key: &'static str, default: f64) -> Result<f64, DecodeError> {
        match self.take(key) {
            None => Ok(default),
            Some(Value::Number(n)) => n.as_f64().ok_or(DecodeError::WrongType {
                field: key,
                expected: "a number",
            }),
            Some(_) => Err(DecodeError::WrongType {
                field: key,
                expected: "a number",
            }),
        }
    }

    pub fn string_list(&mut self, key: &'static str) -> Result<Vec<String>, DecodeError> {
        let wrong_type = || DecodeError::WrongType {
            field: key,
            expected: "a list of strings",
        };
        match self.take(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(wrong_type()),
                })
                .collect(),
            Some(_) => Err(wrong_type()),
        }
    }

    pub fn object(&mut self, key: &'static str) -> Result<Option<Map<String, Value>>, DecodeError> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(DecodeError::WrongType {
                field: key,
                expected: "an object",
            }),
        }
    }

    pub fn timestamp(&mut self, key: &'static str) -> Result<Option<Timestamp>, DecodeError> {
        timestamp::from_field(key, self.take(key))
    }

    /// Decodes a list of records element by element, stopping at the
    /// first element that fails.
    pub fn records<T, F>(&mut self, key: &'static str, mut decode: F) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(Value) -> Result<T, DecodeError>,
    {
        match self.take(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    decode(item).map_err(|source| DecodeError::Element {
                        field: key,
                        index,
                        source: Box::new(source),
                    })
                })
                .collect(),
            Some(_) => Err(DecodeError::WrongType {
                field: key,
                expected: "a list",
            }),
        }
    }

    /// The fields that were never read.
    pub fn into_rest(self) -> Map<String, Value> {
        self.map
    }
}
