use std::fmt;

use serde_json::{Map, Value};

use crate::envelope::InvocationRequest;
use crate::error::{kind_of, ResolveError};

/// The semantic type a caller expects a binding to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Text,
    Bytes,
    Record,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Text => write!(f, "text"),
            Shape::Bytes => write!(f, "bytes"),
            Shape::Record => write!(f, "a record"),
        }
    }
}

/// A binding value coerced to the shape the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingValue {
    /// The binding is declared but carries `null`.
    Absent,
    Text(String),
    Bytes(Vec<u8>),
    Record(Record),
}

impl BindingValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, BindingValue::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BindingValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            BindingValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            BindingValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            BindingValue::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// A structured binding value whose sub-fields are read through the same
/// coercion rules as top-level bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    path: String,
    fields: Map<String, Value>,
}

impl Record {
    pub(crate) fn new(path: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }

    /// Binding name or dotted sub-field path this record was read from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw JSON for a sub-field, for payloads of arbitrary shape.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        lookup(&self.fields, name)
    }

    pub fn field(&self, name: &str, shape: Shape) -> Result<BindingValue, ResolveError> {
        let path = self.child_path(name);
        let value = self
            .raw(name)
            .ok_or_else(|| ResolveError::BindingNotFound(path.clone()))?;
        coerce(&path, value, shape)
    }

    /// Like [`Record::field`], but a missing sub-field is [`BindingValue::Absent`].
    pub fn optional_field(&self, name: &str, shape: Shape) -> Result<BindingValue, ResolveError> {
        match self.raw(name) {
            Some(value) => coerce(&self.child_path(name), value, shape),
            None => Ok(BindingValue::Absent),
        }
    }

    /// Coerces every entry, keeping wire order.
    pub fn entries(&self, shape: Shape) -> Result<Vec<(String, BindingValue)>, ResolveError> {
        self.fields
            .iter()
            .map(|(name, value)| Ok((name.clone(), coerce(&self.child_path(name), value, shape)?)))
            .collect()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    fn child_path(&self, name: &str) -> String {
        format!("{}.{}", self.path, name)
    }
}

/// Resolves a binding from the request's `Data` section.
pub fn resolve(
    request: &InvocationRequest,
    name: &str,
    shape: Shape,
) -> Result<BindingValue, ResolveError> {
    let value = lookup(request.data(), name)
        .ok_or_else(|| ResolveError::BindingNotFound(name.to_string()))?;
    coerce(name, value, shape)
}

/// Resolves a trigger metadata entry from the request's `Metadata` section.
pub fn resolve_metadata(
    request: &InvocationRequest,
    name: &str,
    shape: Shape,
) -> Result<BindingValue, ResolveError> {
    let value = lookup(request.metadata(), name)
        .ok_or_else(|| ResolveError::BindingNotFound(name.to_string()))?;
    coerce(name, value, shape)
}

/// Resolves a binding that must be present and non-null as a record.
pub(crate) fn require_record(
    value: BindingValue,
    path: &str,
) -> Result<Record, ResolveError> {
    match value {
        BindingValue::Record(record) => Ok(record),
        BindingValue::Absent => Err(ResolveError::ShapeMismatch {
            binding: path.to_string(),
            expected: Shape::Record,
            found: "null",
        }),
        // coerce never yields another variant for Shape::Record
        BindingValue::Text(_) | BindingValue::Bytes(_) => Err(ResolveError::ShapeMismatch {
            binding: path.to_string(),
            expected: Shape::Record,
            found: "string",
        }),
    }
}

// Host binding names are case-insensitive; an exact match wins.
fn lookup<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).or_else(|| {
        fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

pub(crate) fn coerce(path: &str, value: &Value, shape: Shape) -> Result<BindingValue, ResolveError> {
    let mismatch = || ResolveError::ShapeMismatch {
        binding: path.to_string(),
        expected: shape,
        found: kind_of(value),
    };

    match (shape, value) {
        (_, Value::Null) => Ok(BindingValue::Absent),
        (Shape::Text, Value::String(text)) => Ok(BindingValue::Text(text.clone())),
        (Shape::Text, Value::Number(number)) => Ok(BindingValue::Text(number.to_string())),
        (Shape::Text, Value::Bool(flag)) => Ok(BindingValue::Text(flag.to_string())),
        (Shape::Bytes, Value::String(text)) => Ok(BindingValue::Bytes(text.as_bytes().to_vec())),
        (Shape::Bytes, Value::Array(items)) => items
            .iter()
            .map(|item| item.as_u64().and_then(|byte| u8::try_from(byte).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(BindingValue::Bytes)
            .ok_or_else(mismatch),
        (Shape::Record, Value::Object(fields)) => {
            Ok(BindingValue::Record(Record::new(path, fields.clone())))
        }
        // Some triggers deliver structured payloads as JSON-encoded strings.
        (Shape::Record, Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => Ok(BindingValue::Record(Record::new(path, fields))),
            _ => Err(mismatch()),
        },
        _ => Err(mismatch()),
    }
}
