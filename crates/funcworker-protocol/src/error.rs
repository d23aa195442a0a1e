use serde_json::Value;
use thiserror::Error;

use crate::binding::Shape;

/// Failure to turn an inbound request body into an [`InvocationRequest`].
///
/// [`InvocationRequest`]: crate::InvocationRequest
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed envelope: {0}")]
    Malformed(serde_json::Error),

    #[error("Envelope does not match the invocation schema: {0}")]
    Schema(serde_json::Error),

    #[error("Envelope field `{field}` must be {expected}, found {found}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => DecodeError::Schema(err),
            Category::Syntax | Category::Eof | Category::Io => DecodeError::Malformed(err),
        }
    }
}

/// Failure to look up or coerce a named binding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Binding not found: {0}")]
    BindingNotFound(String),

    #[error("Binding `{binding}` cannot be read as {expected}, found {found}")]
    ShapeMismatch {
        binding: String,
        expected: Shape,
        found: &'static str,
    },

    #[error("Binding `{binding}` has an invalid value: {reason}")]
    InvalidValue { binding: String, reason: String },
}

impl ResolveError {
    /// The binding name (or dotted sub-field path) the failure refers to.
    pub fn binding(&self) -> &str {
        match self {
            ResolveError::BindingNotFound(name) => name,
            ResolveError::ShapeMismatch { binding, .. } => binding,
            ResolveError::InvalidValue { binding, .. } => binding,
        }
    }
}

/// Failure to serialize an [`InvocationResponse`].
///
/// [`InvocationResponse`]: crate::InvocationResponse
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("String-only response cannot carry a {0} return value")]
    ReturnShape(&'static str),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
