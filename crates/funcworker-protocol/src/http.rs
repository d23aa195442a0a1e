use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::binding::{coerce, require_record, resolve, BindingValue, Record, Shape};
use crate::envelope::InvocationRequest;
use crate::error::ResolveError;

/// An inbound HTTP request delivered as a trigger binding.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequestData {
    pub url: String,
    pub method: String,
    /// Header values keyed by lowercased name.
    pub headers: BTreeMap<String, Vec<String>>,
    pub query: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    body_path: String,
    body: Value,
}

impl HttpRequestData {
    pub fn resolve(request: &InvocationRequest, name: &str) -> Result<Self, ResolveError> {
        let record = require_record(resolve(request, name, Shape::Record)?, name)?;
        Self::from_record(&record)
    }

    pub fn from_record(record: &Record) -> Result<Self, ResolveError> {
        let url = required_text(record, "Url")?;
        let method = required_text(record, "Method")?;

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        if let Some(header_record) = record.optional_field("Headers", Shape::Record)?.into_record() {
            for (name, raw) in header_record.into_map() {
                let path = format!("{}.Headers.{}", record.path(), name);
                headers
                    .entry(name.to_ascii_lowercase())
                    .or_default()
                    .extend(header_values(&path, &raw)?);
            }
        }

        Ok(Self {
            url,
            method,
            headers,
            query: text_pairs(record, "Query")?,
            params: text_pairs(record, "Params")?,
            body_path: format!("{}.Body", record.path()),
            body: record.raw("Body").cloned().unwrap_or(Value::Null),
        })
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn raw_body(&self) -> &Value {
        &self.body
    }

    pub fn body(&self, shape: Shape) -> Result<BindingValue, ResolveError> {
        coerce(&self.body_path, &self.body, shape)
    }
}

/// The structured HTTP value the host expects for `$return` or an HTTP output
/// binding.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponseData {
    pub status_code: u16,
    pub body: Value,
    pub headers: Map<String, Value>,
}

impl HttpResponseData {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            body: Value::Null,
            headers: Map::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Reads a structured HTTP value; `statusCode` may be a string-encoded
    /// or plain integer.
    pub fn from_record(record: &Record) -> Result<Self, ResolveError> {
        let status_path = format!("{}.statusCode", record.path());
        let status_text = required_text(record, "statusCode")?;
        let status_code = status_text
            .parse::<u16>()
            .map_err(|_| ResolveError::InvalidValue {
                binding: status_path,
                reason: format!("{status_text:?} is not an HTTP status code"),
            })?;

        let headers = match record.optional_field("headers", Shape::Record)? {
            BindingValue::Record(headers) => headers.into_map(),
            _ => Map::new(),
        };

        Ok(Self {
            status_code,
            body: record.raw("body").cloned().unwrap_or(Value::Null),
            headers,
        })
    }
}

impl From<HttpResponseData> for Value {
    fn from(response: HttpResponseData) -> Self {
        json!({
            "statusCode": response.status_code.to_string(),
            "body": response.body,
            "headers": response.headers,
        })
    }
}

fn required_text(record: &Record, name: &str) -> Result<String, ResolveError> {
    match record.field(name, Shape::Text)? {
        BindingValue::Text(text) => Ok(text),
        _ => Err(ResolveError::ShapeMismatch {
            binding: format!("{}.{}", record.path(), name),
            expected: Shape::Text,
            found: "null",
        }),
    }
}

fn text_pairs(record: &Record, name: &str) -> Result<Vec<(String, String)>, ResolveError> {
    let Some(pairs) = record.optional_field(name, Shape::Record)?.into_record() else {
        return Ok(Vec::new());
    };
    Ok(pairs
        .entries(Shape::Text)?
        .into_iter()
        .map(|(key, value)| (key, value.into_text().unwrap_or_default()))
        .collect())
}

// Headers arrive either as a single string or a list of strings.
fn header_values(path: &str, raw: &Value) -> Result<Vec<String>, ResolveError> {
    match raw {
        Value::Array(items) => items
            .iter()
            .map(|item| Ok(coerce(path, item, Shape::Text)?.into_text().unwrap_or_default()))
            .collect(),
        other => Ok(coerce(path, other, Shape::Text)?.into_text().into_iter().collect()),
    }
}
