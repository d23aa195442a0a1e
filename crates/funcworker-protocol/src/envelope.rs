use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{kind_of, DecodeError, EncodeError};

/// Metadata key the host uses for the invocation identifier.
pub const INVOCATION_ID_KEY: &str = "InvocationId";

/// A decoded inbound invocation envelope.
///
/// Binding values and metadata entries keep the order they had on the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvocationRequest {
    invocation_id: String,
    data: Map<String, Value>,
    metadata: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireRequest {
    data: Map<String, Value>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

impl InvocationRequest {
    pub fn new(invocation_id: impl Into<String>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            ..Self::default()
        }
    }

    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }

    /// Fills in the invocation id when the envelope itself did not carry one.
    pub fn with_invocation_id(mut self, invocation_id: impl Into<String>) -> Self {
        if self.invocation_id.is_empty() {
            self.invocation_id = invocation_id.into();
        }
        self
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn binding_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Re-encodes the request in the host's wire shape.
    pub fn to_envelope(&self) -> Value {
        let mut metadata = self.metadata.clone();
        if !self.invocation_id.is_empty() && !metadata.contains_key(INVOCATION_ID_KEY) {
            metadata.insert(
                INVOCATION_ID_KEY.to_string(),
                Value::String(self.invocation_id.clone()),
            );
        }
        json!({ "Data": self.data, "Metadata": metadata })
    }
}

/// Decodes an inbound request body.
///
/// Unknown top-level members are ignored. `Data` is required and must be an
/// object; `Metadata` is optional.
pub fn decode(body: &[u8]) -> Result<InvocationRequest, DecodeError> {
    let wire: WireRequest = serde_json::from_slice(body)?;
    let metadata = wire.metadata.unwrap_or_default();

    let invocation_id = match metadata.get(INVOCATION_ID_KEY) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(id)) => id.clone(),
        Some(other) => {
            return Err(DecodeError::FieldType {
                field: "Metadata.InvocationId",
                expected: "a string",
                found: kind_of(other),
            })
        }
    };

    Ok(InvocationRequest {
        invocation_id,
        data: wire.data,
        metadata,
    })
}

/// How the `ReturnValue` member of a response is constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnShape {
    /// Any JSON value; a missing value is encoded as `null`.
    #[default]
    Generic,
    /// JSON strings only; a missing value is encoded as `""`.
    StringOnly,
}

/// The outbound envelope, built up by application code during one call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvocationResponse {
    shape: ReturnShape,
    outputs: Map<String, Value>,
    logs: Vec<String>,
    return_value: Option<Value>,
}

impl InvocationResponse {
    pub fn new(shape: ReturnShape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    pub fn generic() -> Self {
        Self::new(ReturnShape::Generic)
    }

    pub fn string_only() -> Self {
        Self::new(ReturnShape::StringOnly)
    }

    pub fn log(&mut self, line: impl Into<String>) -> &mut Self {
        self.logs.push(line.into());
        self
    }

    pub fn set_output(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.outputs.insert(name.into(), value.into());
        self
    }

    pub fn set_return(&mut self, value: impl Into<Value>) -> &mut Self {
        self.return_value = Some(value.into());
        self
    }

    pub fn shape(&self) -> ReturnShape {
        self.shape
    }

    pub fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InvokeResponse<'a> {
    outputs: &'a Map<String, Value>,
    logs: &'a [String],
    return_value: &'a Value,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InvokeResponseStringReturnValue<'a> {
    outputs: &'a Map<String, Value>,
    logs: &'a [String],
    return_value: &'a str,
}

/// Serializes a response into exactly `Outputs`, `Logs` and `ReturnValue`.
pub fn encode(response: &InvocationResponse) -> Result<Vec<u8>, EncodeError> {
    match response.shape {
        ReturnShape::Generic => {
            let wire = InvokeResponse {
                outputs: &response.outputs,
                logs: &response.logs,
                return_value: response.return_value.as_ref().unwrap_or(&Value::Null),
            };
            Ok(serde_json::to_vec(&wire)?)
        }
        ReturnShape::StringOnly => {
            let return_value = match &response.return_value {
                None | Some(Value::Null) => "",
                Some(Value::String(value)) => value.as_str(),
                Some(other) => return Err(EncodeError::ReturnShape(kind_of(other))),
            };
            let wire = InvokeResponseStringReturnValue {
                outputs: &response.outputs,
                logs: &response.logs,
                return_value,
            };
            Ok(serde_json::to_vec(&wire)?)
        }
    }
}

/// The host-side view of an encoded response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseEnvelope {
    pub outputs: Map<String, Value>,
    pub logs: Vec<String>,
    pub return_value: Value,
}

impl ResponseEnvelope {
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_envelope() {
        let body = br#"{"Data": {"gwuQueueItem": "hello"}, "Metadata": {"InvocationId": "abc"}}"#;
        let request = decode(body).unwrap();

        assert_eq!(request.invocation_id(), "abc");
        assert_eq!(request.data()["gwuQueueItem"], "hello");
        assert_eq!(request.binding_names().collect::<Vec<_>>(), vec!["gwuQueueItem"]);
    }

    #[test]
    fn test_decode_ignores_unknown_members() {
        let body = br#"{"Data": {}, "Metadata": {"sys": {"MethodName": "QueueTrigger"}}, "Extra": [1, 2]}"#;
        let request = decode(body).unwrap();

        assert_eq!(request.invocation_id(), "");
        assert!(request.metadata().contains_key("sys"));
    }

    #[test]
    fn test_decode_keeps_metadata_order() {
        let body = br#"{"Data": {}, "Metadata": {"Uri": "u", "Name": "n", "Properties": {}}}"#;
        let request = decode(body).unwrap();
        let keys: Vec<&str> = request.metadata().keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["Uri", "Name", "Properties"]);
    }

    #[test]
    fn test_decode_rejects_invalid_bodies() {
        assert!(matches!(decode(b"{not json"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(b""), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(b"[1, 2]"), Err(DecodeError::Schema(_))));
        assert!(matches!(decode(br#"{"Metadata": {}}"#), Err(DecodeError::Schema(_))));
        assert!(matches!(decode(br#"{"Data": "scalar"}"#), Err(DecodeError::Schema(_))));
        assert!(matches!(decode(br#"{"Data": {}, "Metadata": 5}"#), Err(DecodeError::Schema(_))));
        assert!(matches!(decode(br#"{"Data": {"a": "b""#), Err(DecodeError::Malformed(_))));
        assert!(matches!(
            decode(br#"{"Data": {}, "Metadata": {"InvocationId": 7}}"#),
            Err(DecodeError::FieldType { field: "Metadata.InvocationId", .. })
        ));
    }

    #[test]
    fn test_header_invocation_id_does_not_override_envelope() {
        let request = decode(br#"{"Data": {}, "Metadata": {"InvocationId": "from-body"}}"#)
            .unwrap()
            .with_invocation_id("from-header");
        assert_eq!(request.invocation_id(), "from-body");

        let request = decode(br#"{"Data": {}}"#).unwrap().with_invocation_id("from-header");
        assert_eq!(request.invocation_id(), "from-header");
    }

    #[test]
    fn test_encode_empty_response_keeps_all_members() {
        let json: Value = serde_json::from_slice(&encode(&InvocationResponse::generic()).unwrap()).unwrap();

        assert_eq!(json, json!({ "Outputs": {}, "Logs": [], "ReturnValue": null }));
    }

    #[test]
    fn test_encode_string_only() {
        let mut response = InvocationResponse::string_only();
        response.set_return("ok");
        let json: Value = serde_json::from_slice(&encode(&response).unwrap()).unwrap();
        assert_eq!(json["ReturnValue"], Value::String("ok".to_string()));

        let json: Value =
            serde_json::from_slice(&encode(&InvocationResponse::string_only()).unwrap()).unwrap();
        assert_eq!(json["ReturnValue"], "");
    }

    #[test]
    fn test_encode_explicit_no_value() {
        let mut response = InvocationResponse::string_only();
        response.set_return(Option::<String>::None);
        let json: Value = serde_json::from_slice(&encode(&response).unwrap()).unwrap();
        assert_eq!(json["ReturnValue"], "");

        let mut response = InvocationResponse::generic();
        response.set_return(Option::<String>::None);
        let json: Value = serde_json::from_slice(&encode(&response).unwrap()).unwrap();
        assert_eq!(json["ReturnValue"], Value::Null);
    }

    #[test]
    fn test_encode_string_only_rejects_structured_return() {
        let mut response = InvocationResponse::string_only();
        response.set_return(json!({ "statusCode": "200" }));

        assert!(matches!(encode(&response), Err(EncodeError::ReturnShape("object"))));
    }

    #[test]
    fn test_encode_preserves_log_order() {
        let mut response = InvocationResponse::generic();
        response.log("zeta").log("alpha").log("mid");
        let envelope = ResponseEnvelope::from_slice(&encode(&response).unwrap()).unwrap();

        assert_eq!(envelope.logs, vec!["zeta", "alpha", "mid"]);
    }
}
