// Envelope codec and binding resolver for the custom-handler invocation protocol

pub mod binding;
pub mod blob;
pub mod envelope;
pub mod error;
pub mod http;

pub use binding::{resolve, resolve_metadata, BindingValue, Record, Shape};
pub use blob::BlobData;
pub use envelope::{
    decode, encode, InvocationRequest, InvocationResponse, ResponseEnvelope, ReturnShape,
    INVOCATION_ID_KEY,
};
pub use error::{DecodeError, EncodeError, ResolveError};
pub use http::{HttpRequestData, HttpResponseData};
pub use serde_json::{self, Map, Value};
