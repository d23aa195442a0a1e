use axum::{
    body::Bytes,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use funcworker_protocol::{decode, encode, InvocationRequest, InvocationResponse};
use tracing::{debug, error, info, instrument, warn, Span};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::RouteDescriptor;

/// Header the host sets on every invocation request.
pub const INVOCATION_ID_HEADER: &str = "x-azure-functions-invocationid";

/// Decode, run, encode: the single handler behind every function route.
#[instrument(
    skip_all,
    fields(function = route.function, invocation_id = tracing::field::Empty)
)]
pub async fn invoke(
    route: RouteDescriptor,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = decode(&body).map_err(|e| {
        warn!("Rejected invocation body: {}", e);
        ApiError::from(e)
    })?;
    let request = request.with_invocation_id(header_invocation_id(&headers));
    Span::current().record("invocation_id", request.invocation_id());

    debug!(
        trigger = route.trigger,
        bindings = ?request.binding_names().collect::<Vec<_>>(),
        user_agent = ?headers.get(header::USER_AGENT),
        "Decoded invocation"
    );

    let mut response = InvocationResponse::new(route.return_shape);
    let outcome = (route.run)(&request, &mut response);
    flush_logs(&route, &request, &response);

    if let Err(e) = outcome {
        warn!("Binding resolution failed: {}", e);
        return Err(e.into());
    }

    let body = encode(&response).map_err(|e| {
        error!("Function {} produced an unencodable response: {}", route.function, e);
        ApiError::from(e)
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

fn header_invocation_id(headers: &HeaderMap) -> String {
    headers
        .get(INVOCATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// Function logs are collected per call and written to the sink once, here.
fn flush_logs(route: &RouteDescriptor, request: &InvocationRequest, response: &InvocationResponse) {
    for line in response.logs() {
        info!(
            function = route.function,
            invocation_id = request.invocation_id(),
            "{}",
            line
        );
    }
}
