//! Application functions served by the worker.
//!
//! Each function reads its bindings through the resolver and fills in the
//! response; decoding, encoding and log transport happen in [`crate::invoke`].

use chrono::{SecondsFormat, Utc};
use funcworker_protocol::{
    resolve, resolve_metadata, BlobData, BindingValue, HttpRequestData, HttpResponseData,
    InvocationRequest, InvocationResponse, ResolveError, Shape,
};
use serde_json::json;

// Binding names declared in each function's function.json
pub const QUEUE_BINDING: &str = "gwuQueueItem";
pub const BLOB_BINDING: &str = "gwuBlob";
pub const EVENT_HUB_BINDING: &str = "gwuEventHubMessages";
pub const HTTP_BINDING: &str = "req";
pub const TIMER_BINDING: &str = "myTimer";
pub const HTTP_OUTPUT_BINDING: &str = "res";

pub type FunctionResult = Result<(), ResolveError>;

pub fn queue_trigger(request: &InvocationRequest, response: &mut InvocationResponse) -> FunctionResult {
    let processed = processed_message(request)?;
    response
        .log(processed.clone())
        .log(format!("Binding: {QUEUE_BINDING}"))
        .set_return(processed);
    Ok(())
}

/// Return value goes to the first output queue, `output1`/`output2` to the others.
pub fn queue_trigger_with_outputs(
    request: &InvocationRequest,
    response: &mut InvocationResponse,
) -> FunctionResult {
    let processed = processed_message(request)?;
    response
        .set_output("output1", format!("Output1: [{processed}]"))
        .set_output("output2", format!("Output2: [{processed}]"))
        .log(processed.clone())
        .log(format!("Binding: {QUEUE_BINDING}"))
        .set_return(processed);
    Ok(())
}

pub fn blob_trigger(request: &InvocationRequest, response: &mut InvocationResponse) -> FunctionResult {
    let blob = BlobData::resolve(request, BLOB_BINDING)?;
    response
        .log(format!("Name: {}", blob.name))
        .log(format!("Uri :{}", blob.uri))
        .set_return(blob.content);
    Ok(())
}

pub fn event_hub_trigger(
    request: &InvocationRequest,
    response: &mut InvocationResponse,
) -> FunctionResult {
    let message = resolve(request, EVENT_HUB_BINDING, Shape::Text)?
        .into_text()
        .unwrap_or_default();
    response
        .log(format!("Event hub message [{message}]"))
        .set_return(format!("Processed [{message}]"));
    Ok(())
}

pub fn http_trigger_with_outputs(
    request: &InvocationRequest,
    response: &mut InvocationResponse,
) -> FunctionResult {
    let http = HttpRequestData::resolve(request, HTTP_BINDING)?;

    let movie_star = json!({
        "name": "Tom Hanks",
        "movie": {
            "Charlie Wilson's War": "Charlie Wilson",
            "Forrest Gump": "Forrest Gump",
            "Saving Private Ryan": "John Miller",
            "Toy Story": "Woody"
        }
    });
    let res = HttpResponseData::new(201)
        .with_body(movie_star)
        .with_header("server", "AzureFunction")
        .with_header("age", "123456");

    response
        .set_output(HTTP_OUTPUT_BINDING, res)
        .log(format!("URL: {}", http.url))
        .log(format!("METHOD: {}", http.method))
        .set_return(json!({
            "Data": text_response("Return val from httpTriggerWithOutputs")
        }));
    Ok(())
}

pub fn http_trigger_string_return(
    request: &InvocationRequest,
    response: &mut InvocationResponse,
) -> FunctionResult {
    let http = HttpRequestData::resolve(request, HTTP_BINDING)?;

    let res = HttpResponseData::new(201)
        .with_body(text_response("httpTriggerHandlerStringReturnValue"))
        .with_header("server", "AzureFunction")
        .with_header("age", "123456");

    let mut query = String::from("Query string:");
    for (key, value) in &http.query {
        query.push_str(&format!("{key}={value},"));
    }

    response
        .set_output(HTTP_OUTPUT_BINDING, res)
        .log(format!("URL: {}", http.url))
        .log(format!("METHOD: {}", http.method))
        .log(format!("QUERY: {query}"))
        .set_return(query);
    Ok(())
}

pub fn timer_trigger(request: &InvocationRequest, response: &mut InvocationResponse) -> FunctionResult {
    let timer = resolve(request, TIMER_BINDING, Shape::Record)?;
    if let BindingValue::Record(timer) = timer {
        let past_due = timer.optional_field("IsPastDue", Shape::Text)?;
        response.log(format!(
            "Past due: {}",
            past_due.as_text().unwrap_or("unknown")
        ));
    }

    // sys.UtcNow is optional host metadata; anything unreadable is skipped
    let host_time = resolve_metadata(request, "sys", Shape::Record)
        .ok()
        .and_then(BindingValue::into_record)
        .and_then(|sys| sys.optional_field("UtcNow", Shape::Text).ok())
        .and_then(BindingValue::into_text);
    if let Some(now) = host_time {
        response.log(format!("Host time: {now}"));
    }

    response.set_return("Timer triggered");
    Ok(())
}

fn processed_message(request: &InvocationRequest) -> Result<String, ResolveError> {
    let message = resolve(request, QUEUE_BINDING, Shape::Text)?
        .into_text()
        .unwrap_or_default();
    Ok(format!("Processed message: [{message}]"))
}

fn text_response(text: &str) -> String {
    format!("{} [{}]", text, Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
}
