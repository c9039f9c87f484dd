//! Shared helpers for the wiremock-backed integration tests
//!
//! Every JSON-RPC responder here copies the `id` of the incoming request
//! into its reply, since transports reject responses with a foreign id.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const SERVER_VERSION: &str = "0.9.0-test";

/// Parse a recorded request body as JSON.
#[allow(dead_code)]
pub fn body_of(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}

/// JSON-RPC method of a recorded request.
#[allow(dead_code)]
pub fn method_of(request: &Request) -> String {
    body_of(request)["method"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Header value of a recorded request, if present.
#[allow(dead_code)]
pub fn header_of(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Requests received so far whose JSON-RPC method is `rpc_method`.
#[allow(dead_code)]
pub async fn requests_for(server: &MockServer, rpc_method: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| method_of(r) == rpc_method)
        .collect()
}

/// Matches POSTs carrying the given JSON-RPC method.
#[allow(dead_code)]
pub fn rpc(rpc_method: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(body_partial_json(json!({ "method": rpc_method })))
}

/// Reply with `result`, echoing the request id.
#[allow(dead_code)]
pub fn rpc_result(result: Value) -> impl Respond {
    move |request: &Request| {
        let id = body_of(request).get("id").cloned().unwrap_or(Value::Null);
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result,
        }))
    }
}

/// Reply with a JSON-RPC error object, echoing the request id.
#[allow(dead_code)]
pub fn rpc_error(code: i64, message: &str) -> impl Respond {
    let message = message.to_string();
    move |request: &Request| {
        let id = body_of(request).get("id").cloned().unwrap_or(Value::Null);
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message},
        }))
    }
}

/// `initialize` result for `version` advertising the tools capability.
#[allow(dead_code)]
pub fn initialize_result(version: &str) -> Value {
    json!({
        "protocolVersion": version,
        "capabilities": {"tools": {"listChanged": false}},
        "serverInfo": {"name": "toolbox", "version": SERVER_VERSION}
    })
}

/// Responder for a successful `initialize`, optionally issuing a session id
/// and delaying the reply.
#[allow(dead_code)]
pub fn initialize_responder(
    version: &str,
    session_id: Option<&str>,
    delay: Option<Duration>,
) -> impl Respond {
    let result = initialize_result(version);
    let session_id = session_id.map(str::to_string);
    move |request: &Request| {
        let id = body_of(request).get("id").cloned().unwrap_or(Value::Null);
        let mut template = ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result,
        }));
        if let Some(session_id) = &session_id {
            template = template.insert_header("Mcp-Session-Id", session_id.as_str());
        }
        if let Some(delay) = delay {
            template = template.set_delay(delay);
        }
        template
    }
}

/// Responder for a successful `initialize` that issues `session-1`,
/// `session-2`, ... on successive calls.
#[allow(dead_code)]
pub fn numbered_session_responder(version: &str) -> impl Respond {
    let result = initialize_result(version);
    let issued = Arc::new(AtomicUsize::new(0));
    move |request: &Request| {
        let n = issued.fetch_add(1, Ordering::SeqCst) + 1;
        let id = body_of(request).get("id").cloned().unwrap_or(Value::Null);
        let session_id = format!("session-{}", n);
        ResponseTemplate::new(200)
            .set_body_json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result,
            }))
            .insert_header("Mcp-Session-Id", session_id.as_str())
    }
}

/// A typical tool definition as served by `tools/list`.
#[allow(dead_code)]
pub fn search_tool_definition() -> Value {
    json!({
        "name": "search_hotels",
        "description": "Search hotels by city",
        "inputSchema": {
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "City name"},
                "limit": {"type": "integer", "description": "Max results"},
                "user_id": {"type": "string", "description": "Caller"}
            },
            "required": ["city"]
        },
        "_meta": {
            "toolbox/authParam": {"user_id": ["google"]},
            "toolbox/authInvoke": ["hotel-service"]
        }
    })
}

/// Mount a well-behaved server for `version`: handshake, one listed tool and
/// a `tools/call` answering `call_result`.
#[allow(dead_code)]
pub async fn mount_mcp_server(
    server: &MockServer,
    version: &str,
    session_id: Option<&str>,
    call_result: Value,
) {
    rpc("initialize")
        .respond_with(initialize_responder(version, session_id, None))
        .mount(server)
        .await;
    rpc("notifications/initialized")
        .respond_with(ResponseTemplate::new(202))
        .mount(server)
        .await;
    rpc("tools/list")
        .respond_with(rpc_result(json!({"tools": [search_tool_definition()]})))
        .mount(server)
        .await;
    rpc("tools/call")
        .respond_with(rpc_result(call_result))
        .mount(server)
        .await;
}

/// A `tools/call` result with the given text fragments.
#[allow(dead_code)]
pub fn text_content(parts: &[&str]) -> Value {
    let content: Vec<Value> = parts
        .iter()
        .map(|text| json!({"type": "text", "text": text}))
        .collect();
    json!({"content": content})
}
