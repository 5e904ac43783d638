//! JSON-RPC envelope decoding and encoding

use serde_json::{Map, Value};
use tracing::error;

use super::types::{McpError, McpRequest, McpResponse, JSONRPC_VERSION};

/// Fallback bytes used if a response cannot be serialized
const ENCODE_FAILURE: &[u8] =
    br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Failed to encode response"}}"#;

/// An envelope that could not be turned into a request
///
/// `id` is the id to echo in the error response: the request's own id when
/// it could be recovered, `null` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    pub id: Value,
    pub error: McpError,
}

impl DecodeError {
    fn new(id: Value, error: McpError) -> Self {
        Self { id, error }
    }

    pub fn into_response(self) -> McpResponse {
        McpResponse::failure(self.id, self.error)
    }
}

/// A decoded payload: one envelope or a batch of them
#[derive(Debug)]
pub enum Incoming {
    Single(Result<McpRequest, DecodeError>),
    Batch(Vec<Result<McpRequest, DecodeError>>),
}

/// Decode a single request envelope
pub fn decode(bytes: &[u8]) -> Result<McpRequest, DecodeError> {
    let value = parse(bytes)?;
    decode_value(value)
}

/// Decode a payload that may be a batch
///
/// Fails as a whole only when the bytes are not JSON or the batch is empty;
/// otherwise each envelope carries its own outcome.
pub fn decode_payload(bytes: &[u8]) -> Result<Incoming, DecodeError> {
    match parse(bytes)? {
        Value::Array(items) if items.is_empty() => Err(DecodeError::new(
            Value::Null,
            McpError::invalid_request("Empty batch"),
        )),
        Value::Array(items) => Ok(Incoming::Batch(
            items.into_iter().map(decode_value).collect(),
        )),
        value => Ok(Incoming::Single(decode_value(value))),
    }
}

fn parse(bytes: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| {
        DecodeError::new(
            Value::Null,
            McpError::parse_error(format!("Parse error: {}", e)),
        )
    })
}

/// Validate an already-parsed envelope
pub fn decode_value(value: Value) -> Result<McpRequest, DecodeError> {
    let Value::Object(mut object) = value else {
        return Err(DecodeError::new(
            Value::Null,
            McpError::invalid_request("Request must be a JSON object"),
        ));
    };

    // Recover the id first so later failures can still be correlated
    let id = take_id(&mut object)?;
    let reply_id = id.clone().unwrap_or(Value::Null);
    let invalid = |message: &str| DecodeError::new(reply_id.clone(), McpError::invalid_request(message));

    match object.get("jsonrpc") {
        Some(Value::String(version)) if version == JSONRPC_VERSION => {}
        _ => return Err(invalid("jsonrpc must be \"2.0\"")),
    }

    let method = match object.remove("method") {
        Some(Value::String(method)) => method,
        Some(_) => return Err(invalid("method must be a string")),
        None => return Err(invalid("Missing method")),
    };

    let params = match object.remove("params") {
        None | Some(Value::Null) => None,
        Some(params @ (Value::Object(_) | Value::Array(_))) => Some(params),
        Some(_) => return Err(invalid("params must be an object or an array")),
    };

    if id == Some(Value::Null) {
        return Err(invalid("Request id must not be null"));
    }

    Ok(McpRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        method,
        params,
        id,
    })
}

/// Extract the id: `None` when absent, `Some(Null)` when literally null
fn take_id(object: &mut Map<String, Value>) -> Result<Option<Value>, DecodeError> {
    match object.remove("id") {
        None => Ok(None),
        Some(id @ (Value::Null | Value::String(_) | Value::Number(_))) => Ok(Some(id)),
        Some(_) => Err(DecodeError::new(
            Value::Null,
            McpError::invalid_request("id must be a string, a number or null"),
        )),
    }
}

/// Encode a response
pub fn encode(response: &McpResponse) -> Vec<u8> {
    serde_json::to_vec(response).unwrap_or_else(|e| {
        error!("Failed to encode response: {}", e);
        ENCODE_FAILURE.to_vec()
    })
}

/// Encode the responses of a batch as a JSON array
pub fn encode_batch(responses: &[McpResponse]) -> Vec<u8> {
    serde_json::to_vec(responses).unwrap_or_else(|e| {
        error!("Failed to encode batch response: {}", e);
        ENCODE_FAILURE.to_vec()
    })
}
