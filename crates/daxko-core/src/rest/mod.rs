mod client;
mod options;

pub use client::ApiClient;
pub use options::RequestOptions;

use serde_json::Value;

use crate::error::Result;

/// Decode a response body, treating an empty body as JSON `null`.
pub(crate) fn decode_json_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}
