//! Wire format of the native bridge.
//!
//! Handlers are invoked by name with a single payload and answer through a
//! single callback. Hosts differ in whether they hand over structured
//! values or JSON text, so every string arriving from the native side is
//! treated as serialized JSON and parsed before use.

use serde_json::Value;
use simplepay_common::BridgeError;

/// Navigation the generic-webview host intercepts to learn that the page
/// wants a channel installed.
pub const PROBE_URL: &str = "wvjbscheme://__BRIDGE_LOADED__";

/// Name of the one-time event the Android-family host fires once its
/// channel object is in place.
pub const READY_EVENT: &str = "WebViewJavascriptBridgeReady";

/// Normalize a value received from the native side.
pub fn decode(value: Value) -> Result<Value, BridgeError> {
    match value {
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| BridgeError::MalformedPayload(format!("{e} in {text:?}"))),
        other => Ok(other),
    }
}

/// Serialize a value for hosts that only carry text.
pub fn encode_text(value: &Value) -> Value {
    Value::String(serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()))
}
