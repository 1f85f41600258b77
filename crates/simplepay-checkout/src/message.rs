//! Classification of messages posted by the embedded checkout document.
//!
//! Recognized shapes:
//! - `{type: "SUCCESS"}` or `{status: "success"}`: payment succeeded
//! - `{type: "CLOSE"}` or `{close: true}`: close the overlay
//! - `{frameHeight: n}`: sizing hint, accepted but currently inert
//!
//! Unknown fields and unrecognized messages are ignored.

use serde::Deserialize;
use serde_json::Value;

const SUCCESS_TYPES: &[&str] = &["SUCCESS", "SIMPLEPAY_SUCCESS"];
const CLOSE_TYPES: &[&str] = &["CLOSE", "SIMPLEPAY_CLOSE"];

/// Domain event carried by an embedded-content message.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutEvent {
    /// Payment succeeded. Carries the whole message.
    Success(Value),
    /// The content asks for the overlay to close.
    Close,
    /// Preferred frame height in px. Reserved for dynamic sizing.
    FrameHeight(f64),
}

/// Loose view of a message. Fields keep their raw JSON so a field of an
/// unexpected type never rejects the whole message.
#[derive(Debug, Default, Deserialize)]
struct InboundMessage {
    #[serde(rename = "type")]
    kind: Option<Value>,
    status: Option<Value>,
    close: Option<Value>,
    #[serde(rename = "frameHeight")]
    frame_height: Option<Value>,
}

/// Classify one posted message. A message may carry several signals;
/// success is always reported before close.
pub fn classify(data: &Value) -> Vec<CheckoutEvent> {
    if !data.is_object() {
        return Vec::new();
    }
    let Ok(msg) = InboundMessage::deserialize(data) else {
        return Vec::new();
    };

    let kind = msg.kind.as_ref().and_then(Value::as_str);
    let mut events = Vec::new();

    let success = kind.is_some_and(|k| SUCCESS_TYPES.contains(&k))
        || msg.status.as_ref().and_then(Value::as_str) == Some("success");
    if success {
        events.push(CheckoutEvent::Success(data.clone()));
    }

    let close = kind.is_some_and(|k| CLOSE_TYPES.contains(&k))
        || msg.close.as_ref().and_then(Value::as_bool) == Some(true);
    if close {
        events.push(CheckoutEvent::Close);
    }

    if let Some(height) = msg.frame_height.as_ref().and_then(Value::as_f64) {
        if height != 0.0 {
            events.push(CheckoutEvent::FrameHeight(height));
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_by_type() {
        let msg = json!({"type": "SUCCESS", "transactionId": "T-9"});
        assert_eq!(classify(&msg), vec![CheckoutEvent::Success(msg.clone())]);

        let legacy = json!({"type": "SIMPLEPAY_SUCCESS"});
        assert_eq!(classify(&legacy), vec![CheckoutEvent::Success(legacy.clone())]);
    }

    #[test]
    fn success_by_status() {
        let msg = json!({"status": "success", "amount": 10});
        assert_eq!(classify(&msg), vec![CheckoutEvent::Success(msg.clone())]);
    }

    #[test]
    fn close_by_type_or_flag() {
        assert_eq!(classify(&json!({"type": "CLOSE"})), vec![CheckoutEvent::Close]);
        assert_eq!(
            classify(&json!({"type": "SIMPLEPAY_CLOSE"})),
            vec![CheckoutEvent::Close]
        );
        assert_eq!(classify(&json!({"close": true})), vec![CheckoutEvent::Close]);
    }

    #[test]
    fn close_flag_must_be_true() {
        assert!(classify(&json!({"close": false})).is_empty());
        assert!(classify(&json!({"close": "true"})).is_empty());
        assert!(classify(&json!({"close": 1})).is_empty());
    }

    #[test]
    fn success_and_close_in_one_message() {
        let msg = json!({"status": "success", "close": true});
        assert_eq!(
            classify(&msg),
            vec![CheckoutEvent::Success(msg.clone()), CheckoutEvent::Close]
        );
    }

    #[test]
    fn frame_height_is_reported() {
        assert_eq!(
            classify(&json!({"frameHeight": 540})),
            vec![CheckoutEvent::FrameHeight(540.0)]
        );
        assert!(classify(&json!({"frameHeight": 0})).is_empty());
    }

    #[test]
    fn unrecognized_messages_are_ignored() {
        assert!(classify(&json!({"type": "PROGRESS", "step": 2})).is_empty());
        assert!(classify(&json!({"status": "pending"})).is_empty());
        assert!(classify(&json!({})).is_empty());
    }

    #[test]
    fn non_object_data_is_ignored() {
        assert!(classify(&Value::Null).is_empty());
        assert!(classify(&json!("SUCCESS")).is_empty());
        assert!(classify(&json!(["CLOSE"])).is_empty());
        assert!(classify(&json!(42)).is_empty());
    }

    #[test]
    fn unexpected_field_types_do_not_reject_message() {
        let msg = json!({"type": 7, "close": true, "status": {"nested": true}});
        assert_eq!(classify(&msg), vec![CheckoutEvent::Close]);
    }
}
