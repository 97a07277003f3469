//! Webhook payload inspection: key case-normalization, shape classification,
//! and extraction of the two accepted callback shapes.
//!
//! Providers deliver keys in inconsistent case (`MessageId`, `messageId`,
//! `messageid` have all been observed), so every key is lowercased before any
//! field lookup. Values are left untouched.

use serde_json::{Map, Value};

/// Field set that identifies an inbound-message payload (keys lowercased).
const INBOUND_FIELDS: [&str; 5] = ["messageid", "inboundnumber", "sender", "body", "receivedat"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload field missing or empty: {field}")]
    MissingField { field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which handler a webhook payload routes to.
pub enum WebhookShape {
    /// A newly received inbound message.
    Inbound,
    /// A delivery-status update for a previously sent message.
    DeliveryStatus,
    /// Neither shape matched; acknowledge without state change.
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub shape: WebhookShape,
    /// True when an `event_type` discriminator was present but contradicted
    /// the field-presence rule. Field presence wins; callers log this.
    pub hint_disagreement: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw fields of a delivery-status callback; timestamps stay unparsed here.
pub struct StatusCallback {
    pub message_id: String,
    pub delivery_status: Option<i64>,
    pub error_code: Option<i32>,
    pub processed_at: Option<String>,
    pub delivered_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw fields of an inbound-message callback.
pub struct InboundMessage {
    pub message_id: String,
    pub inbound_number: String,
    pub sender: String,
    pub body: String,
    pub received_at: Option<String>,
}

/// Lowercase the payload's keys, one level deep plus the nested `data` object.
///
/// Returns `None` when the payload is not a JSON object; that is the single
/// structurally-corrupt case a webhook endpoint may reject.
pub fn normalize_payload(payload: &Value) -> Option<Map<String, Value>> {
    let object = payload.as_object()?;
    let mut normalized = Map::with_capacity(object.len());
    for (key, value) in object {
        let key = key.to_ascii_lowercase();
        let value = if key == "data" {
            match value.as_object() {
                Some(data) => {
                    let mut inner = Map::with_capacity(data.len());
                    for (data_key, data_value) in data {
                        inner.insert(data_key.to_ascii_lowercase(), data_value.clone());
                    }
                    Value::Object(inner)
                }
                None => value.clone(),
            }
        } else {
            value.clone()
        };
        normalized.insert(key, value);
    }
    Some(normalized)
}

/// Decide which handler a (case-normalized) payload routes to.
///
/// Field-presence sniffing decides; an `event_type` discriminator is a hint
/// only. A hint of "inbound" without the inbound field set still routes to
/// the inbound handler, which then reports the missing fields.
pub fn classify(payload: &Map<String, Value>) -> Classification {
    let data = data_object(payload);
    let fields_present =
        has_inbound_fields(payload) || data.map(has_inbound_fields).unwrap_or(false);

    let hint_inbound = event_type_hint(payload).map(|hint| hint.contains("inbound"));
    let hint_disagreement = matches!(hint_inbound, Some(hinted) if hinted != fields_present);

    if fields_present || hint_inbound == Some(true) {
        return Classification {
            shape: WebhookShape::Inbound,
            hint_disagreement,
        };
    }

    if data.map(|data| !data.is_empty()).unwrap_or(false) {
        return Classification {
            shape: WebhookShape::DeliveryStatus,
            hint_disagreement,
        };
    }

    Classification {
        shape: WebhookShape::Unrecognized,
        hint_disagreement,
    }
}

/// Extract a delivery-status callback from a case-normalized payload.
pub fn extract_status_callback(
    payload: &Map<String, Value>,
) -> Result<StatusCallback, PayloadError> {
    let data = data_object(payload).ok_or(PayloadError::MissingField { field: "data" })?;

    let message_id =
        string_field(data, "messageid").ok_or(PayloadError::MissingField { field: "messageId" })?;

    Ok(StatusCallback {
        message_id,
        delivery_status: integer_field(data, "deliverystatus"),
        error_code: integer_field(data, "errorcode").map(|code| code as i32),
        processed_at: string_field(data, "processedat"),
        delivered_at: string_field(data, "deliveredat"),
    })
}

/// Extract an inbound message from a case-normalized payload. The fields may
/// sit at the top level or nested under `data`.
pub fn extract_inbound_message(
    payload: &Map<String, Value>,
) -> Result<InboundMessage, PayloadError> {
    let source = match data_object(payload) {
        Some(data) if data.contains_key("messageid") => data,
        _ => payload,
    };

    let message_id = string_field(source, "messageid")
        .ok_or(PayloadError::MissingField { field: "messageId" })?;
    let inbound_number = string_field(source, "inboundnumber").ok_or(PayloadError::MissingField {
        field: "inboundNumber",
    })?;
    let sender =
        string_field(source, "sender").ok_or(PayloadError::MissingField { field: "sender" })?;
    let body = string_field(source, "body").ok_or(PayloadError::MissingField { field: "body" })?;

    Ok(InboundMessage {
        message_id,
        inbound_number,
        sender,
        body,
        received_at: string_field(source, "receivedat"),
    })
}

fn data_object(payload: &Map<String, Value>) -> Option<&Map<String, Value>> {
    payload.get("data").and_then(Value::as_object)
}

fn has_inbound_fields(map: &Map<String, Value>) -> bool {
    INBOUND_FIELDS.iter().all(|field| map.contains_key(*field))
}

fn event_type_hint(payload: &Map<String, Value>) -> Option<String> {
    payload
        .get("event_type")
        .or_else(|| payload.get("eventtype"))
        .and_then(Value::as_str)
        .map(str::to_ascii_lowercase)
}

/// Read a field as a non-empty string; numbers are accepted and stringified
/// (some provider revisions send numeric message ids).
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(value) => {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Read a field as an integer; numeric strings are accepted.
fn integer_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(value) => value.as_i64(),
        Value::String(value) => value.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(payload: serde_json::Value) -> Map<String, Value> {
        normalize_payload(&payload).unwrap()
    }

    #[test]
    fn normalize_rejects_non_objects() {
        assert!(normalize_payload(&serde_json::json!([1, 2])).is_none());
        assert!(normalize_payload(&serde_json::json!("hello")).is_none());
        assert!(normalize_payload(&serde_json::json!(null)).is_none());
    }

    #[test]
    fn normalize_lowercases_top_level_and_data_keys() {
        let payload = normalized(serde_json::json!({
            "Data": { "MessageId": "abc", "DeliveryStatus": 7 }
        }));
        let data = payload["data"].as_object().unwrap();
        assert_eq!(data["messageid"], "abc");
        assert_eq!(data["deliverystatus"], 7);
    }

    #[test]
    fn classify_flat_inbound_payload() {
        let payload = normalized(serde_json::json!({
            "messageId": "xyz",
            "inboundNumber": "+15550009999",
            "sender": "+15551112222",
            "body": "Hi",
            "receivedAt": "2024-02-02T10:00:00Z"
        }));
        let classification = classify(&payload);
        assert_eq!(classification.shape, WebhookShape::Inbound);
        assert!(!classification.hint_disagreement);
    }

    #[test]
    fn classify_nested_inbound_payload() {
        let payload = normalized(serde_json::json!({
            "data": {
                "MessageId": "xyz",
                "InboundNumber": "+15550009999",
                "Sender": "+15551112222",
                "Body": "Hi",
                "ReceivedAt": "2024-02-02T10:00:00Z"
            }
        }));
        assert_eq!(classify(&payload).shape, WebhookShape::Inbound);
    }

    #[test]
    fn classify_delivery_status_payload() {
        let payload = normalized(serde_json::json!({
            "data": { "MessageId": "abc123", "DeliveryStatus": 7 }
        }));
        let classification = classify(&payload);
        assert_eq!(classification.shape, WebhookShape::DeliveryStatus);
        assert!(!classification.hint_disagreement);
    }

    #[test]
    fn classify_heartbeat_as_unrecognized() {
        let payload = normalized(serde_json::json!({ "ping": true }));
        assert_eq!(classify(&payload).shape, WebhookShape::Unrecognized);

        let payload = normalized(serde_json::json!({ "data": {} }));
        assert_eq!(classify(&payload).shape, WebhookShape::Unrecognized);

        let payload = normalized(serde_json::json!({}));
        assert_eq!(classify(&payload).shape, WebhookShape::Unrecognized);
    }

    #[test]
    fn event_type_hint_routes_inbound_without_field_set() {
        let payload = normalized(serde_json::json!({
            "event_type": "InboundMessage",
            "messageId": "xyz"
        }));
        let classification = classify(&payload);
        assert_eq!(classification.shape, WebhookShape::Inbound);
        assert!(classification.hint_disagreement);
    }

    #[test]
    fn field_presence_wins_over_status_hint() {
        let payload = normalized(serde_json::json!({
            "event_type": "delivery_report",
            "messageId": "xyz",
            "inboundNumber": "+15550009999",
            "sender": "+15551112222",
            "body": "Hi",
            "receivedAt": "2024-02-02T10:00:00Z"
        }));
        let classification = classify(&payload);
        assert_eq!(classification.shape, WebhookShape::Inbound);
        assert!(classification.hint_disagreement);
    }

    #[test]
    fn extract_status_callback_fields() {
        let payload = normalized(serde_json::json!({
            "data": {
                "MessageId": "abc123",
                "DeliveryStatus": 7,
                "ErrorCode": 0,
                "ProcessedAt": "2024-01-01T00:00:00Z",
                "DeliveredAt": "2024-01-01T00:00:05Z"
            }
        }));
        let callback = extract_status_callback(&payload).unwrap();
        assert_eq!(callback.message_id, "abc123");
        assert_eq!(callback.delivery_status, Some(7));
        assert_eq!(callback.error_code, Some(0));
        assert_eq!(callback.processed_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(callback.delivered_at.as_deref(), Some("2024-01-01T00:00:05Z"));
    }

    #[test]
    fn extract_status_callback_tolerates_optional_fields() {
        let payload = normalized(serde_json::json!({
            "data": { "MessageId": "abc123", "DeliveryStatus": "2" }
        }));
        let callback = extract_status_callback(&payload).unwrap();
        assert_eq!(callback.delivery_status, Some(2));
        assert_eq!(callback.error_code, None);
        assert_eq!(callback.processed_at, None);
    }

    #[test]
    fn extract_status_callback_requires_message_id() {
        let payload = normalized(serde_json::json!({
            "data": { "DeliveryStatus": 7 }
        }));
        assert_eq!(
            extract_status_callback(&payload).unwrap_err(),
            PayloadError::MissingField { field: "messageId" }
        );

        let payload = normalized(serde_json::json!({ "other": 1 }));
        assert_eq!(
            extract_status_callback(&payload).unwrap_err(),
            PayloadError::MissingField { field: "data" }
        );
    }

    #[test]
    fn extract_inbound_message_flat_and_nested() {
        let flat = normalized(serde_json::json!({
            "messageId": "xyz",
            "inboundNumber": "+15550009999",
            "sender": "+15551112222",
            "body": "Hi",
            "receivedAt": "2024-02-02T10:00:00Z"
        }));
        let message = extract_inbound_message(&flat).unwrap();
        assert_eq!(message.message_id, "xyz");
        assert_eq!(message.inbound_number, "+15550009999");
        assert_eq!(message.received_at.as_deref(), Some("2024-02-02T10:00:00Z"));

        let nested = normalized(serde_json::json!({
            "data": {
                "messageId": "xyz2",
                "inboundNumber": "+15550009999",
                "sender": "+15551112222",
                "body": "Hi again"
            }
        }));
        let message = extract_inbound_message(&nested).unwrap();
        assert_eq!(message.message_id, "xyz2");
        assert_eq!(message.received_at, None);
    }

    #[test]
    fn extract_inbound_message_reports_missing_fields() {
        let payload = normalized(serde_json::json!({
            "event_type": "inbound",
            "messageId": "xyz"
        }));
        assert_eq!(
            extract_inbound_message(&payload).unwrap_err(),
            PayloadError::MissingField {
                field: "inboundNumber"
            }
        );
    }

    #[test]
    fn numeric_message_ids_are_stringified() {
        let payload = normalized(serde_json::json!({
            "data": { "MessageId": 98765, "DeliveryStatus": 1 }
        }));
        let callback = extract_status_callback(&payload).unwrap();
        assert_eq!(callback.message_id, "98765");
    }
}
