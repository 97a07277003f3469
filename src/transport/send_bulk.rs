use chrono::SecondsFormat;
use serde::Deserialize;

use crate::domain::{BulkAck, BulkRequest};
use crate::transport::send::{DecodeError, encode_send_body};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkJsonResponse {
    #[serde(default)]
    batch_id: Option<String>,
    #[serde(default)]
    message_count: Option<u64>,
}

pub fn encode_bulk_body(request: &BulkRequest) -> serde_json::Value {
    let messages = request
        .messages()
        .iter()
        .map(encode_send_body)
        .collect::<Vec<_>>();

    let mut body = serde_json::json!({ "messages": messages });
    if let (Some(send_at), Some(map)) = (request.send_at_utc(), body.as_object_mut()) {
        map.insert(
            "sendAtUtc".to_owned(),
            serde_json::Value::String(send_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }
    body
}

pub fn decode_bulk_ack(json: &str) -> Result<BulkAck, DecodeError> {
    let parsed: BulkJsonResponse = serde_json::from_str(json)?;
    Ok(BulkAck {
        batch_id: parsed.batch_id.filter(|id| !id.trim().is_empty()),
        message_count: parsed.message_count,
    })
}
