use serde::Deserialize;

use crate::domain::{MessageContent, PhoneNumber, SendAck, SendRequest, SenderName};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
struct SendJsonResponse {
    #[serde(default)]
    id: Option<String>,
}

pub fn encode_send_body(request: &SendRequest) -> serde_json::Value {
    serde_json::json!({
        SenderName::FIELD: request.sender().as_str(),
        PhoneNumber::FIELD: request.recipient().raw(),
        MessageContent::FIELD: request.content().as_str(),
    })
}

pub fn decode_send_ack(json: &str) -> Result<SendAck, DecodeError> {
    let parsed: SendJsonResponse = serde_json::from_str(json)?;
    let id = parsed.id.filter(|id| !id.trim().is_empty());
    Ok(SendAck { id })
}
