use chrono::{DateTime, Utc};

use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageContent, PhoneNumber, SenderName};

pub const SEND_BULK_MAX_MESSAGES: usize = 500;

#[derive(Debug, Clone)]
/// One outbound message as submitted to `sms/send` (and as a bulk element).
pub struct SendRequest {
    sender: SenderName,
    recipient: PhoneNumber,
    content: MessageContent,
}

impl SendRequest {
    pub fn new(sender: SenderName, recipient: PhoneNumber, content: MessageContent) -> Self {
        Self {
            sender,
            recipient,
            content,
        }
    }

    pub fn sender(&self) -> &SenderName {
        &self.sender
    }

    pub fn recipient(&self) -> &PhoneNumber {
        &self.recipient
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }
}

#[derive(Debug, Clone)]
/// A batch of outbound messages for `sms/send/bulk`, optionally scheduled.
pub struct BulkRequest {
    messages: Vec<SendRequest>,
    send_at_utc: Option<DateTime<Utc>>,
}

impl BulkRequest {
    pub fn new(
        messages: Vec<SendRequest>,
        send_at_utc: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::Empty { field: "messages" });
        }
        if messages.len() > SEND_BULK_MAX_MESSAGES {
            return Err(ValidationError::TooManyMessages {
                max: SEND_BULK_MAX_MESSAGES,
                actual: messages.len(),
            });
        }
        Ok(Self {
            messages,
            send_at_utc,
        })
    }

    pub fn messages(&self) -> &[SendRequest] {
        &self.messages
    }

    pub fn send_at_utc(&self) -> Option<DateTime<Utc>> {
        self.send_at_utc
    }
}
