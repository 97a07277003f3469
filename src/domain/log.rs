use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::status::DeliveryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Weak reference to an identity record in an external user store.
///
/// Carries the numeric key only; resolution and ownership stay with the
/// embedding application.
pub struct IdentityRef(u64);

impl IdentityRef {
    /// Wrap an identity key.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The underlying key.
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One persisted message-log record: a single outbound attempt or a single
/// inbound message.
///
/// Invariant (enforced by the store): no two records share a non-null
/// `external_message_id`.
pub struct MessageLog {
    /// Store-assigned internal id, immutable after creation.
    pub id: u64,
    /// Gateway/provider correlation id; unique when present.
    pub external_message_id: Option<String>,
    /// Destination phone number, raw.
    pub recipient: Option<String>,
    /// Originating sender name or phone number, raw.
    pub sender: Option<String>,
    /// Optional reference to the recipient's identity record.
    pub recipient_identity: Option<IdentityRef>,
    /// Optional reference to the sender's identity record.
    pub sender_identity: Option<IdentityRef>,
    /// Message body.
    pub content: String,
    /// Lifecycle state.
    pub status: DeliveryState,
    /// Gateway error code, or [`LOCAL_FAILURE_ERROR_CODE`](crate::domain::LOCAL_FAILURE_ERROR_CODE)
    /// for local transport failures.
    pub error_code: Option<i32>,
    /// Provider-reported processing timestamp.
    pub processed_at: Option<DateTime<Utc>>,
    /// Provider-reported delivery timestamp.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Set by the store at creation.
    pub created_at: DateTime<Utc>,
    /// Set by the store on creation and every update.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
/// A record to be created; the store assigns `id` and the bookkeeping
/// timestamps.
pub struct NewMessageLog {
    pub external_message_id: Option<String>,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub recipient_identity: Option<IdentityRef>,
    pub sender_identity: Option<IdentityRef>,
    pub content: String,
    pub status: DeliveryState,
    pub error_code: Option<i32>,
    pub processed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl NewMessageLog {
    /// Record for one outbound send attempt, in its terminal state.
    pub fn outbound(
        external_message_id: Option<String>,
        recipient: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
        status: DeliveryState,
        error_code: Option<i32>,
    ) -> Self {
        Self {
            external_message_id,
            recipient: Some(recipient.into()),
            sender: Some(sender.into()),
            recipient_identity: None,
            sender_identity: None,
            content: content.into(),
            status,
            error_code,
            processed_at: None,
            delivered_at: None,
        }
    }

    /// Record for one inbound message received via webhook.
    pub fn inbound(
        external_message_id: impl Into<String>,
        inbound_number: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
        received_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            external_message_id: Some(external_message_id.into()),
            recipient: Some(inbound_number.into()),
            sender: Some(sender.into()),
            recipient_identity: None,
            sender_identity: None,
            content: content.into(),
            status: DeliveryState::Received,
            error_code: None,
            processed_at: received_at,
            delivered_at: received_at,
        }
    }

    /// Attach identity references resolved by the embedding application.
    pub fn with_identities(
        mut self,
        recipient_identity: Option<IdentityRef>,
        sender_identity: Option<IdentityRef>,
    ) -> Self {
        self.recipient_identity = recipient_identity;
        self.sender_identity = sender_identity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Fields a delivery-status callback applies to matching outbound records.
pub struct StatusUpdate {
    pub status: DeliveryState,
    pub error_code: Option<i32>,
    pub processed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}
