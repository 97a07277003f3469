use std::sync::Arc;

use crate::domain::{NewMessageLog, StatusUpdate, map_delivery_code, normalize_timestamp};
use crate::engine::identity::IdentityResolver;
use crate::store::{InsertOutcome, MessageLogStore, StoreError};
use crate::transport::webhook::{
    WebhookShape, classify, extract_inbound_message, extract_status_callback, normalize_payload,
};

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The payload was not a JSON object. This is the only recoverable-free
    /// condition a webhook endpoint may reject.
    #[error("webhook payload is not a JSON object")]
    NotAnObject,

    /// The log store failed; unlike the expected webhook conditions this is
    /// not absorbed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Disposition of one webhook delivery. Every variant acknowledges; the
/// provider must never be provoked into retrying an already-handled payload.
pub enum WebhookOutcome {
    /// A delivery-status callback updated matching records.
    StatusApplied { message_id: String, matched: usize },
    /// A delivery-status callback matched no record; nothing changed.
    StatusUnmatched { message_id: String },
    /// An inbound message was stored as a new record.
    InboundStored { message_id: String },
    /// The same inbound message had already been stored; idempotent no-op.
    InboundDuplicate { message_id: String },
    /// A matched shape was missing required fields; logged, nothing changed.
    Invalid { reason: String },
    /// Neither shape matched (heartbeat or junk); logged, nothing changed.
    Ignored,
}

impl WebhookOutcome {
    /// Short status message for the acknowledgment body.
    pub fn ack_message(&self) -> &'static str {
        "Webhook processed"
    }
}

/// Classifies webhook payloads and applies them to the message log: delivery
/// statuses reconcile existing outbound records, inbound messages create new
/// ones.
pub struct WebhookProcessor {
    store: Arc<dyn MessageLogStore>,
    identities: Arc<dyn IdentityResolver>,
}

impl WebhookProcessor {
    pub fn new(store: Arc<dyn MessageLogStore>, identities: Arc<dyn IdentityResolver>) -> Self {
        Self { store, identities }
    }

    /// Handle one webhook delivery to completion.
    ///
    /// All expected conditions (unmatched ids, duplicate inbound deliveries,
    /// malformed timestamps, missing fields) are absorbed into the returned
    /// [`WebhookOutcome`]; only a non-object payload or a store failure
    /// surfaces as an error.
    pub fn handle(&self, payload: &serde_json::Value) -> Result<WebhookOutcome, WebhookError> {
        let normalized = normalize_payload(payload).ok_or(WebhookError::NotAnObject)?;

        let classification = classify(&normalized);
        if classification.hint_disagreement {
            tracing::warn!(
                shape = ?classification.shape,
                "webhook event_type hint disagrees with field-presence classification"
            );
        }

        match classification.shape {
            WebhookShape::DeliveryStatus => self.reconcile_status(&normalized),
            WebhookShape::Inbound => self.store_inbound(&normalized),
            WebhookShape::Unrecognized => {
                tracing::info!("unrecognized webhook payload acknowledged without state change");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    fn reconcile_status(
        &self,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<WebhookOutcome, WebhookError> {
        let callback = match extract_status_callback(payload) {
            Ok(callback) => callback,
            Err(err) => {
                tracing::warn!(error = %err, "delivery-status webhook failed validation");
                return Ok(WebhookOutcome::Invalid {
                    reason: err.to_string(),
                });
            }
        };

        let update = StatusUpdate {
            status: map_delivery_code(callback.delivery_status),
            error_code: callback.error_code,
            processed_at: normalize_timestamp(callback.processed_at.as_deref()),
            delivered_at: normalize_timestamp(callback.delivered_at.as_deref()),
        };

        let matched = self.store.apply_status(&callback.message_id, update)?;
        if matched == 0 {
            tracing::debug!(
                message_id = %callback.message_id,
                "delivery-status webhook matched no records"
            );
            return Ok(WebhookOutcome::StatusUnmatched {
                message_id: callback.message_id,
            });
        }

        tracing::info!(
            message_id = %callback.message_id,
            status = %update.status,
            matched,
            "delivery status applied"
        );
        Ok(WebhookOutcome::StatusApplied {
            message_id: callback.message_id,
            matched,
        })
    }

    fn store_inbound(
        &self,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<WebhookOutcome, WebhookError> {
        let message = match extract_inbound_message(payload) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "inbound webhook failed validation");
                return Ok(WebhookOutcome::Invalid {
                    reason: err.to_string(),
                });
            }
        };

        let received_at = normalize_timestamp(message.received_at.as_deref());

        let sender_identity = match self.identities.find_by_phone(&message.sender) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(
                    sender = %message.sender,
                    error = %err,
                    "identity lookup failed; storing inbound message without sender identity"
                );
                None
            }
        };

        let record = NewMessageLog::inbound(
            message.message_id.clone(),
            message.inbound_number,
            message.sender,
            message.body,
            received_at,
        )
        .with_identities(None, sender_identity);

        match self.store.create(record)? {
            InsertOutcome::Created(_) => {
                tracing::info!(message_id = %message.message_id, "inbound sms stored");
                Ok(WebhookOutcome::InboundStored {
                    message_id: message.message_id,
                })
            }
            InsertOutcome::DuplicateExternalId(message_id) => {
                tracing::info!(message_id = %message_id, "duplicate inbound webhook ignored");
                Ok(WebhookOutcome::InboundDuplicate { message_id })
            }
        }
    }
}
