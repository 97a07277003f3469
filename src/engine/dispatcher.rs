use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::client::{GatewayResponse, SmsGateway, TransportFailure};
use crate::domain::{
    BulkRequest, DeliveryState, IdentityRef, LOCAL_FAILURE_ERROR_CODE, MessageContent,
    NewMessageLog, PhoneNumber, SendRequest, SenderName, ValidationError,
};
use crate::store::{InsertOutcome, MessageLogStore, StoreError};

#[derive(Debug, thiserror::Error)]
/// Send failures surfaced to the outbound caller. Whatever the failure, the
/// matching log record has already been written when this is returned.
pub enum SendError {
    /// The gateway was unreachable (timeout, connection error, no response).
    #[error(transparent)]
    Transport(#[from] TransportFailure),

    /// The gateway responded with a non-success HTTP status.
    #[error("gateway rejected the send: HTTP {status}")]
    GatewayRejected { status: u16, body: String },

    /// The gateway reported success but assigned no message/batch id, so the
    /// send cannot be reconciled later; treated as a failure.
    #[error("gateway success response did not contain an assigned id")]
    MissingAssignedId,

    /// The log store failed; the send outcome could not be recorded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A batch could not be constructed from the given messages.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
/// One outbound message as submitted by the caller.
pub struct OutboundMessage {
    pub to: PhoneNumber,
    pub content: MessageContent,
    /// Overrides the dispatcher's configured default sender.
    pub from: Option<SenderName>,
    pub recipient_identity: Option<IdentityRef>,
    pub sender_identity: Option<IdentityRef>,
}

impl OutboundMessage {
    pub fn new(to: PhoneNumber, content: MessageContent) -> Self {
        Self {
            to,
            content,
            from: None,
            recipient_identity: None,
            sender_identity: None,
        }
    }

    pub fn from_sender(mut self, from: SenderName) -> Self {
        self.from = Some(from);
        self
    }

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

#[derive(Debug, Clone)]
/// Successful single-send result.
pub struct SendReceipt {
    /// Gateway-assigned message id, recorded as the log's external id.
    pub message_id: String,
    pub status: DeliveryState,
    /// Raw gateway response, for diagnostics.
    pub response: GatewayResponse,
}

#[derive(Debug, Clone)]
/// Successful batch-send result.
pub struct BatchReceipt {
    pub batch_id: String,
    pub message_count: u64,
    pub response: GatewayResponse,
}

/// Builds gateway requests, interprets results, and writes exactly one log
/// record per message on every path.
pub struct SendDispatcher {
    gateway: Arc<dyn SmsGateway>,
    store: Arc<dyn MessageLogStore>,
    default_sender: SenderName,
}

impl SendDispatcher {
    /// The default sender applies whenever a message carries no `from`; it is
    /// fixed at construction rather than read from the environment per call.
    pub fn new(
        gateway: Arc<dyn SmsGateway>,
        store: Arc<dyn MessageLogStore>,
        default_sender: SenderName,
    ) -> Self {
        Self {
            gateway,
            store,
            default_sender,
        }
    }

    /// Send one message and record its terminal outcome.
    ///
    /// Exactly one log record is written per call: `sent` with the assigned
    /// id on success, `failed` with the gateway status code on rejection,
    /// `failed` with the local-failure sentinel when the gateway was
    /// unreachable, and `failed` when a success response carried no id.
    pub async fn send_one(&self, message: OutboundMessage) -> Result<SendReceipt, SendError> {
        let sender = message
            .from
            .clone()
            .unwrap_or_else(|| self.default_sender.clone());
        let request = SendRequest::new(sender.clone(), message.to.clone(), message.content.clone());

        let outcome = match self.gateway.send(&request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(recipient = message.to.raw(), error = %err, "sms send failed in transport");
                self.record_outbound(
                    &message,
                    &sender,
                    None,
                    DeliveryState::Failed,
                    Some(LOCAL_FAILURE_ERROR_CODE),
                )?;
                return Err(SendError::Transport(err));
            }
        };

        if !outcome.response.is_success() {
            let status = outcome.response.status;
            tracing::warn!(recipient = message.to.raw(), status, "gateway rejected sms send");
            self.record_outbound(
                &message,
                &sender,
                None,
                DeliveryState::Failed,
                Some(i32::from(status)),
            )?;
            return Err(SendError::GatewayRejected {
                status,
                body: outcome.response.body,
            });
        }

        match outcome.ack.and_then(|ack| ack.id) {
            Some(id) => {
                self.record_outbound(&message, &sender, Some(id.clone()), DeliveryState::Sent, None)?;
                tracing::info!(message_id = %id, recipient = message.to.raw(), "sms sent");
                Ok(SendReceipt {
                    message_id: id,
                    status: DeliveryState::Sent,
                    response: outcome.response,
                })
            }
            None => {
                tracing::warn!(
                    recipient = message.to.raw(),
                    "gateway 2xx response without assigned id; recording send as failed"
                );
                self.record_outbound(&message, &sender, None, DeliveryState::Failed, None)?;
                Err(SendError::MissingAssignedId)
            }
        }
    }

    /// Send a batch in one gateway call and record one log record per input
    /// message with a uniform outcome.
    ///
    /// The bulk response carries no per-message detail, so individual
    /// failures inside an accepted batch are not separable; records are
    /// tagged `{batch_id}:{ordinal}` to stay correlatable with the batch
    /// while keeping external ids unique.
    pub async fn send_batch(
        &self,
        messages: Vec<OutboundMessage>,
        send_at_utc: Option<DateTime<Utc>>,
    ) -> Result<BatchReceipt, SendError> {
        let senders: Vec<SenderName> = messages
            .iter()
            .map(|message| {
                message
                    .from
                    .clone()
                    .unwrap_or_else(|| self.default_sender.clone())
            })
            .collect();
        let requests: Vec<SendRequest> = messages
            .iter()
            .zip(&senders)
            .map(|(message, sender)| {
                SendRequest::new(sender.clone(), message.to.clone(), message.content.clone())
            })
            .collect();
        let request = BulkRequest::new(requests, send_at_utc)?;

        let outcome = match self.gateway.send_bulk(&request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(messages = messages.len(), error = %err, "bulk sms send failed in transport");
                self.record_batch(
                    &messages,
                    &senders,
                    |_| None,
                    DeliveryState::Failed,
                    Some(LOCAL_FAILURE_ERROR_CODE),
                )?;
                return Err(SendError::Transport(err));
            }
        };

        if !outcome.response.is_success() {
            let status = outcome.response.status;
            tracing::warn!(messages = messages.len(), status, "gateway rejected bulk sms send");
            self.record_batch(
                &messages,
                &senders,
                |_| None,
                DeliveryState::Failed,
                Some(i32::from(status)),
            )?;
            return Err(SendError::GatewayRejected {
                status,
                body: outcome.response.body,
            });
        }

        let ack = outcome.ack.unwrap_or_default();
        match ack.batch_id {
            Some(batch_id) => {
                self.record_batch(
                    &messages,
                    &senders,
                    |ordinal| Some(format!("{batch_id}:{ordinal}")),
                    DeliveryState::Sent,
                    None,
                )?;
                let message_count = ack.message_count.unwrap_or(messages.len() as u64);
                tracing::info!(batch_id = %batch_id, message_count, "sms batch sent");
                Ok(BatchReceipt {
                    batch_id,
                    message_count,
                    response: outcome.response,
                })
            }
            None => {
                tracing::warn!(
                    messages = messages.len(),
                    "gateway 2xx bulk response without batch id; recording batch as failed"
                );
                self.record_batch(&messages, &senders, |_| None, DeliveryState::Failed, None)?;
                Err(SendError::MissingAssignedId)
            }
        }
    }

    fn record_outbound(
        &self,
        message: &OutboundMessage,
        sender: &SenderName,
        external_message_id: Option<String>,
        status: DeliveryState,
        error_code: Option<i32>,
    ) -> Result<(), SendError> {
        let record = NewMessageLog::outbound(
            external_message_id,
            message.to.raw(),
            sender.as_str(),
            message.content.as_str(),
            status,
            error_code,
        )
        .with_identities(message.recipient_identity, message.sender_identity);

        if let InsertOutcome::DuplicateExternalId(id) = self.store.create(record)? {
            // The gateway handed out an id we have already logged. The send
            // itself went through, so the caller still gets its receipt.
            tracing::warn!(message_id = %id, "gateway reused an already-logged message id");
        }
        Ok(())
    }

    fn record_batch(
        &self,
        messages: &[OutboundMessage],
        senders: &[SenderName],
        external_id_for: impl Fn(usize) -> Option<String>,
        status: DeliveryState,
        error_code: Option<i32>,
    ) -> Result<(), SendError> {
        for (index, (message, sender)) in messages.iter().zip(senders).enumerate() {
            let record = NewMessageLog::outbound(
                external_id_for(index + 1),
                message.to.raw(),
                sender.as_str(),
                message.content.as_str(),
                status,
                error_code,
            )
            .with_identities(message.recipient_identity, message.sender_identity);

            if let InsertOutcome::DuplicateExternalId(id) = self.store.create(record)? {
                tracing::warn!(message_id = %id, "batch record collided with an already-logged id");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::client::{BoxFuture, BulkOutcome, SendOutcome};
    use crate::domain::{BulkAck, SendAck};
    use crate::store::InMemoryLogStore;

    use super::*;

    enum ScriptedReply {
        Response {
            status: u16,
            body: &'static str,
            send_ack: Option<SendAck>,
            bulk_ack: Option<BulkAck>,
        },
        TransportDown,
    }

    struct FakeGateway {
        replies: Mutex<VecDeque<ScriptedReply>>,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl FakeGateway {
        fn new(replies: Vec<ScriptedReply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn next_reply(&self) -> ScriptedReply {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }

        fn sent_requests(&self) -> Vec<(String, String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl SmsGateway for FakeGateway {
        fn send<'a>(
            &'a self,
            request: &'a SendRequest,
        ) -> BoxFuture<'a, Result<SendOutcome, TransportFailure>> {
            Box::pin(async move {
                self.sent.lock().unwrap().push((
                    request.sender().as_str().to_owned(),
                    request.recipient().raw().to_owned(),
                    request.content().as_str().to_owned(),
                ));
                match self.next_reply() {
                    ScriptedReply::Response {
                        status,
                        body,
                        send_ack,
                        ..
                    } => Ok(SendOutcome {
                        response: GatewayResponse {
                            status,
                            headers: Vec::new(),
                            body: body.to_owned(),
                        },
                        ack: send_ack,
                    }),
                    ScriptedReply::TransportDown => {
                        Err(TransportFailure(Box::from("connection timed out")))
                    }
                }
            })
        }

        fn send_bulk<'a>(
            &'a self,
            _request: &'a BulkRequest,
        ) -> BoxFuture<'a, Result<BulkOutcome, TransportFailure>> {
            Box::pin(async move {
                match self.next_reply() {
                    ScriptedReply::Response {
                        status,
                        body,
                        bulk_ack,
                        ..
                    } => Ok(BulkOutcome {
                        response: GatewayResponse {
                            status,
                            headers: Vec::new(),
                            body: body.to_owned(),
                        },
                        ack: bulk_ack,
                    }),
                    ScriptedReply::TransportDown => {
                        Err(TransportFailure(Box::from("connection timed out")))
                    }
                }
            })
        }
    }

    fn accepted(id: &str) -> ScriptedReply {
        ScriptedReply::Response {
            status: 200,
            body: "{}",
            send_ack: Some(SendAck {
                id: Some(id.to_owned()),
            }),
            bulk_ack: None,
        }
    }

    fn dispatcher(
        replies: Vec<ScriptedReply>,
    ) -> (SendDispatcher, Arc<FakeGateway>, Arc<InMemoryLogStore>) {
        let gateway = Arc::new(FakeGateway::new(replies));
        let store = Arc::new(InMemoryLogStore::new());
        let dispatcher = SendDispatcher::new(
            gateway.clone(),
            store.clone(),
            SenderName::new("PureSMS").unwrap(),
        );
        (dispatcher, gateway, store)
    }

    fn message(to: &str, content: &str) -> OutboundMessage {
        OutboundMessage::new(
            PhoneNumber::new(to).unwrap(),
            MessageContent::new(content).unwrap(),
        )
    }

    #[tokio::test]
    async fn send_one_success_writes_single_sent_record() {
        let (dispatcher, gateway, store) = dispatcher(vec![accepted("abc123")]);

        let receipt = dispatcher
            .send_one(message("+15550001111", "Hello"))
            .await
            .unwrap();
        assert_eq!(receipt.message_id, "abc123");
        assert_eq!(receipt.status, DeliveryState::Sent);

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].external_message_id.as_deref(), Some("abc123"));
        assert_eq!(records[0].status, DeliveryState::Sent);
        assert_eq!(records[0].error_code, None);
        assert_eq!(records[0].recipient.as_deref(), Some("+15550001111"));
        assert_eq!(records[0].sender.as_deref(), Some("PureSMS"));

        // Default sender was applied to the request itself.
        assert_eq!(
            gateway.sent_requests(),
            vec![(
                "PureSMS".to_owned(),
                "+15550001111".to_owned(),
                "Hello".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn send_one_uses_from_override_and_identities() {
        let (dispatcher, gateway, store) = dispatcher(vec![accepted("abc124")]);

        let outbound = message("+15550001111", "Hello")
            .from_sender(SenderName::new("Acme").unwrap())
            .with_identities(Some(IdentityRef::new(42)), Some(IdentityRef::new(7)));
        dispatcher.send_one(outbound).await.unwrap();

        assert_eq!(gateway.sent_requests()[0].0, "Acme");
        let record = &store.records().unwrap()[0];
        assert_eq!(record.sender.as_deref(), Some("Acme"));
        assert_eq!(record.recipient_identity, Some(IdentityRef::new(42)));
        assert_eq!(record.sender_identity, Some(IdentityRef::new(7)));
    }

    #[tokio::test]
    async fn send_one_gateway_rejection_writes_failed_record_with_status_code() {
        let (dispatcher, _, store) = dispatcher(vec![ScriptedReply::Response {
            status: 422,
            body: r#"{"error": "invalid recipient"}"#,
            send_ack: None,
            bulk_ack: None,
        }]);

        let err = dispatcher
            .send_one(message("+15550001111", "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::GatewayRejected { status: 422, .. }));

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DeliveryState::Failed);
        assert_eq!(records[0].error_code, Some(422));
        assert_eq!(records[0].external_message_id, None);
    }

    #[tokio::test]
    async fn send_one_transport_failure_writes_failed_record_with_sentinel() {
        let (dispatcher, _, store) = dispatcher(vec![ScriptedReply::TransportDown]);

        let err = dispatcher
            .send_one(message("+15550001111", "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Transport(_)));

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DeliveryState::Failed);
        assert_eq!(records[0].error_code, Some(LOCAL_FAILURE_ERROR_CODE));
        assert_eq!(records[0].external_message_id, None);
        assert_eq!(records[0].content, "Hello");
    }

    #[tokio::test]
    async fn send_one_success_without_id_is_a_semantic_failure() {
        let (dispatcher, _, store) = dispatcher(vec![ScriptedReply::Response {
            status: 200,
            body: r#"{"accepted": true}"#,
            send_ack: Some(SendAck { id: None }),
            bulk_ack: None,
        }]);

        let err = dispatcher
            .send_one(message("+15550001111", "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::MissingAssignedId));

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DeliveryState::Failed);
        assert_eq!(records[0].error_code, None);
    }

    #[tokio::test]
    async fn send_batch_success_tags_every_record_with_batch_ordinal() {
        let (dispatcher, _, store) = dispatcher(vec![ScriptedReply::Response {
            status: 200,
            body: "{}",
            send_ack: None,
            bulk_ack: Some(BulkAck {
                batch_id: Some("batch-7".to_owned()),
                message_count: Some(2),
            }),
        }]);

        let receipt = dispatcher
            .send_batch(
                vec![message("+15550001111", "one"), message("+15550002222", "two")],
                None,
            )
            .await
            .unwrap();
        assert_eq!(receipt.batch_id, "batch-7");
        assert_eq!(receipt.message_count, 2);

        let records = store.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].external_message_id.as_deref(), Some("batch-7:1"));
        assert_eq!(records[1].external_message_id.as_deref(), Some("batch-7:2"));
        assert!(records.iter().all(|r| r.status == DeliveryState::Sent));
    }

    #[tokio::test]
    async fn send_batch_rejection_fails_every_record_uniformly() {
        let (dispatcher, _, store) = dispatcher(vec![ScriptedReply::Response {
            status: 500,
            body: "oops",
            send_ack: None,
            bulk_ack: None,
        }]);

        let err = dispatcher
            .send_batch(
                vec![message("+15550001111", "one"), message("+15550002222", "two")],
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::GatewayRejected { status: 500, .. }));

        let records = store.records().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == DeliveryState::Failed));
        assert!(records.iter().all(|r| r.error_code == Some(500)));
        assert!(records.iter().all(|r| r.external_message_id.is_none()));
    }

    #[tokio::test]
    async fn send_batch_transport_failure_records_sentinel_per_message() {
        let (dispatcher, _, store) = dispatcher(vec![ScriptedReply::TransportDown]);

        let err = dispatcher
            .send_batch(vec![message("+15550001111", "one")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Transport(_)));

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].error_code, Some(LOCAL_FAILURE_ERROR_CODE));
    }

    #[tokio::test]
    async fn send_batch_without_batch_id_is_a_semantic_failure() {
        let (dispatcher, _, store) = dispatcher(vec![ScriptedReply::Response {
            status: 200,
            body: "{}",
            send_ack: None,
            bulk_ack: Some(BulkAck::default()),
        }]);

        let err = dispatcher
            .send_batch(vec![message("+15550001111", "one")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::MissingAssignedId));
        assert_eq!(store.records().unwrap()[0].status, DeliveryState::Failed);
    }

    #[tokio::test]
    async fn send_batch_rejects_empty_input_before_calling_gateway() {
        let (dispatcher, gateway, store) = dispatcher(Vec::new());

        let err = dispatcher.send_batch(Vec::new(), None).await.unwrap_err();
        assert!(matches!(err, SendError::Validation(_)));
        assert!(store.is_empty().unwrap());
        assert!(gateway.sent_requests().is_empty());
    }
}
