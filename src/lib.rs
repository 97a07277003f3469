//! Typed Rust client and message-log reconciliation engine for the PureSMS
//! HTTP API.
//!
//! The crate is layered: a domain layer of strong types, a transport layer
//! for wire-format quirks, a client layer issuing the authenticated gateway
//! calls, a store seam for the persisted message log, and an engine layer
//! tying them together. The engine covers both directions of traffic:
//! outbound sends through [`SendDispatcher`] (every attempt leaves exactly
//! one log record) and asynchronous gateway callbacks through
//! [`WebhookProcessor`] (delivery statuses reconcile existing records,
//! inbound messages create new ones, duplicates are idempotent no-ops).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use puresms::{
//!     ApiKey, GatewayClient, InMemoryLogStore, MessageContent, NullIdentityResolver,
//!     OutboundMessage, PhoneNumber, SendDispatcher, SenderName, WebhookProcessor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Arc::new(GatewayClient::new(ApiKey::new("...")?));
//!     let store = Arc::new(InMemoryLogStore::new());
//!     let dispatcher = SendDispatcher::new(
//!         gateway,
//!         store.clone(),
//!         SenderName::new("PureSMS")?,
//!     );
//!
//!     let receipt = dispatcher
//!         .send_one(OutboundMessage::new(
//!             PhoneNumber::new("+15550001111")?,
//!             MessageContent::new("Hello")?,
//!         ))
//!         .await?;
//!     println!("sent: {}", receipt.message_id);
//!
//!     // Webhook deliveries from the provider go through the processor.
//!     let processor = WebhookProcessor::new(store, Arc::new(NullIdentityResolver));
//!     let payload = serde_json::json!({
//!         "data": { "MessageId": receipt.message_id, "DeliveryStatus": 7 }
//!     });
//!     let outcome = processor.handle(&payload)?;
//!     println!("{}", outcome.ack_message());
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
pub mod engine;
pub mod store;
mod transport;

pub use client::{
    BulkOutcome, GatewayClient, GatewayClientBuilder, GatewayResponse, SendOutcome, SmsGateway,
    TransportFailure,
};
pub use domain::{
    ApiKey, BulkAck, BulkRequest, DeliveryState, EndpointUrl, IdentityRef,
    LOCAL_FAILURE_ERROR_CODE, MessageContent, MessageLog, NewMessageLog, PhoneNumber, SendAck,
    SendRequest, SenderName, StatusUpdate, ValidationError, map_delivery_code, normalize_timestamp,
};
pub use engine::{
    BatchReceipt, IdentityLookupError, IdentityResolver, NullIdentityResolver, OutboundMessage,
    SendDispatcher, SendError, SendReceipt, WebhookError, WebhookOutcome, WebhookProcessor,
};
pub use store::{InMemoryLogStore, InsertOutcome, MessageLogStore, StoreError};
