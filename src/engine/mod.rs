//! Engine layer: outbound dispatch and webhook reconciliation over the
//! gateway, store, and identity seams.

mod dispatcher;
mod identity;
mod webhook;

pub use dispatcher::{BatchReceipt, OutboundMessage, SendDispatcher, SendError, SendReceipt};
pub use identity::{IdentityLookupError, IdentityResolver, NullIdentityResolver};
pub use webhook::{WebhookError, WebhookOutcome, WebhookProcessor};
