//! Persistence abstraction over message-log records.
//!
//! The engine only needs three operations: create (under the external-id
//! uniqueness constraint), update-by-external-id, and lookup. A relational
//! backing store implements [`MessageLogStore`]; [`InMemoryLogStore`] covers
//! tests and embedders without a database.

mod memory;

pub use memory::InMemoryLogStore;

use crate::domain::{MessageLog, NewMessageLog, StatusUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store failed in a way the engine cannot absorb.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq)]
/// Result of a create attempt.
pub enum InsertOutcome {
    /// Record created; carries the stored row with assigned id/timestamps.
    Created(MessageLog),
    /// A record with the same non-null external id already exists. The racing
    /// duplicate-webhook case resolves here, not with application locks.
    DuplicateExternalId(String),
}

/// Store seam consumed by the dispatch and webhook engines.
///
/// Implementations must enforce: no two records share a non-null
/// `external_message_id`. Operations are blocking; the engine never holds a
/// record across a suspension point.
pub trait MessageLogStore: Send + Sync {
    /// Insert a new record, rejecting duplicates of a non-null external id as
    /// [`InsertOutcome::DuplicateExternalId`] rather than an error.
    fn create(&self, record: NewMessageLog) -> Result<InsertOutcome, StoreError>;

    /// Apply a status update to every record whose `external_message_id`
    /// equals `external_id`; returns the number of records touched.
    fn apply_status(&self, external_id: &str, update: StatusUpdate) -> Result<usize, StoreError>;

    /// Look up a record by its external id.
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<MessageLog>, StoreError>;
}
