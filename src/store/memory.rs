use std::sync::Mutex;

use chrono::Utc;

use crate::domain::{MessageLog, NewMessageLog, StatusUpdate};
use crate::store::{InsertOutcome, MessageLogStore, StoreError};

#[derive(Debug, Default)]
/// Mutex-guarded in-memory store enforcing the external-id uniqueness
/// constraint. Ids are assigned from a monotonically increasing counter.
pub struct InMemoryLogStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    records: Vec<MessageLog>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records, in creation order.
    pub fn records(&self) -> Result<Vec<MessageLog>, StoreError> {
        Ok(self.lock()?.records.clone())
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.records.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("log store mutex poisoned".to_owned()))
    }
}

impl MessageLogStore for InMemoryLogStore {
    fn create(&self, record: NewMessageLog) -> Result<InsertOutcome, StoreError> {
        let mut state = self.lock()?;

        if let Some(external_id) = record.external_message_id.as_deref() {
            let duplicate = state
                .records
                .iter()
                .any(|existing| existing.external_message_id.as_deref() == Some(external_id));
            if duplicate {
                return Ok(InsertOutcome::DuplicateExternalId(external_id.to_owned()));
            }
        }

        state.next_id += 1;
        let now = Utc::now();
        let stored = MessageLog {
            id: state.next_id,
            external_message_id: record.external_message_id,
            recipient: record.recipient,
            sender: record.sender,
            recipient_identity: record.recipient_identity,
            sender_identity: record.sender_identity,
            content: record.content,
            status: record.status,
            error_code: record.error_code,
            processed_at: record.processed_at,
            delivered_at: record.delivered_at,
            created_at: now,
            updated_at: now,
        };
        state.records.push(stored.clone());
        Ok(InsertOutcome::Created(stored))
    }

    fn apply_status(&self, external_id: &str, update: StatusUpdate) -> Result<usize, StoreError> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let mut touched = 0;
        for record in state
            .records
            .iter_mut()
            .filter(|record| record.external_message_id.as_deref() == Some(external_id))
        {
            record.status = update.status;
            record.error_code = update.error_code;
            record.processed_at = update.processed_at;
            record.delivered_at = update.delivered_at;
            record.updated_at = now;
            touched += 1;
        }
        Ok(touched)
    }

    fn find_by_external_id(&self, external_id: &str) -> Result<Option<MessageLog>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .records
            .iter()
            .find(|record| record.external_message_id.as_deref() == Some(external_id))
            .cloned())
    }
}
