use crate::domain::value_objects::{EntityKind, Operation, OperationPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pending mutation awaiting transmission. Rows are append-only per
/// mutation; repeated edits of the same entity produce separate rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub id: i64,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub operation: Operation,
    pub payload: OperationPayload,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl QueuedOperation {
    /// A row that exhausted its retry budget is retained but excluded
    /// from automatic processing until explicitly reset.
    pub fn is_dead_lettered(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

#[derive(Debug, Clone)]
pub struct OperationDraft {
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub operation: Operation,
    pub payload: OperationPayload,
}

impl OperationDraft {
    pub fn new(
        entity_kind: EntityKind,
        entity_id: String,
        operation: Operation,
        payload: OperationPayload,
    ) -> Self {
        Self {
            entity_kind,
            entity_id,
            operation,
            payload,
        }
    }
}
