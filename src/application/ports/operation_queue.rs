use crate::domain::entities::{OperationDraft, QueuedOperation};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, ordered log of pending mutations. Append-only per mutation:
/// the queue never coalesces rows for the same entity.
#[async_trait]
pub trait OperationQueue: Send + Sync {
    /// Appends a new row with `attempts = 0` and returns its id.
    async fn enqueue(&self, draft: OperationDraft) -> Result<i64, AppError>;

    /// All rows with `attempts < max_attempts`, global FIFO by creation
    /// time across entities.
    async fn ready_batch(&self) -> Result<Vec<QueuedOperation>, AppError>;

    /// Deletes the row on success; on failure increments `attempts` by
    /// exactly one and records the message and timestamp.
    async fn record_outcome(
        &self,
        id: i64,
        success: bool,
        error: Option<&str>,
    ) -> Result<(), AppError>;

    async fn pending_count(&self) -> Result<u64, AppError>;
    async fn dead_letter_count(&self) -> Result<u64, AppError>;

    /// Zeroes `attempts` and clears `error_message` on dead-lettered rows,
    /// returning how many rows became eligible again.
    async fn reset_dead_letters(&self) -> Result<u64, AppError>;
}
