use super::mappers::{datetime_to_millis, queued_operation_from_row};
use super::rows::QueuedOperationRow;
use super::ConnectionPool;
use crate::application::ports::operation_queue::OperationQueue;
use crate::domain::entities::{OperationDraft, QueuedOperation};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

pub struct SqliteOperationQueue {
    pool: ConnectionPool,
}

impl SqliteOperationQueue {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OperationQueue for SqliteOperationQueue {
    async fn enqueue(&self, draft: OperationDraft) -> Result<i64, AppError> {
        let payload = serde_json::to_string(draft.payload.as_json())
            .map_err(|e| AppError::SerializationError(e.to_string()))?;
        let created_at = datetime_to_millis(Utc::now());

        let result = sqlx::query(
            r#"
            INSERT INTO sync_queue (
                entity_kind, entity_id, operation, payload,
                attempts, max_attempts, created_at
            ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)
            "#,
        )
        .bind(draft.entity_kind.as_str())
        .bind(&draft.entity_id)
        .bind(draft.operation.as_str())
        .bind(&payload)
        .bind(DEFAULT_MAX_ATTEMPTS as i64)
        .bind(created_at)
        .execute(self.pool.get_pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn ready_batch(&self) -> Result<Vec<QueuedOperation>, AppError> {
        let rows = sqlx::query_as::<_, QueuedOperationRow>(
            r#"
            SELECT * FROM sync_queue
            WHERE attempts < max_attempts
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(queued_operation_from_row).collect()
    }

    async fn record_outcome(
        &self,
        id: i64,
        success: bool,
        error: Option<&str>,
    ) -> Result<(), AppError> {
        if success {
            sqlx::query("DELETE FROM sync_queue WHERE id = ?1")
                .bind(id)
                .execute(self.pool.get_pool())
                .await?;
        } else {
            sqlx::query(
                r#"
                UPDATE sync_queue
                SET attempts = attempts + 1, error_message = ?1, last_attempt_at = ?2
                WHERE id = ?3
                "#,
            )
            .bind(error)
            .bind(datetime_to_millis(Utc::now()))
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;
        }

        Ok(())
    }

    async fn pending_count(&self) -> Result<u64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sync_queue WHERE attempts < max_attempts")
                .fetch_one(self.pool.get_pool())
                .await?;

        Ok(count as u64)
    }

    async fn dead_letter_count(&self) -> Result<u64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sync_queue WHERE attempts >= max_attempts")
                .fetch_one(self.pool.get_pool())
                .await?;

        Ok(count as u64)
    }

    async fn reset_dead_letters(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_queue
            SET attempts = 0, error_message = NULL
            WHERE attempts >= max_attempts
            "#,
        )
        .execute(self.pool.get_pool())
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{EntityKind, Operation, OperationPayload};

    async fn setup_queue() -> SqliteOperationQueue {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        SqliteOperationQueue::new(pool)
    }

    fn draft(entity_id: &str, operation: Operation) -> OperationDraft {
        OperationDraft::new(
            EntityKind::Tree,
            entity_id.to_string(),
            operation,
            OperationPayload::new(serde_json::json!({ "id": entity_id })).unwrap(),
        )
    }

    #[tokio::test]
    async fn enqueue_starts_with_zero_attempts() {
        let queue = setup_queue().await;
        queue.enqueue(draft("t1", Operation::Create)).await.unwrap();

        let batch = queue.ready_batch().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].attempts, 0);
        assert_eq!(batch[0].max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(batch[0].operation, Operation::Create);
    }

    #[tokio::test]
    async fn success_outcome_removes_row() {
        let queue = setup_queue().await;
        let id = queue.enqueue(draft("t1", Operation::Create)).await.unwrap();

        queue.record_outcome(id, true, None).await.unwrap();

        assert!(queue.ready_batch().await.unwrap().is_empty());
        assert_eq!(queue.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failure_outcome_increments_attempts_and_preserves_payload() {
        let queue = setup_queue().await;
        let id = queue.enqueue(draft("t1", Operation::Update)).await.unwrap();

        queue
            .record_outcome(id, false, Some("HTTP 500"))
            .await
            .unwrap();

        let batch = queue.ready_batch().await.unwrap();
        assert_eq!(batch[0].attempts, 1);
        assert_eq!(batch[0].error_message.as_deref(), Some("HTTP 500"));
        assert!(batch[0].last_attempt_at.is_some());
        assert_eq!(batch[0].payload.as_json()["id"], "t1");
    }

    #[tokio::test]
    async fn exhausted_rows_leave_the_ready_batch() {
        let queue = setup_queue().await;
        let id = queue.enqueue(draft("t1", Operation::Create)).await.unwrap();

        for _ in 0..DEFAULT_MAX_ATTEMPTS {
            queue
                .record_outcome(id, false, Some("server error"))
                .await
                .unwrap();
        }

        assert!(queue.ready_batch().await.unwrap().is_empty());
        assert_eq!(queue.pending_count().await.unwrap(), 0);
        assert_eq!(queue.dead_letter_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn reset_dead_letters_restores_eligibility() {
        let queue = setup_queue().await;
        let id = queue.enqueue(draft("t1", Operation::Create)).await.unwrap();
        for _ in 0..DEFAULT_MAX_ATTEMPTS {
            queue.record_outcome(id, false, Some("boom")).await.unwrap();
        }

        let reset = queue.reset_dead_letters().await.unwrap();
        assert_eq!(reset, 1);

        let batch = queue.ready_batch().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].attempts, 0);
        assert!(batch[0].error_message.is_none());
    }

    #[tokio::test]
    async fn ready_batch_is_fifo_across_entities() {
        let queue = setup_queue().await;
        queue.enqueue(draft("t1", Operation::Create)).await.unwrap();
        queue.enqueue(draft("t2", Operation::Create)).await.unwrap();
        queue.enqueue(draft("t1", Operation::Update)).await.unwrap();

        let batch = queue.ready_batch().await.unwrap();
        let ids: Vec<&str> = batch.iter().map(|op| op.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t1"]);
        assert!(batch.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn repeated_edits_do_not_coalesce() {
        let queue = setup_queue().await;
        queue.enqueue(draft("t1", Operation::Update)).await.unwrap();
        queue.enqueue(draft("t1", Operation::Update)).await.unwrap();

        assert_eq!(queue.pending_count().await.unwrap(), 2);
    }
}
