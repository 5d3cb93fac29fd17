use crate::shared::error::AppError;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub bearer_token: String,
}

/// Source of the signed-in crew member's credential. Owned by the host
/// application's auth layer.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session(&self) -> Result<Option<Session>, AppError>;
}
