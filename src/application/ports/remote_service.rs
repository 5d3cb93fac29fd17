use crate::domain::entities::{ProjectStatus, SamplePlot, TreeMeasurement};
use crate::domain::value_objects::PhotoKind;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Project record as returned by the server's pull endpoint.
#[derive(Debug, Clone)]
pub struct PulledProject {
    pub remote_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub tree_remote_id: String,
    pub kind: PhotoKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// HTTP contract consumed by the sync pass. Create calls return the
/// server-assigned identifier; a 401 surfaces as `AppError::Unauthorized`
/// and is never retried here.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn fetch_projects(
        &self,
        token: &str,
        assigned_to: &str,
        updated_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<PulledProject>, AppError>;

    async fn create_tree(&self, token: &str, tree: &TreeMeasurement) -> Result<String, AppError>;
    async fn update_tree(
        &self,
        token: &str,
        remote_id: &str,
        tree: &TreeMeasurement,
    ) -> Result<(), AppError>;
    async fn delete_tree(&self, token: &str, remote_id: &str) -> Result<(), AppError>;

    async fn create_plot(&self, token: &str, plot: &SamplePlot) -> Result<String, AppError>;
    async fn update_plot(
        &self,
        token: &str,
        remote_id: &str,
        plot: &SamplePlot,
    ) -> Result<(), AppError>;

    /// Multipart upload; returns the stored file's URL.
    async fn upload_photo(&self, token: &str, upload: &PhotoUpload) -> Result<String, AppError>;
}
