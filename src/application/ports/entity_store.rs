use crate::application::ports::remote_service::PulledProject;
use crate::domain::entities::{FieldProject, SamplePlot, TreeMeasurement, TreePhoto};
use crate::domain::value_objects::EntityKind;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Photo ready for upload, paired with its parent tree's server identifier.
#[derive(Debug, Clone)]
pub struct PhotoUploadCandidate {
    pub photo: TreePhoto,
    pub tree_remote_id: String,
}

/// Durable, queryable storage for domain entities and photos. Reads never
/// touch the network; failures are local I/O errors only and are never
/// retried internally.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // Projects are server-authored; the pull phase mirrors them locally.
    async fn upsert_pulled_project(&self, pulled: &PulledProject) -> Result<(), AppError>;
    async fn get_project(&self, id: &str) -> Result<Option<FieldProject>, AppError>;
    async fn list_projects(&self) -> Result<Vec<FieldProject>, AppError>;

    async fn insert_plot(&self, plot: &SamplePlot) -> Result<(), AppError>;
    async fn update_plot(&self, plot: &SamplePlot) -> Result<(), AppError>;
    async fn get_plot(&self, id: &str) -> Result<Option<SamplePlot>, AppError>;
    async fn plots_by_project(&self, project_id: &str) -> Result<Vec<SamplePlot>, AppError>;

    async fn insert_tree(&self, tree: &TreeMeasurement) -> Result<(), AppError>;
    async fn update_tree(&self, tree: &TreeMeasurement) -> Result<(), AppError>;
    async fn get_tree(&self, id: &str) -> Result<Option<TreeMeasurement>, AppError>;
    /// Removes the measurement and its photo rows.
    async fn delete_tree(&self, id: &str) -> Result<(), AppError>;
    async fn trees_by_project(&self, project_id: &str) -> Result<Vec<TreeMeasurement>, AppError>;
    async fn trees_by_plot(&self, plot_id: &str) -> Result<Vec<TreeMeasurement>, AppError>;

    async fn insert_photo(&self, photo: &TreePhoto) -> Result<(), AppError>;
    async fn get_photo(&self, id: &str) -> Result<Option<TreePhoto>, AppError>;
    async fn photos_by_tree(&self, tree_id: &str) -> Result<Vec<TreePhoto>, AppError>;
    /// Photos whose parent tree already has a remote id and whose own
    /// status is pending or error, oldest first.
    async fn uploadable_photos(&self, limit: u32) -> Result<Vec<PhotoUploadCandidate>, AppError>;
    async fn set_photo_uploaded(
        &self,
        id: &str,
        remote_uri: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>;
    async fn set_photo_error(&self, id: &str) -> Result<(), AppError>;

    // Write-backs from the push phase.
    async fn set_remote_id(
        &self,
        kind: EntityKind,
        id: &str,
        remote_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>;
    async fn mark_synced(&self, kind: EntityKind, id: &str, at: DateTime<Utc>)
        -> Result<(), AppError>;

    // Global pull watermark.
    async fn last_synced_at(&self) -> Result<Option<DateTime<Utc>>, AppError>;
    async fn set_last_synced_at(&self, at: DateTime<Utc>) -> Result<(), AppError>;
}
