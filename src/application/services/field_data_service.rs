use crate::application::ports::{EntityStore, OperationQueue};
use crate::domain::entities::{
    FieldProject, NewPhoto, NewPlot, NewTree, OperationDraft, PlotStatus, PlotUpdate, SamplePlot,
    TreeMeasurement, TreePhoto, TreeUpdate,
};
use crate::domain::value_objects::{EntityKind, Operation, OperationPayload, SyncStatus};
use crate::shared::error::AppError;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// UI-facing entry point for field data. Every mutation writes the entity
/// row first and then appends the matching queue row; the crash window
/// between the two writes is accepted (low write rates, documented).
pub struct FieldDataService {
    store: Arc<dyn EntityStore>,
    queue: Arc<dyn OperationQueue>,
}

impl FieldDataService {
    pub fn new(store: Arc<dyn EntityStore>, queue: Arc<dyn OperationQueue>) -> Self {
        Self { store, queue }
    }

    async fn enqueue<T: Serialize>(
        &self,
        kind: EntityKind,
        entity_id: &str,
        operation: Operation,
        snapshot: &T,
    ) -> Result<i64, AppError> {
        let payload =
            OperationPayload::from_entity(snapshot).map_err(AppError::SerializationError)?;
        let id = self
            .queue
            .enqueue(OperationDraft::new(
                kind,
                entity_id.to_string(),
                operation,
                payload,
            ))
            .await?;
        debug!(kind = %kind, operation = %operation, entity_id, queue_id = id, "mutation enqueued");
        Ok(id)
    }

    // Projects are server-authored; locally they are read-only mirrors
    // maintained by the pull phase.

    pub async fn projects(&self) -> Result<Vec<FieldProject>, AppError> {
        self.store.list_projects().await
    }

    pub async fn project(&self, id: &str) -> Result<Option<FieldProject>, AppError> {
        self.store.get_project(id).await
    }

    pub async fn create_plot(&self, draft: NewPlot) -> Result<SamplePlot, AppError> {
        let now = Utc::now();
        let plot = SamplePlot {
            id: Uuid::new_v4().to_string(),
            remote_id: None,
            project_id: draft.project_id,
            plot_number: draft.plot_number,
            center_lat: draft.center_lat,
            center_lon: draft.center_lon,
            radius_m: draft.radius_m,
            shape: draft.shape,
            status: PlotStatus::Planned,
            sync_status: SyncStatus::Pending,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_plot(&plot).await?;
        self.enqueue(EntityKind::Plot, &plot.id, Operation::Create, &plot)
            .await?;

        Ok(plot)
    }

    pub async fn update_plot(&self, id: &str, update: PlotUpdate) -> Result<SamplePlot, AppError> {
        let mut plot = self
            .store
            .get_plot(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("sample plot {id}")))?;

        plot.apply(update);
        plot.updated_at = Utc::now();
        // Any local edit returns the row to pending, even if it was synced.
        plot.sync_status = SyncStatus::Pending;

        self.store.update_plot(&plot).await?;
        self.enqueue(EntityKind::Plot, id, Operation::Update, &plot)
            .await?;

        Ok(plot)
    }

    pub async fn plot(&self, id: &str) -> Result<Option<SamplePlot>, AppError> {
        self.store.get_plot(id).await
    }

    pub async fn plots_by_project(&self, project_id: &str) -> Result<Vec<SamplePlot>, AppError> {
        self.store.plots_by_project(project_id).await
    }

    pub async fn create_tree(&self, draft: NewTree) -> Result<TreeMeasurement, AppError> {
        let now = Utc::now();
        let tree = TreeMeasurement {
            id: Uuid::new_v4().to_string(),
            remote_id: None,
            project_id: draft.project_id,
            plot_id: draft.plot_id,
            tree_number: draft.tree_number,
            lat: draft.lat,
            lon: draft.lon,
            dbh_cm: draft.dbh_cm,
            height_m: draft.height_m,
            species_code: draft.species_code,
            health_status: draft.health_status,
            defects: draft.defects,
            sync_status: SyncStatus::Pending,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_tree(&tree).await?;
        self.enqueue(EntityKind::Tree, &tree.id, Operation::Create, &tree)
            .await?;

        Ok(tree)
    }

    pub async fn update_tree(
        &self,
        id: &str,
        update: TreeUpdate,
    ) -> Result<TreeMeasurement, AppError> {
        let mut tree = self
            .store
            .get_tree(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tree measurement {id}")))?;

        tree.apply(update);
        tree.updated_at = Utc::now();
        tree.sync_status = SyncStatus::Pending;

        self.store.update_tree(&tree).await?;
        self.enqueue(EntityKind::Tree, id, Operation::Update, &tree)
            .await?;

        Ok(tree)
    }

    /// Removes the measurement and its photos. The delete queue row is
    /// recorded before the local rows disappear, carrying the last known
    /// remote id in its snapshot.
    pub async fn delete_tree(&self, id: &str) -> Result<(), AppError> {
        let tree = self
            .store
            .get_tree(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tree measurement {id}")))?;

        self.enqueue(EntityKind::Tree, id, Operation::Delete, &tree)
            .await?;
        self.store.delete_tree(id).await?;

        Ok(())
    }

    pub async fn tree(&self, id: &str) -> Result<Option<TreeMeasurement>, AppError> {
        self.store.get_tree(id).await
    }

    pub async fn trees_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<TreeMeasurement>, AppError> {
        self.store.trees_by_project(project_id).await
    }

    pub async fn trees_by_plot(&self, plot_id: &str) -> Result<Vec<TreeMeasurement>, AppError> {
        self.store.trees_by_plot(plot_id).await
    }

    /// Photos are not queued: the upload phase selects pending photos
    /// directly once the parent tree has a remote id.
    pub async fn add_photo(&self, draft: NewPhoto) -> Result<TreePhoto, AppError> {
        self.store
            .get_tree(&draft.tree_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tree measurement {}", draft.tree_id)))?;

        let now = Utc::now();
        let photo = TreePhoto {
            id: Uuid::new_v4().to_string(),
            tree_id: draft.tree_id,
            local_uri: draft.local_uri,
            remote_uri: None,
            kind: draft.kind,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_photo(&photo).await?;
        Ok(photo)
    }

    pub async fn photos_by_tree(&self, tree_id: &str) -> Result<Vec<TreePhoto>, AppError> {
        self.store.photos_by_tree(tree_id).await
    }
}
