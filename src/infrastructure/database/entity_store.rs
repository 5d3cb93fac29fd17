use super::mappers::{
    datetime_to_millis, photo_candidate_from_row, photo_from_row, plot_from_row, project_from_row,
    tree_from_row,
};
use super::rows::{PhotoCandidateRow, ProjectRow, SamplePlotRow, TreeMeasurementRow, TreePhotoRow};
use super::ConnectionPool;
use crate::application::ports::entity_store::{EntityStore, PhotoUploadCandidate};
use crate::application::ports::remote_service::PulledProject;
use crate::domain::entities::{FieldProject, SamplePlot, TreeMeasurement, TreePhoto};
use crate::domain::value_objects::EntityKind;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub struct SqliteEntityStore {
    pool: ConnectionPool,
}

impl SqliteEntityStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    fn table_for(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Project => "projects",
            EntityKind::Plot => "sample_plots",
            EntityKind::Tree => "tree_measurements",
            EntityKind::Photo => "tree_photos",
        }
    }
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    async fn upsert_pulled_project(&self, pulled: &PulledProject) -> Result<(), AppError> {
        let now = datetime_to_millis(Utc::now());
        let updated_at = datetime_to_millis(pulled.updated_at);
        let start_date = pulled.start_date.map(|d| d.to_string());
        let end_date = pulled.end_date.map(|d| d.to_string());

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT id FROM projects WHERE remote_id = ?1")
                .bind(&pulled.remote_id)
                .fetch_optional(self.pool.get_pool())
                .await?;

        match existing {
            Some((id,)) => {
                // Last-write-wins: the pulled version overwrites any local
                // unsynced edit of the same remote entity.
                sqlx::query(
                    r#"
                    UPDATE projects
                    SET name = ?1, description = ?2, status = ?3,
                        start_date = ?4, end_date = ?5,
                        sync_status = 'synced', last_synced_at = ?6, updated_at = ?7
                    WHERE id = ?8
                    "#,
                )
                .bind(&pulled.name)
                .bind(&pulled.description)
                .bind(pulled.status.as_str())
                .bind(&start_date)
                .bind(&end_date)
                .bind(now)
                .bind(updated_at)
                .bind(&id)
                .execute(self.pool.get_pool())
                .await?;
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO projects (
                        id, remote_id, name, description, status,
                        start_date, end_date, sync_status, last_synced_at,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'synced', ?8, ?9, ?10)
                    "#,
                )
                .bind(&id)
                .bind(&pulled.remote_id)
                .bind(&pulled.name)
                .bind(&pulled.description)
                .bind(pulled.status.as_str())
                .bind(&start_date)
                .bind(&end_date)
                .bind(now)
                .bind(updated_at)
                .bind(updated_at)
                .execute(self.pool.get_pool())
                .await?;
            }
        }

        Ok(())
    }

    async fn get_project(&self, id: &str) -> Result<Option<FieldProject>, AppError> {
        let row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.map(project_from_row).transpose()
    }

    async fn list_projects(&self) -> Result<Vec<FieldProject>, AppError> {
        let rows = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects ORDER BY name ASC")
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.into_iter().map(project_from_row).collect()
    }

    async fn insert_plot(&self, plot: &SamplePlot) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sample_plots (
                id, remote_id, project_id, plot_number, center_lat, center_lon,
                radius_m, shape, status, sync_status, last_synced_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&plot.id)
        .bind(&plot.remote_id)
        .bind(&plot.project_id)
        .bind(plot.plot_number as i64)
        .bind(plot.center_lat)
        .bind(plot.center_lon)
        .bind(plot.radius_m)
        .bind(plot.shape.as_str())
        .bind(plot.status.as_str())
        .bind(plot.sync_status.as_str())
        .bind(plot.last_synced_at.map(datetime_to_millis))
        .bind(datetime_to_millis(plot.created_at))
        .bind(datetime_to_millis(plot.updated_at))
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn update_plot(&self, plot: &SamplePlot) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sample_plots
            SET plot_number = ?1, center_lat = ?2, center_lon = ?3, radius_m = ?4,
                shape = ?5, status = ?6, sync_status = ?7, last_synced_at = ?8,
                updated_at = ?9
            WHERE id = ?10
            "#,
        )
        .bind(plot.plot_number as i64)
        .bind(plot.center_lat)
        .bind(plot.center_lon)
        .bind(plot.radius_m)
        .bind(plot.shape.as_str())
        .bind(plot.status.as_str())
        .bind(plot.sync_status.as_str())
        .bind(plot.last_synced_at.map(datetime_to_millis))
        .bind(datetime_to_millis(plot.updated_at))
        .bind(&plot.id)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn get_plot(&self, id: &str) -> Result<Option<SamplePlot>, AppError> {
        let row = sqlx::query_as::<_, SamplePlotRow>("SELECT * FROM sample_plots WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.map(plot_from_row).transpose()
    }

    async fn plots_by_project(&self, project_id: &str) -> Result<Vec<SamplePlot>, AppError> {
        let rows = sqlx::query_as::<_, SamplePlotRow>(
            "SELECT * FROM sample_plots WHERE project_id = ?1 ORDER BY plot_number ASC",
        )
        .bind(project_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(plot_from_row).collect()
    }

    async fn insert_tree(&self, tree: &TreeMeasurement) -> Result<(), AppError> {
        let defects = serde_json::to_string(&tree.defects)
            .map_err(|e| AppError::SerializationError(format!("defects: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO tree_measurements (
                id, remote_id, project_id, plot_id, tree_number, lat, lon,
                dbh_cm, height_m, species_code, health_status, defects,
                sync_status, last_synced_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&tree.id)
        .bind(&tree.remote_id)
        .bind(&tree.project_id)
        .bind(&tree.plot_id)
        .bind(tree.tree_number as i64)
        .bind(tree.lat)
        .bind(tree.lon)
        .bind(tree.dbh_cm)
        .bind(tree.height_m)
        .bind(&tree.species_code)
        .bind(tree.health_status.as_str())
        .bind(&defects)
        .bind(tree.sync_status.as_str())
        .bind(tree.last_synced_at.map(datetime_to_millis))
        .bind(datetime_to_millis(tree.created_at))
        .bind(datetime_to_millis(tree.updated_at))
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn update_tree(&self, tree: &TreeMeasurement) -> Result<(), AppError> {
        let defects = serde_json::to_string(&tree.defects)
            .map_err(|e| AppError::SerializationError(format!("defects: {e}")))?;

        sqlx::query(
            r#"
            UPDATE tree_measurements
            SET plot_id = ?1, tree_number = ?2, lat = ?3, lon = ?4, dbh_cm = ?5,
                height_m = ?6, species_code = ?7, health_status = ?8, defects = ?9,
                sync_status = ?10, last_synced_at = ?11, updated_at = ?12
            WHERE id = ?13
            "#,
        )
        .bind(&tree.plot_id)
        .bind(tree.tree_number as i64)
        .bind(tree.lat)
        .bind(tree.lon)
        .bind(tree.dbh_cm)
        .bind(tree.height_m)
        .bind(&tree.species_code)
        .bind(tree.health_status.as_str())
        .bind(&defects)
        .bind(tree.sync_status.as_str())
        .bind(tree.last_synced_at.map(datetime_to_millis))
        .bind(datetime_to_millis(tree.updated_at))
        .bind(&tree.id)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn get_tree(&self, id: &str) -> Result<Option<TreeMeasurement>, AppError> {
        let row =
            sqlx::query_as::<_, TreeMeasurementRow>("SELECT * FROM tree_measurements WHERE id = ?1")
                .bind(id)
                .fetch_optional(self.pool.get_pool())
                .await?;

        row.map(tree_from_row).transpose()
    }

    async fn delete_tree(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tree_photos WHERE tree_id = ?1")
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;
        sqlx::query("DELETE FROM tree_measurements WHERE id = ?1")
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    async fn trees_by_project(&self, project_id: &str) -> Result<Vec<TreeMeasurement>, AppError> {
        let rows = sqlx::query_as::<_, TreeMeasurementRow>(
            "SELECT * FROM tree_measurements WHERE project_id = ?1 ORDER BY tree_number ASC",
        )
        .bind(project_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(tree_from_row).collect()
    }

    async fn trees_by_plot(&self, plot_id: &str) -> Result<Vec<TreeMeasurement>, AppError> {
        let rows = sqlx::query_as::<_, TreeMeasurementRow>(
            "SELECT * FROM tree_measurements WHERE plot_id = ?1 ORDER BY tree_number ASC",
        )
        .bind(plot_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(tree_from_row).collect()
    }

    async fn insert_photo(&self, photo: &TreePhoto) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO tree_photos (
                id, tree_id, local_uri, remote_uri, kind, sync_status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&photo.id)
        .bind(&photo.tree_id)
        .bind(&photo.local_uri)
        .bind(&photo.remote_uri)
        .bind(photo.kind.as_str())
        .bind(photo.sync_status.as_str())
        .bind(datetime_to_millis(photo.created_at))
        .bind(datetime_to_millis(photo.updated_at))
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn get_photo(&self, id: &str) -> Result<Option<TreePhoto>, AppError> {
        let row = sqlx::query_as::<_, TreePhotoRow>("SELECT * FROM tree_photos WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.map(photo_from_row).transpose()
    }

    async fn photos_by_tree(&self, tree_id: &str) -> Result<Vec<TreePhoto>, AppError> {
        let rows = sqlx::query_as::<_, TreePhotoRow>(
            "SELECT * FROM tree_photos WHERE tree_id = ?1 ORDER BY created_at ASC",
        )
        .bind(tree_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(photo_from_row).collect()
    }

    async fn uploadable_photos(&self, limit: u32) -> Result<Vec<PhotoUploadCandidate>, AppError> {
        let rows = sqlx::query_as::<_, PhotoCandidateRow>(
            r#"
            SELECT p.*, t.remote_id AS tree_remote_id
            FROM tree_photos p
            JOIN tree_measurements t ON t.id = p.tree_id
            WHERE t.remote_id IS NOT NULL
              AND p.sync_status IN ('pending', 'error')
            ORDER BY p.created_at ASC, p.id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter().map(photo_candidate_from_row).collect()
    }

    async fn set_photo_uploaded(
        &self,
        id: &str,
        remote_uri: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE tree_photos
            SET remote_uri = ?1, sync_status = 'synced', updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(remote_uri)
        .bind(datetime_to_millis(at))
        .bind(id)
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    async fn set_photo_error(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE tree_photos SET sync_status = 'error' WHERE id = ?1")
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    async fn set_remote_id(
        &self,
        kind: EntityKind,
        id: &str,
        remote_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE {} SET remote_id = ?1, sync_status = 'synced', last_synced_at = ?2 WHERE id = ?3",
            Self::table_for(kind)
        );

        sqlx::query(&sql)
            .bind(remote_id)
            .bind(datetime_to_millis(at))
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    async fn mark_synced(
        &self,
        kind: EntityKind,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE {} SET sync_status = 'synced', last_synced_at = ?1 WHERE id = ?2",
            Self::table_for(kind)
        );

        sqlx::query(&sql)
            .bind(datetime_to_millis(at))
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    async fn last_synced_at(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let row: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT last_synced_at FROM sync_state WHERE id = 1")
                .fetch_optional(self.pool.get_pool())
                .await?;

        Ok(row
            .and_then(|(millis,)| millis)
            .map(super::mappers::millis_to_datetime))
    }

    async fn set_last_synced_at(&self, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sync_state (id, last_synced_at) VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET last_synced_at = excluded.last_synced_at
            "#,
        )
        .bind(datetime_to_millis(at))
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{HealthStatus, PlotShape, PlotStatus, ProjectStatus};
    use crate::domain::value_objects::{PhotoKind, SyncStatus};

    async fn setup_store() -> SqliteEntityStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        SqliteEntityStore::new(pool)
    }

    fn sample_tree(id: &str, project_id: &str) -> TreeMeasurement {
        let now = Utc::now();
        TreeMeasurement {
            id: id.to_string(),
            remote_id: None,
            project_id: project_id.to_string(),
            plot_id: None,
            tree_number: 1,
            lat: 61.492,
            lon: 23.752,
            dbh_cm: 32.5,
            height_m: Some(24.0),
            species_code: "PISY".to_string(),
            health_status: HealthStatus::Healthy,
            defects: vec!["fork".to_string()],
            sync_status: SyncStatus::Pending,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_photo(id: &str, tree_id: &str) -> TreePhoto {
        let now = Utc::now();
        TreePhoto {
            id: id.to_string(),
            tree_id: tree_id.to_string(),
            local_uri: format!("/data/photos/{id}.jpg"),
            remote_uri: None,
            kind: PhotoKind::Trunk,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn tree_round_trip_preserves_fields() {
        let store = setup_store().await;
        let tree = sample_tree("t1", "p1");

        store.insert_tree(&tree).await.unwrap();
        let loaded = store.get_tree("t1").await.unwrap().unwrap();

        assert_eq!(loaded.species_code, "PISY");
        assert_eq!(loaded.defects, vec!["fork".to_string()]);
        assert_eq!(loaded.sync_status, SyncStatus::Pending);
        assert_eq!(loaded.health_status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn delete_tree_cascades_photos() {
        let store = setup_store().await;
        store.insert_tree(&sample_tree("t1", "p1")).await.unwrap();
        store.insert_photo(&sample_photo("ph1", "t1")).await.unwrap();

        store.delete_tree("t1").await.unwrap();

        assert!(store.get_tree("t1").await.unwrap().is_none());
        assert!(store.photos_by_tree("t1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_pulled_project_inserts_then_overwrites() {
        let store = setup_store().await;
        let pulled = PulledProject {
            remote_id: "R-77".to_string(),
            name: "North stand survey".to_string(),
            description: None,
            status: ProjectStatus::Active,
            start_date: None,
            end_date: None,
            updated_at: Utc::now(),
        };

        store.upsert_pulled_project(&pulled).await.unwrap();
        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].sync_status, SyncStatus::Synced);

        let renamed = PulledProject {
            name: "North stand survey (rev 2)".to_string(),
            ..pulled
        };
        store.upsert_pulled_project(&renamed).await.unwrap();

        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "North stand survey (rev 2)");
    }

    #[tokio::test]
    async fn uploadable_photos_requires_parent_remote_id() {
        let store = setup_store().await;
        store.insert_tree(&sample_tree("t1", "p1")).await.unwrap();
        store.insert_photo(&sample_photo("ph1", "t1")).await.unwrap();

        // Parent has no remote id yet.
        assert!(store.uploadable_photos(10).await.unwrap().is_empty());

        store
            .set_remote_id(EntityKind::Tree, "t1", "R1", Utc::now())
            .await
            .unwrap();

        let batch = store.uploadable_photos(10).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].tree_remote_id, "R1");
    }

    #[tokio::test]
    async fn uploadable_photos_includes_error_status_and_honors_limit() {
        let store = setup_store().await;
        store.insert_tree(&sample_tree("t1", "p1")).await.unwrap();
        store
            .set_remote_id(EntityKind::Tree, "t1", "R1", Utc::now())
            .await
            .unwrap();

        for i in 0..12 {
            store
                .insert_photo(&sample_photo(&format!("ph{i}"), "t1"))
                .await
                .unwrap();
        }
        store.set_photo_error("ph0").await.unwrap();

        let batch = store.uploadable_photos(10).await.unwrap();
        assert_eq!(batch.len(), 10);
        assert!(batch.iter().any(|c| c.photo.id == "ph0"));
    }

    #[tokio::test]
    async fn photo_upload_write_back_marks_synced() {
        let store = setup_store().await;
        store.insert_tree(&sample_tree("t1", "p1")).await.unwrap();
        store.insert_photo(&sample_photo("ph1", "t1")).await.unwrap();

        store
            .set_photo_uploaded("ph1", "https://cdn.example.com/ph1.jpg", Utc::now())
            .await
            .unwrap();

        let photo = store.get_photo("ph1").await.unwrap().unwrap();
        assert_eq!(photo.sync_status, SyncStatus::Synced);
        assert_eq!(
            photo.remote_uri.as_deref(),
            Some("https://cdn.example.com/ph1.jpg")
        );
    }

    #[tokio::test]
    async fn watermark_round_trip() {
        let store = setup_store().await;
        assert!(store.last_synced_at().await.unwrap().is_none());

        let at = Utc::now();
        store.set_last_synced_at(at).await.unwrap();

        let stored = store.last_synced_at().await.unwrap().unwrap();
        assert_eq!(stored.timestamp_millis(), at.timestamp_millis());
    }

    #[tokio::test]
    async fn plot_update_persists_merged_fields() {
        let store = setup_store().await;
        let now = Utc::now();
        let mut plot = SamplePlot {
            id: "pl1".to_string(),
            remote_id: None,
            project_id: "p1".to_string(),
            plot_number: 4,
            center_lat: 61.0,
            center_lon: 23.0,
            radius_m: 12.6,
            shape: PlotShape::Circular,
            status: PlotStatus::Planned,
            sync_status: SyncStatus::Pending,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_plot(&plot).await.unwrap();

        plot.status = PlotStatus::Completed;
        plot.radius_m = 15.0;
        store.update_plot(&plot).await.unwrap();

        let loaded = store.get_plot("pl1").await.unwrap().unwrap();
        assert_eq!(loaded.status, PlotStatus::Completed);
        assert!((loaded.radius_m - 15.0).abs() < f64::EPSILON);
    }
}
