use async_trait::async_trait;
use chrono::{DateTime, Utc};
use silva_field::application::ports::{
    PhotoUpload, PulledProject, RemoteService, Session, SessionProvider,
};
use silva_field::domain::entities::{
    HealthStatus, NewPhoto, NewPlot, NewTree, PassOutcome, PlotShape, ProjectStatus, SkipReason,
};
use silva_field::domain::value_objects::{ConnectionStatus, PhotoKind, SyncStatus, Transport};
use silva_field::shared::config::{AppConfig, DatabaseConfig};
use silva_field::{AppError, AppState, SamplePlot, TreeMeasurement};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Remote double that hands out sequential ids and records every call in
/// order, so push FIFO ordering is observable.
#[derive(Default)]
struct RecordingRemote {
    log: Mutex<Vec<String>>,
    fail_creates: AtomicBool,
    next_id: AtomicU64,
    last_updated_after: Mutex<Option<DateTime<Utc>>>,
    projects: Mutex<Vec<PulledProject>>,
}

impl RecordingRemote {
    fn log_call(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn mint_id(&self) -> String {
        format!("R{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn serve_project(&self, project: PulledProject) {
        self.projects.lock().unwrap().push(project);
    }
}

#[async_trait]
impl RemoteService for RecordingRemote {
    async fn fetch_projects(
        &self,
        _token: &str,
        _assigned_to: &str,
        updated_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<PulledProject>, AppError> {
        self.log_call("fetch_projects".to_string());
        *self.last_updated_after.lock().unwrap() = updated_after;
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn create_tree(&self, _token: &str, tree: &TreeMeasurement) -> Result<String, AppError> {
        self.log_call(format!("create_tree:{}", tree.id));
        if self.fail_creates.load(Ordering::Relaxed) {
            return Err(AppError::Network("HTTP 503: service unavailable".into()));
        }
        Ok(self.mint_id())
    }

    async fn update_tree(
        &self,
        _token: &str,
        remote_id: &str,
        _tree: &TreeMeasurement,
    ) -> Result<(), AppError> {
        self.log_call(format!("update_tree:{remote_id}"));
        Ok(())
    }

    async fn delete_tree(&self, _token: &str, remote_id: &str) -> Result<(), AppError> {
        self.log_call(format!("delete_tree:{remote_id}"));
        Ok(())
    }

    async fn create_plot(&self, _token: &str, plot: &SamplePlot) -> Result<String, AppError> {
        self.log_call(format!("create_plot:{}", plot.id));
        if self.fail_creates.load(Ordering::Relaxed) {
            return Err(AppError::Network("HTTP 503: service unavailable".into()));
        }
        Ok(self.mint_id())
    }

    async fn update_plot(
        &self,
        _token: &str,
        remote_id: &str,
        _plot: &SamplePlot,
    ) -> Result<(), AppError> {
        self.log_call(format!("update_plot:{remote_id}"));
        Ok(())
    }

    async fn upload_photo(&self, _token: &str, upload: &PhotoUpload) -> Result<String, AppError> {
        self.log_call(format!("upload_photo:{}", upload.tree_remote_id));
        Ok(format!(
            "https://cdn.silva.example.com/{}/{}",
            upload.tree_remote_id, upload.file_name
        ))
    }
}

struct StaticSession;

#[async_trait]
impl SessionProvider for StaticSession {
    async fn session(&self) -> Result<Option<Session>, AppError> {
        Ok(Some(Session {
            user_id: "crew-7".to_string(),
            bearer_token: "token-abc".to_string(),
        }))
    }
}

fn config_for(dir: &TempDir) -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            url: format!(
                "sqlite://{}?mode=rwc",
                dir.path().join("field.db").display()
            ),
            max_connections: 5,
        },
        ..AppConfig::default()
    }
}

async fn setup() -> (TempDir, AppState, Arc<RecordingRemote>) {
    silva_field::shared::logging::init();
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(RecordingRemote::default());
    let state = AppState::initialize_with_remote(
        config_for(&dir),
        remote.clone(),
        Arc::new(StaticSession),
    )
    .await
    .unwrap();
    state
        .monitor
        .update(ConnectionStatus::Online(Transport::Wifi));
    (dir, state, remote)
}

fn tree_draft(number: u32) -> NewTree {
    NewTree {
        project_id: "p1".to_string(),
        plot_id: None,
        tree_number: number,
        lat: 61.5,
        lon: 23.8,
        dbh_cm: 27.0 + f64::from(number),
        height_m: Some(20.0),
        species_code: "PISY".to_string(),
        health_status: HealthStatus::Healthy,
        defects: vec![],
    }
}

#[tokio::test]
async fn offline_create_syncs_once_connectivity_returns() {
    let (_dir, state, remote) = setup().await;
    state.monitor.update(ConnectionStatus::Offline);

    let tree = state.data.create_tree(tree_draft(1)).await.unwrap();
    assert_eq!(tree.sync_status, SyncStatus::Pending);
    assert!(tree.remote_id.is_none());

    // While offline, a manual trigger never reaches the server.
    let report = state.sync.sync_now(true).await;
    assert_eq!(report.outcome, PassOutcome::Skipped(SkipReason::Offline));
    assert!(remote.calls().is_empty());

    // Connectivity returns; the listener fires the pass.
    state.start_auto_sync();
    state
        .monitor
        .update(ConnectionStatus::Online(Transport::Wifi));

    let mut drained = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(40)).await;
        if state.sync.status().await.unwrap().pending_operations == 0 {
            drained = true;
            break;
        }
    }
    assert!(drained, "queue never drained after connectivity returned");

    let synced = state.data.tree(&tree.id).await.unwrap().unwrap();
    assert_eq!(synced.remote_id.as_deref(), Some("R1"));
    assert_eq!(synced.sync_status, SyncStatus::Synced);

    state.shutdown().await;
}

#[tokio::test]
async fn push_order_follows_enqueue_order_across_entities() {
    let (_dir, state, remote) = setup().await;

    let plot = state
        .data
        .create_plot(NewPlot {
            project_id: "p1".to_string(),
            plot_number: 1,
            center_lat: 61.4,
            center_lon: 23.9,
            radius_m: 12.6,
            shape: PlotShape::Circular,
        })
        .await
        .unwrap();
    let first_tree = state.data.create_tree(tree_draft(1)).await.unwrap();
    let second_tree = state.data.create_tree(tree_draft(2)).await.unwrap();

    let report = state.sync.sync_now(false).await;
    assert_eq!(report.pushed, 3);

    let pushes: Vec<String> = remote
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("create_"))
        .collect();
    assert_eq!(
        pushes,
        vec![
            format!("create_plot:{}", plot.id),
            format!("create_tree:{}", first_tree.id),
            format!("create_tree:{}", second_tree.id),
        ]
    );

    state.shutdown().await;
}

#[tokio::test]
async fn attempts_climb_across_passes_until_dead_lettered() {
    let (_dir, state, remote) = setup().await;
    remote.fail_creates.store(true, Ordering::Relaxed);
    state.data.create_tree(tree_draft(1)).await.unwrap();

    for _ in 0..3 {
        state.sync.sync_now(false).await;
    }
    let status = state.sync.status().await.unwrap();
    // Three failures: still eligible (3 < 5).
    assert_eq!(status.pending_operations, 1);
    assert_eq!(status.dead_letters, 0);

    state.sync.sync_now(false).await;
    state.sync.sync_now(false).await;

    let status = state.sync.status().await.unwrap();
    assert_eq!(status.pending_operations, 0);
    assert_eq!(status.dead_letters, 1);

    // A further pass no longer attempts the dead-lettered row.
    let calls_before = remote.calls().len();
    let report = state.sync.sync_now(false).await;
    assert_eq!(report.pushed, 0);
    assert_eq!(report.push_failures, 0);
    let mut calls = remote.calls();
    let new_calls = calls.split_off(calls_before);
    assert!(new_calls.iter().all(|c| !c.starts_with("create_tree")));

    // Explicit retry restores eligibility.
    remote.fail_creates.store(false, Ordering::Relaxed);
    let report = state.sync.retry_failed().await.unwrap();
    assert_eq!(report.pushed, 1);
    assert_eq!(state.sync.status().await.unwrap().dead_letters, 0);

    state.shutdown().await;
}

#[tokio::test]
async fn photos_wait_for_the_parent_tree_remote_id() {
    let (dir, state, remote) = setup().await;
    remote.fail_creates.store(true, Ordering::Relaxed);

    let tree = state.data.create_tree(tree_draft(1)).await.unwrap();
    let photo_path = dir.path().join("ph1.jpg");
    tokio::fs::write(&photo_path, b"jpeg-bytes").await.unwrap();
    let photo = state
        .data
        .add_photo(NewPhoto {
            tree_id: tree.id.clone(),
            local_uri: photo_path.display().to_string(),
            kind: PhotoKind::Trunk,
        })
        .await
        .unwrap();

    // Tree create keeps failing, so the photo is never selected.
    let report = state.sync.sync_now(false).await;
    assert_eq!(report.photos_uploaded, 0);
    assert!(remote.calls().iter().all(|c| !c.starts_with("upload_photo")));

    // Once the create lands, the same pass uploads the photo.
    remote.fail_creates.store(false, Ordering::Relaxed);
    let report = state.sync.sync_now(false).await;
    assert_eq!(report.pushed, 1);
    assert_eq!(report.photos_uploaded, 1);

    let uploaded = state
        .data
        .photos_by_tree(&tree.id)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.id == photo.id)
        .unwrap();
    assert_eq!(uploaded.sync_status, SyncStatus::Synced);
    assert!(uploaded.remote_uri.as_deref().unwrap().contains("R1"));

    state.shutdown().await;
}

#[tokio::test]
async fn pull_mirrors_server_projects_and_advances_the_watermark() {
    let (_dir, state, remote) = setup().await;
    remote.serve_project(PulledProject {
        remote_id: "RP-1".to_string(),
        name: "Ridge inventory".to_string(),
        description: Some("2026 season".to_string()),
        status: ProjectStatus::Active,
        start_date: None,
        end_date: None,
        updated_at: Utc::now(),
    });

    let report = state.sync.sync_now(false).await;
    assert_eq!(report.pulled, 1);
    assert!(report.is_clean());
    // The very first pull carries no watermark.
    assert!(remote.last_updated_after.lock().unwrap().is_none());

    let projects = state.data.projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].remote_id.as_deref(), Some("RP-1"));
    assert_eq!(projects[0].sync_status, SyncStatus::Synced);

    // The next pass asks only for records updated since the clean pass.
    state.sync.sync_now(false).await;
    assert!(remote.last_updated_after.lock().unwrap().is_some());

    state.shutdown().await;
}

#[tokio::test]
async fn local_rows_and_queue_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(RecordingRemote::default());

    let tree_id = {
        let state = AppState::initialize_with_remote(
            config_for(&dir),
            remote.clone(),
            Arc::new(StaticSession),
        )
        .await
        .unwrap();
        let tree = state.data.create_tree(tree_draft(1)).await.unwrap();
        state.shutdown().await;
        tree.id
    };

    let state =
        AppState::initialize_with_remote(config_for(&dir), remote, Arc::new(StaticSession))
            .await
            .unwrap();

    let tree = state.data.tree(&tree_id).await.unwrap().unwrap();
    assert_eq!(tree.sync_status, SyncStatus::Pending);
    assert_eq!(state.sync.status().await.unwrap().pending_operations, 1);

    state.shutdown().await;
}
