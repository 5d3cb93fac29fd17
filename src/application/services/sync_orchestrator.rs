use crate::application::ports::entity_store::PhotoUploadCandidate;
use crate::application::ports::{
    EntityStore, NetworkMonitor, OperationQueue, PhotoUpload, RemoteService, Session,
    SessionProvider, SettingsSource,
};
use crate::domain::entities::{
    QueuedOperation, SamplePlot, SkipReason, SyncPhase, SyncReport, SyncSnapshot, SyncTrigger,
    TreeMeasurement,
};
use crate::domain::value_objects::{EntityKind, Operation};
use crate::shared::error::AppError;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const RECENT_ERROR_CAP: usize = 20;
const PHOTO_BATCH_LIMIT: u32 = 10;

/// Drives one pull, push, photo-upload pass per trigger, with at most
/// one pass in flight. The single-flight guard lives in this instance's
/// status lock, so independent orchestrators (e.g. under test) never
/// share state.
pub struct SyncOrchestrator {
    store: Arc<dyn EntityStore>,
    queue: Arc<dyn OperationQueue>,
    remote: Arc<dyn RemoteService>,
    monitor: Arc<dyn NetworkMonitor>,
    session: Arc<dyn SessionProvider>,
    settings: Arc<dyn SettingsSource>,
    status: Arc<tokio::sync::RwLock<SyncSnapshot>>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn EntityStore>,
        queue: Arc<dyn OperationQueue>,
        remote: Arc<dyn RemoteService>,
        monitor: Arc<dyn NetworkMonitor>,
        session: Arc<dyn SessionProvider>,
        settings: Arc<dyn SettingsSource>,
    ) -> Self {
        Self {
            store,
            queue,
            remote,
            monitor,
            session,
            settings,
            status: Arc::new(tokio::sync::RwLock::new(SyncSnapshot::idle())),
        }
    }

    pub async fn sync_now(&self, force: bool) -> SyncReport {
        self.trigger(SyncTrigger::Manual { force }).await
    }

    /// Resets dead-lettered queue rows and runs an immediate pass.
    pub async fn retry_failed(&self) -> Result<SyncReport, AppError> {
        let reset = self.queue.reset_dead_letters().await?;
        info!(reset, "dead-lettered operations reset");
        Ok(self.sync_now(false).await)
    }

    /// Current counters. Queue and watermark values are read fresh so the
    /// UI never shows stale counts.
    pub async fn status(&self) -> Result<SyncSnapshot, AppError> {
        let base = self.status.read().await.clone();
        Ok(SyncSnapshot {
            pending_operations: self.queue.pending_count().await?,
            dead_letters: self.queue.dead_letter_count().await?,
            last_synced_at: self.store.last_synced_at().await?,
            ..base
        })
    }

    pub async fn trigger(&self, trigger: SyncTrigger) -> SyncReport {
        // Gatekeeping step 1: single flight. Check-and-set under the
        // write lock; every other trigger is a no-op while a pass runs.
        {
            let mut status = self.status.write().await;
            if status.is_syncing {
                debug!(?trigger, "pass already in flight, trigger ignored");
                return SyncReport::skipped(trigger, SkipReason::AlreadyRunning);
            }
            status.is_syncing = true;
            status.phase = SyncPhase::Gatekeeping;
        }

        let report = self.run_pass(trigger).await;
        self.finish_pass(&report).await;
        report
    }

    async fn run_pass(&self, trigger: SyncTrigger) -> SyncReport {
        let settings = self.settings.current();
        if trigger.is_automatic() && !settings.auto_sync {
            return SyncReport::skipped(trigger, SkipReason::AutoSyncDisabled);
        }

        let connection = self.monitor.status();
        if !connection.is_online() {
            return SyncReport::skipped(trigger, SkipReason::Offline);
        }
        // Force bypasses the Wi-Fi policy, never the offline check above.
        if settings.wifi_only && !connection.is_unmetered() && !trigger.is_forced() {
            return SyncReport::skipped(trigger, SkipReason::MeteredConnection);
        }

        let session = match self.session.session().await {
            Ok(Some(session)) => session,
            // A missing or unreadable credential aborts silently.
            Ok(None) | Err(_) => return SyncReport::skipped(trigger, SkipReason::NoSession),
        };

        let mut report = SyncReport::started(trigger);
        info!(?trigger, "sync pass started");

        self.set_phase(SyncPhase::Pulling).await;
        if let Err(err) = self.pull(&session, &mut report).await {
            let auth_failed = matches!(err, AppError::Unauthorized(_));
            warn!(error = %err, "pull phase failed");
            report.errors.push(format!("pull: {err}"));
            if auth_failed {
                // No push or upload can succeed with a rejected credential.
                return report;
            }
        }

        self.set_phase(SyncPhase::Pushing).await;
        if let Err(err) = self.push(&session, &mut report).await {
            warn!(error = %err, "push phase stopped");
            report.errors.push(format!("push: {err}"));
            if matches!(err, AppError::Unauthorized(_)) {
                return report;
            }
        }

        self.set_phase(SyncPhase::UploadingPhotos).await;
        if let Err(err) = self.upload_photos(&session, &mut report).await {
            warn!(error = %err, "photo upload phase stopped");
            report.errors.push(format!("photos: {err}"));
        }

        if report.push_failures > 0 {
            report
                .errors
                .push(format!("{} queued operations failed", report.push_failures));
        }
        if report.photo_failures > 0 {
            report
                .errors
                .push(format!("{} photo uploads failed", report.photo_failures));
        }

        if report.is_clean() {
            if let Err(err) = self.store.set_last_synced_at(Utc::now()).await {
                report.errors.push(format!("watermark: {err}"));
            }
        }

        info!(
            pulled = report.pulled,
            pushed = report.pushed,
            push_failures = report.push_failures,
            photos = report.photos_uploaded,
            photo_failures = report.photo_failures,
            "sync pass finished"
        );
        report
    }

    async fn finish_pass(&self, report: &SyncReport) {
        let mut status = self.status.write().await;
        status.phase = SyncPhase::Idle;
        status.is_syncing = false;

        // Gatekeeping aborts are silent; only completed passes touch the
        // visible error list.
        if report.is_skipped() {
            return;
        }
        if report.errors.is_empty() {
            status.recent_errors.clear();
        } else {
            status.recent_errors.extend(report.errors.iter().cloned());
            let len = status.recent_errors.len();
            if len > RECENT_ERROR_CAP {
                status.recent_errors.drain(..len - RECENT_ERROR_CAP);
            }
        }
    }

    async fn set_phase(&self, phase: SyncPhase) {
        self.status.write().await.phase = phase;
    }

    async fn pull(&self, session: &Session, report: &mut SyncReport) -> Result<(), AppError> {
        let since = self.store.last_synced_at().await?;
        let projects = self
            .remote
            .fetch_projects(&session.bearer_token, &session.user_id, since)
            .await?;

        for pulled in &projects {
            // Last-write-wins upsert; a conflicting local edit loses.
            self.store.upsert_pulled_project(pulled).await?;
            report.pulled += 1;
        }

        debug!(count = report.pulled, "pull phase applied server projects");
        Ok(())
    }

    async fn push(&self, session: &Session, report: &mut SyncReport) -> Result<(), AppError> {
        let batch = self.queue.ready_batch().await?;
        debug!(batch = batch.len(), "push phase started");

        for operation in batch {
            match self.dispatch(session, &operation).await {
                Ok(()) => {
                    self.queue.record_outcome(operation.id, true, None).await?;
                    report.pushed += 1;
                }
                Err(err @ AppError::Unauthorized(_)) => {
                    // Pass-level: the row is untouched and retried on the
                    // next pass with a fresh credential.
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        queue_id = operation.id,
                        kind = %operation.entity_kind,
                        op = %operation.operation,
                        error = %err,
                        "queued operation failed"
                    );
                    self.queue
                        .record_outcome(operation.id, false, Some(&err.to_string()))
                        .await?;
                    report.push_failures += 1;
                }
            }
        }

        Ok(())
    }

    /// Push-phase dispatch over the closed (kind × operation) product.
    /// Combinations without a remote endpoint are explicit arms, not a
    /// default branch.
    async fn dispatch(&self, session: &Session, op: &QueuedOperation) -> Result<(), AppError> {
        let token = &session.bearer_token;

        match (op.entity_kind, op.operation) {
            (EntityKind::Tree, Operation::Create) => {
                if self.store.get_tree(&op.entity_id).await?.is_none() {
                    // Deleted locally before it ever reached the server;
                    // resolve without a remote call. The trailing delete
                    // row settles the same way.
                    debug!(entity_id = %op.entity_id, "create skipped, entity gone locally");
                    return Ok(());
                }
                let snapshot: TreeMeasurement =
                    op.payload.parse_entity().map_err(AppError::DeserializationError)?;
                let remote_id = self.remote.create_tree(token, &snapshot).await?;
                self.store
                    .set_remote_id(EntityKind::Tree, &op.entity_id, &remote_id, Utc::now())
                    .await
            }
            (EntityKind::Tree, Operation::Update) => {
                let Some(current) = self.store.get_tree(&op.entity_id).await? else {
                    debug!(entity_id = %op.entity_id, "update skipped, entity gone locally");
                    return Ok(());
                };
                let remote_id = current.remote_id.ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "tree {} has no remote id yet; create has not synced",
                        op.entity_id
                    ))
                })?;
                let snapshot: TreeMeasurement =
                    op.payload.parse_entity().map_err(AppError::DeserializationError)?;
                self.remote.update_tree(token, &remote_id, &snapshot).await?;
                self.store
                    .mark_synced(EntityKind::Tree, &op.entity_id, Utc::now())
                    .await
            }
            (EntityKind::Tree, Operation::Delete) => {
                let snapshot: TreeMeasurement =
                    op.payload.parse_entity().map_err(AppError::DeserializationError)?;
                match snapshot.remote_id {
                    Some(remote_id) => self.remote.delete_tree(token, &remote_id).await,
                    // Never created remotely; nothing to delete there.
                    None => Ok(()),
                }
            }
            (EntityKind::Plot, Operation::Create) => {
                if self.store.get_plot(&op.entity_id).await?.is_none() {
                    debug!(entity_id = %op.entity_id, "create skipped, entity gone locally");
                    return Ok(());
                }
                let snapshot: SamplePlot =
                    op.payload.parse_entity().map_err(AppError::DeserializationError)?;
                let remote_id = self.remote.create_plot(token, &snapshot).await?;
                self.store
                    .set_remote_id(EntityKind::Plot, &op.entity_id, &remote_id, Utc::now())
                    .await
            }
            (EntityKind::Plot, Operation::Update) => {
                let Some(current) = self.store.get_plot(&op.entity_id).await? else {
                    debug!(entity_id = %op.entity_id, "update skipped, entity gone locally");
                    return Ok(());
                };
                let remote_id = current.remote_id.ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "plot {} has no remote id yet; create has not synced",
                        op.entity_id
                    ))
                })?;
                let snapshot: SamplePlot =
                    op.payload.parse_entity().map_err(AppError::DeserializationError)?;
                self.remote.update_plot(token, &remote_id, &snapshot).await?;
                self.store
                    .mark_synced(EntityKind::Plot, &op.entity_id, Utc::now())
                    .await
            }
            (EntityKind::Plot, Operation::Delete) => Err(AppError::InvalidInput(
                "no remote endpoint for plot deletion".to_string(),
            )),
            (EntityKind::Project, _) => Err(AppError::InvalidInput(
                "projects are server-authored; local project mutations have no endpoint"
                    .to_string(),
            )),
            (EntityKind::Photo, _) => Err(AppError::InvalidInput(
                "photos are transferred by the upload phase, not the operation queue".to_string(),
            )),
        }
    }

    async fn upload_photos(
        &self,
        session: &Session,
        report: &mut SyncReport,
    ) -> Result<(), AppError> {
        let batch = self.store.uploadable_photos(PHOTO_BATCH_LIMIT).await?;
        debug!(batch = batch.len(), "photo upload phase started");

        for candidate in batch {
            match self.upload_one(session, &candidate).await {
                Ok(url) => {
                    self.store
                        .set_photo_uploaded(&candidate.photo.id, &url, Utc::now())
                        .await?;
                    report.photos_uploaded += 1;
                }
                Err(err @ AppError::Unauthorized(_)) => return Err(err),
                Err(err) => {
                    warn!(photo_id = %candidate.photo.id, error = %err, "photo upload failed");
                    // No queue bookkeeping for photos; the error status
                    // keeps the row eligible for the next pass.
                    self.store.set_photo_error(&candidate.photo.id).await?;
                    report.photo_failures += 1;
                }
            }
        }

        Ok(())
    }

    async fn upload_one(
        &self,
        session: &Session,
        candidate: &PhotoUploadCandidate,
    ) -> Result<String, AppError> {
        let bytes = tokio::fs::read(&candidate.photo.local_uri)
            .await
            .map_err(|e| {
                AppError::Storage(format!("read {}: {e}", candidate.photo.local_uri))
            })?;

        let file_name = Path::new(&candidate.photo.local_uri)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("photo.jpg")
            .to_string();

        self.remote
            .upload_photo(
                &session.bearer_token,
                &PhotoUpload {
                    tree_remote_id: candidate.tree_remote_id.clone(),
                    kind: candidate.photo.kind.clone(),
                    file_name,
                    bytes,
                },
            )
            .await
    }

    /// Periodic trigger loop. The interval is re-read from settings on
    /// every iteration so changes apply without a restart.
    pub fn spawn_periodic(self: &Arc<Self>) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let minutes = orchestrator.settings.current().sync_interval_minutes.max(1);
                tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
                let report = orchestrator.trigger(SyncTrigger::Timer).await;
                debug!(outcome = ?report.outcome, "periodic sync tick");
            }
        })
    }

    /// Fires a pass on each offline-to-online transition.
    pub fn spawn_connectivity_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        let mut receiver = orchestrator.monitor.subscribe();
        let mut was_online = orchestrator.monitor.status().is_online();

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(status) => {
                        let online = status.is_online();
                        if online && !was_online {
                            info!("connectivity restored, triggering sync");
                            orchestrator
                                .trigger(SyncTrigger::ConnectivityRestored)
                                .await;
                        }
                        was_online = online;
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(missed, "connectivity events lagged");
                        was_online = orchestrator.monitor.status().is_online();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
