use crate::application::ports::{
    EntityStore, InMemorySettings, OperationQueue, RemoteService, SessionProvider,
};
use crate::application::services::{FieldDataService, SyncOrchestrator};
use crate::infrastructure::connectivity::ChannelNetworkMonitor;
use crate::infrastructure::database::{ConnectionPool, SqliteEntityStore, SqliteOperationQueue};
use crate::infrastructure::remote::HttpRemoteService;
use crate::shared::config::AppConfig;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::info;

/// Wires the pool, stores and services together for the host application.
/// The session provider is owned by the host's auth layer; connectivity
/// callbacks are fed into `monitor` by the platform glue.
pub struct AppState {
    pub pool: ConnectionPool,
    pub data: Arc<FieldDataService>,
    pub sync: Arc<SyncOrchestrator>,
    pub monitor: Arc<ChannelNetworkMonitor>,
    pub settings: Arc<InMemorySettings>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AppState {
    pub async fn initialize(
        config: AppConfig,
        session: Arc<dyn SessionProvider>,
    ) -> anyhow::Result<Self> {
        let remote: Arc<dyn RemoteService> = Arc::new(HttpRemoteService::new(&config.remote)?);
        Self::initialize_with_remote(config, remote, session).await
    }

    /// Same wiring with an injected remote service, for hosts that bring
    /// their own transport and for tests.
    pub async fn initialize_with_remote(
        config: AppConfig,
        remote: Arc<dyn RemoteService>,
        session: Arc<dyn SessionProvider>,
    ) -> anyhow::Result<Self> {
        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        pool.migrate().await?;

        let store: Arc<dyn EntityStore> = Arc::new(SqliteEntityStore::new(pool.clone()));
        let queue: Arc<dyn OperationQueue> = Arc::new(SqliteOperationQueue::new(pool.clone()));
        let monitor = Arc::new(ChannelNetworkMonitor::default());
        let settings = Arc::new(InMemorySettings::new(config.sync.clone()));

        let data = Arc::new(FieldDataService::new(store.clone(), queue.clone()));
        let sync = Arc::new(SyncOrchestrator::new(
            store,
            queue,
            remote,
            monitor.clone(),
            session,
            settings.clone(),
        ));

        info!("field data state initialized");
        Ok(Self {
            pool,
            data,
            sync,
            monitor,
            settings,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Starts the periodic timer and the connectivity listener. Further
    /// calls are no-ops while the triggers are running.
    pub fn start_auto_sync(&self) {
        let mut tasks = self.tasks.lock().expect("task lock poisoned");
        if !tasks.is_empty() {
            return;
        }
        tasks.push(self.sync.spawn_periodic());
        tasks.push(self.sync.spawn_connectivity_listener());
        info!("auto-sync triggers started");
    }

    /// Stops future automatic passes. An in-flight pass is not
    /// interrupted; it runs its phases to completion.
    pub fn stop_auto_sync(&self) {
        let mut tasks = self.tasks.lock().expect("task lock poisoned");
        for task in tasks.drain(..) {
            task.abort();
        }
        info!("auto-sync triggers stopped");
    }

    pub async fn shutdown(&self) {
        self.stop_auto_sync();
        self.pool.close().await;
    }
}
