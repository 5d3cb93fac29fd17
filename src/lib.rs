pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{
    EntityStore, NetworkMonitor, OperationQueue, PhotoUpload, PulledProject, RemoteService,
    Session, SessionProvider, SettingsSource,
};
pub use application::services::{FieldDataService, SyncOrchestrator};
pub use domain::entities::{
    FieldProject, QueuedOperation, SamplePlot, SyncReport, SyncSnapshot, TreeMeasurement,
    TreePhoto,
};
pub use shared::error::AppError;
pub use state::AppState;
