pub mod entity_store;
pub mod network_monitor;
pub mod operation_queue;
pub mod remote_service;
pub mod session;
pub mod settings;

pub use entity_store::{EntityStore, PhotoUploadCandidate};
pub use network_monitor::NetworkMonitor;
pub use operation_queue::OperationQueue;
pub use remote_service::{PhotoUpload, PulledProject, RemoteService};
pub use session::{Session, SessionProvider};
pub use settings::{InMemorySettings, SettingsSource};
