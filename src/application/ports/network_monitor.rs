use crate::domain::value_objects::ConnectionStatus;
use tokio::sync::broadcast;

/// Device connectivity as reported by the platform. The host feeds OS
/// callbacks into an implementation; the orchestrator polls `status` at
/// gatekeeping time and listens to `subscribe` for online transitions.
pub trait NetworkMonitor: Send + Sync {
    fn status(&self) -> ConnectionStatus;
    fn subscribe(&self) -> broadcast::Receiver<ConnectionStatus>;
}
