use crate::application::ports::network_monitor::NetworkMonitor;
use crate::domain::value_objects::ConnectionStatus;
use std::sync::RwLock;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Network monitor fed by the host platform's connectivity callbacks.
/// `update` records the new state and broadcasts it to subscribers.
pub struct ChannelNetworkMonitor {
    current: RwLock<ConnectionStatus>,
    sender: broadcast::Sender<ConnectionStatus>,
}

impl ChannelNetworkMonitor {
    pub fn new(initial: ConnectionStatus) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(initial),
            sender,
        }
    }

    pub fn update(&self, status: ConnectionStatus) {
        *self.current.write().expect("connectivity lock poisoned") = status;
        // Send only fails when no subscriber is listening.
        let _ = self.sender.send(status);
    }
}

impl NetworkMonitor for ChannelNetworkMonitor {
    fn status(&self) -> ConnectionStatus {
        *self.current.read().expect("connectivity lock poisoned")
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectionStatus> {
        self.sender.subscribe()
    }
}

impl Default for ChannelNetworkMonitor {
    fn default() -> Self {
        Self::new(ConnectionStatus::Offline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Transport;

    #[tokio::test]
    async fn update_is_visible_to_poll_and_subscribers() {
        let monitor = ChannelNetworkMonitor::default();
        let mut rx = monitor.subscribe();

        monitor.update(ConnectionStatus::Online(Transport::Wifi));

        assert!(monitor.status().is_online());
        assert_eq!(
            rx.recv().await.unwrap(),
            ConnectionStatus::Online(Transport::Wifi)
        );
    }
}
