use serde::{Deserialize, Serialize};
use std::fmt;

/// Synchronization state of a locally stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Pending,
    Synced,
    Error,
    Unknown(String),
}

impl SyncStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
            SyncStatus::Unknown(value) => value.as_str(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SyncStatus::Pending)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SyncStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => SyncStatus::Pending,
            "synced" => SyncStatus::Synced,
            "error" => SyncStatus::Error,
            other => SyncStatus::Unknown(other.to_string()),
        }
    }
}
