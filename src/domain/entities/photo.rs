use crate::domain::value_objects::{PhotoKind, SyncStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Photo attached to a tree measurement. `local_uri` always points at the
/// on-device file; `remote_uri` is set only after a successful upload.
/// The photo's sync state is independent of its parent tree's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePhoto {
    pub id: String,
    pub tree_id: String,
    pub local_uri: String,
    pub remote_uri: Option<String>,
    pub kind: PhotoKind,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub tree_id: String,
    pub local_uri: String,
    pub kind: PhotoKind,
}
