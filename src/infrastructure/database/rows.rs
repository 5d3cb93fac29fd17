use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub remote_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sync_status: String,
    pub last_synced_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SamplePlotRow {
    pub id: String,
    pub remote_id: Option<String>,
    pub project_id: String,
    pub plot_number: i64,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_m: f64,
    pub shape: String,
    pub status: String,
    pub sync_status: String,
    pub last_synced_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TreeMeasurementRow {
    pub id: String,
    pub remote_id: Option<String>,
    pub project_id: String,
    pub plot_id: Option<String>,
    pub tree_number: i64,
    pub lat: f64,
    pub lon: f64,
    pub dbh_cm: f64,
    pub height_m: Option<f64>,
    pub species_code: String,
    pub health_status: String,
    pub defects: String,
    pub sync_status: String,
    pub last_synced_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TreePhotoRow {
    pub id: String,
    pub tree_id: String,
    pub local_uri: String,
    pub remote_uri: Option<String>,
    pub kind: String,
    pub sync_status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Photo row joined with the parent tree's remote id for upload selection.
#[derive(Debug, Clone, FromRow)]
pub struct PhotoCandidateRow {
    pub id: String,
    pub tree_id: String,
    pub local_uri: String,
    pub remote_uri: Option<String>,
    pub kind: String,
    pub sync_status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub tree_remote_id: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct QueuedOperationRow {
    pub id: i64,
    pub entity_kind: String,
    pub entity_id: String,
    pub operation: String,
    pub payload: String,
    pub attempts: i64,
    pub max_attempts: i64,
    pub last_attempt_at: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: i64,
}
