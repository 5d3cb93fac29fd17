use crate::domain::value_objects::SyncStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Declining,
    Dead,
    Unknown(String),
}

impl HealthStatus {
    pub fn as_str(&self) -> &str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Declining => "declining",
            HealthStatus::Dead => "dead",
            HealthStatus::Unknown(value) => value.as_str(),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for HealthStatus {
    fn from(value: &str) -> Self {
        match value {
            "healthy" => HealthStatus::Healthy,
            "declining" => HealthStatus::Declining,
            "dead" => HealthStatus::Dead,
            other => HealthStatus::Unknown(other.to_string()),
        }
    }
}

/// Single tree measurement. The plot reference is optional; trees outside
/// a sample plot are recorded against the project alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeMeasurement {
    pub id: String,
    pub remote_id: Option<String>,
    pub project_id: String,
    pub plot_id: Option<String>,
    pub tree_number: u32,
    pub lat: f64,
    pub lon: f64,
    pub dbh_cm: f64,
    pub height_m: Option<f64>,
    pub species_code: String,
    pub health_status: HealthStatus,
    pub defects: Vec<String>,
    pub sync_status: SyncStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreeMeasurement {
    /// Merge a partial edit into the measurement. Timestamps and sync
    /// state are the caller's responsibility.
    pub fn apply(&mut self, update: TreeUpdate) {
        if let Some(plot_id) = update.plot_id {
            self.plot_id = Some(plot_id);
        }
        if let Some(tree_number) = update.tree_number {
            self.tree_number = tree_number;
        }
        if let Some(lat) = update.lat {
            self.lat = lat;
        }
        if let Some(lon) = update.lon {
            self.lon = lon;
        }
        if let Some(dbh_cm) = update.dbh_cm {
            self.dbh_cm = dbh_cm;
        }
        if let Some(height_m) = update.height_m {
            self.height_m = Some(height_m);
        }
        if let Some(species_code) = update.species_code {
            self.species_code = species_code;
        }
        if let Some(health_status) = update.health_status {
            self.health_status = health_status;
        }
        if let Some(defects) = update.defects {
            self.defects = defects;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTree {
    pub project_id: String,
    pub plot_id: Option<String>,
    pub tree_number: u32,
    pub lat: f64,
    pub lon: f64,
    pub dbh_cm: f64,
    pub height_m: Option<f64>,
    pub species_code: String,
    pub health_status: HealthStatus,
    pub defects: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TreeUpdate {
    pub plot_id: Option<String>,
    pub tree_number: Option<u32>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub dbh_cm: Option<f64>,
    pub height_m: Option<f64>,
    pub species_code: Option<String>,
    pub health_status: Option<HealthStatus>,
    pub defects: Option<Vec<String>>,
}
