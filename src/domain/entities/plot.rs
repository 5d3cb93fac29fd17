use crate::domain::value_objects::SyncStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotShape {
    Circular,
    Rectangular,
    Unknown(String),
}

impl PlotShape {
    pub fn as_str(&self) -> &str {
        match self {
            PlotShape::Circular => "circular",
            PlotShape::Rectangular => "rectangular",
            PlotShape::Unknown(value) => value.as_str(),
        }
    }
}

impl fmt::Display for PlotShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for PlotShape {
    fn from(value: &str) -> Self {
        match value {
            "circular" => PlotShape::Circular,
            "rectangular" => PlotShape::Rectangular,
            other => PlotShape::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotStatus {
    Planned,
    InProgress,
    Completed,
    Unknown(String),
}

impl PlotStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PlotStatus::Planned => "planned",
            PlotStatus::InProgress => "in_progress",
            PlotStatus::Completed => "completed",
            PlotStatus::Unknown(value) => value.as_str(),
        }
    }
}

impl fmt::Display for PlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for PlotStatus {
    fn from(value: &str) -> Self {
        match value {
            "planned" => PlotStatus::Planned,
            "in_progress" => PlotStatus::InProgress,
            "completed" => PlotStatus::Completed,
            other => PlotStatus::Unknown(other.to_string()),
        }
    }
}

/// Sample plot measured in the field, anchored to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePlot {
    pub id: String,
    pub remote_id: Option<String>,
    pub project_id: String,
    pub plot_number: u32,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_m: f64,
    pub shape: PlotShape,
    pub status: PlotStatus,
    pub sync_status: SyncStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SamplePlot {
    /// Merge a partial edit into the plot. Timestamps and sync state are
    /// the caller's responsibility.
    pub fn apply(&mut self, update: PlotUpdate) {
        if let Some(plot_number) = update.plot_number {
            self.plot_number = plot_number;
        }
        if let Some(center_lat) = update.center_lat {
            self.center_lat = center_lat;
        }
        if let Some(center_lon) = update.center_lon {
            self.center_lon = center_lon;
        }
        if let Some(radius_m) = update.radius_m {
            self.radius_m = radius_m;
        }
        if let Some(shape) = update.shape {
            self.shape = shape;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPlot {
    pub project_id: String,
    pub plot_number: u32,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_m: f64,
    pub shape: PlotShape,
}

#[derive(Debug, Clone, Default)]
pub struct PlotUpdate {
    pub plot_number: Option<u32>,
    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,
    pub radius_m: Option<f64>,
    pub shape: Option<PlotShape>,
    pub status: Option<PlotStatus>,
}
