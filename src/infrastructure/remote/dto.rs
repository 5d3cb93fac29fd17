use crate::application::ports::remote_service::PulledProject;
use crate::domain::entities::{SamplePlot, TreeMeasurement};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Wire shape of a tree measurement as the field endpoints expect it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePayload<'a> {
    pub local_id: &'a str,
    pub project_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_id: Option<&'a str>,
    pub tree_number: u32,
    pub lat: f64,
    pub lon: f64,
    pub dbh_cm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_m: Option<f64>,
    pub species_code: &'a str,
    pub health_status: &'a str,
    pub defects: &'a [String],
}

impl<'a> TreePayload<'a> {
    pub fn from_tree(tree: &'a TreeMeasurement) -> Self {
        Self {
            local_id: &tree.id,
            project_id: &tree.project_id,
            plot_id: tree.plot_id.as_deref(),
            tree_number: tree.tree_number,
            lat: tree.lat,
            lon: tree.lon,
            dbh_cm: tree.dbh_cm,
            height_m: tree.height_m,
            species_code: &tree.species_code,
            health_status: tree.health_status.as_str(),
            defects: &tree.defects,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotPayload<'a> {
    pub local_id: &'a str,
    pub project_id: &'a str,
    pub plot_number: u32,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_m: f64,
    pub shape: &'a str,
    pub status: &'a str,
}

impl<'a> PlotPayload<'a> {
    pub fn from_plot(plot: &'a SamplePlot) -> Self {
        Self {
            local_id: &plot.id,
            project_id: &plot.project_id,
            plot_number: plot.plot_number,
            center_lat: plot.center_lat,
            center_lon: plot.center_lon,
            radius_m: plot.radius_m,
            shape: plot.shape.as_str(),
            status: plot.status.as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct PhotoResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectDto> for PulledProject {
    fn from(dto: ProjectDto) -> Self {
        PulledProject {
            remote_id: dto.id,
            name: dto.name,
            description: dto.description,
            status: dto.status.as_str().into(),
            start_date: dto.start_date,
            end_date: dto.end_date,
            updated_at: dto.updated_at,
        }
    }
}
