use super::dto::{CreatedResponse, PhotoResponse, PlotPayload, ProjectDto, TreePayload};
use super::error::RemoteError;
use crate::application::ports::remote_service::{PhotoUpload, PulledProject, RemoteService};
use crate::domain::entities::{SamplePlot, TreeMeasurement};
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{multipart, Response, StatusCode};
use std::time::Duration;

/// Reqwest-backed implementation of the field service contract. Every
/// request carries the caller's bearer credential and the client-wide
/// fixed timeout.
pub struct HttpRemoteService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteService {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(RemoteError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn fetch_projects(
        &self,
        token: &str,
        assigned_to: &str,
        updated_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<PulledProject>, AppError> {
        let mut query: Vec<(&str, String)> = vec![("assignedTo", assigned_to.to_string())];
        if let Some(after) = updated_after {
            query.push((
                "updatedAfter",
                after.to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }

        let response = self
            .client
            .get(self.url("projects"))
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(RemoteError::from)?;

        let projects: Vec<ProjectDto> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        Ok(projects.into_iter().map(PulledProject::from).collect())
    }

    async fn create_tree(&self, token: &str, tree: &TreeMeasurement) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.url("field/trees"))
            .bearer_auth(token)
            .json(&TreePayload::from_tree(tree))
            .send()
            .await
            .map_err(RemoteError::from)?;

        let created: CreatedResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        Ok(created.id)
    }

    async fn update_tree(
        &self,
        token: &str,
        remote_id: &str,
        tree: &TreeMeasurement,
    ) -> Result<(), AppError> {
        let response = self
            .client
            .patch(self.url(&format!("field/trees/{remote_id}")))
            .bearer_auth(token)
            .json(&TreePayload::from_tree(tree))
            .send()
            .await
            .map_err(RemoteError::from)?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_tree(&self, token: &str, remote_id: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.url(&format!("field/trees/{remote_id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(RemoteError::from)?;

        Self::check(response).await?;
        Ok(())
    }

    async fn create_plot(&self, token: &str, plot: &SamplePlot) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.url("field/plots"))
            .bearer_auth(token)
            .json(&PlotPayload::from_plot(plot))
            .send()
            .await
            .map_err(RemoteError::from)?;

        let created: CreatedResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        Ok(created.id)
    }

    async fn update_plot(
        &self,
        token: &str,
        remote_id: &str,
        plot: &SamplePlot,
    ) -> Result<(), AppError> {
        let response = self
            .client
            .patch(self.url(&format!("field/plots/{remote_id}")))
            .bearer_auth(token)
            .json(&PlotPayload::from_plot(plot))
            .send()
            .await
            .map_err(RemoteError::from)?;

        Self::check(response).await?;
        Ok(())
    }

    async fn upload_photo(&self, token: &str, upload: &PhotoUpload) -> Result<String, AppError> {
        let part = multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str("image/jpeg")
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("treeId", upload.tree_remote_id.clone())
            .text("type", upload.kind.as_str().to_string());

        let response = self
            .client
            .post(self.url("field/photos"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(RemoteError::from)?;

        let uploaded: PhotoResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        Ok(uploaded.url)
    }
}
