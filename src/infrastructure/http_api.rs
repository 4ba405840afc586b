// REST adapter for the facility backend
use crate::application::sources::{
    CatalogueSensor, CatalogueSource, DashboardStore, Location, ReadingSource,
};
use crate::domain::dashboard::{DashboardDefinition, DashboardPatch, NewDashboard};
use crate::domain::reading::Reading;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Bearer-token client for the facility backend REST API. Implements
/// all three collaborator traits; every failure is recoverable at the
/// call site, nothing here retries.
#[derive(Debug, Clone)]
pub struct FacilityApi {
    base_url: String,
    token: String,
    reading_limit: usize,
    client: reqwest::Client,
}

impl FacilityApi {
    pub fn new(base_url: String, token: String, reading_limit: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            reading_limit,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", path))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Request to {} failed with status {}: {}", path, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }
}

#[async_trait]
impl ReadingSource for FacilityApi {
    async fn readings_by_sensor(&self, sensor_id: &str) -> Result<Vec<Reading>> {
        self.get_json(&format!(
            "/sensors/{}/readings?limit={}",
            sensor_id, self.reading_limit
        ))
        .await
    }

    async fn all_readings(&self) -> Result<Vec<Reading>> {
        self.get_json("/enriched").await
    }
}

#[async_trait]
impl CatalogueSource for FacilityApi {
    async fn sensors(&self) -> Result<Vec<CatalogueSensor>> {
        self.get_json("/sensors").await
    }

    async fn locations(&self) -> Result<Vec<Location>> {
        self.get_json("/locations").await
    }
}

#[async_trait]
impl DashboardStore for FacilityApi {
    async fn get_dashboard(&self, id: &str) -> Result<DashboardDefinition> {
        self.get_json(&format!("/dashboards/{}", id)).await
    }

    async fn create_dashboard(&self, def: &NewDashboard) -> Result<DashboardDefinition> {
        let response = self
            .client
            .post(self.url("/dashboards"))
            .bearer_auth(&self.token)
            .json(def)
            .send()
            .await
            .context("Failed to create dashboard")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Dashboard create failed with status {}: {}", status, body);
        }

        response
            .json::<DashboardDefinition>()
            .await
            .context("Failed to parse created dashboard")
    }

    async fn update_dashboard(&self, id: &str, patch: &DashboardPatch) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/dashboards/{}", id)))
            .bearer_auth(&self.token)
            .json(patch)
            .send()
            .await
            .with_context(|| format!("Failed to update dashboard {}", id))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Dashboard update failed with status {}: {}", status, body);
        }
        Ok(())
    }

    async fn list_user_dashboards(&self) -> Result<Vec<DashboardDefinition>> {
        self.get_json("/dashboards").await
    }

    async fn delete_dashboard(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/dashboards/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Failed to delete dashboard {}", id))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Dashboard delete failed with status {}: {}", status, body);
        }
        Ok(())
    }
}
