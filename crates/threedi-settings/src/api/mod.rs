//! Client for the settings endpoints of the 3Di API v3.
//!
//! [`SettingsApi`] is the seam the dispatcher talks to; [`ApiClient`] is the
//! reqwest implementation used by the command line tool.

#[cfg(test)]
pub(crate) mod mock;
pub mod models;
pub mod openapi;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::mapping::ResourceGroup;

pub use models::{
    AggregationSettings, GeneralSettings, NumericalSettings, SimulationSettingsOverview,
    TimeStepSettings,
};

/// Connect timeout of the HTTP client. Requests themselves are not timed out.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote operations used by an import run.
#[async_trait]
pub trait SettingsApi: Send + Sync {
    /// Creates the general settings of a simulation.
    async fn create_general_settings(
        &self,
        simulation_id: i64,
        settings: &GeneralSettings,
    ) -> Result<GeneralSettings>;

    /// Creates the time step settings of a simulation.
    async fn create_time_step_settings(
        &self,
        simulation_id: i64,
        settings: &TimeStepSettings,
    ) -> Result<TimeStepSettings>;

    /// Creates the numerical settings of a simulation.
    async fn create_numerical_settings(
        &self,
        simulation_id: i64,
        settings: &NumericalSettings,
    ) -> Result<NumericalSettings>;

    /// Creates one aggregation settings resource of a simulation.
    async fn create_aggregation_settings(
        &self,
        simulation_id: i64,
        settings: &AggregationSettings,
    ) -> Result<AggregationSettings>;

    /// Retrieves all settings of a simulation.
    async fn settings_overview(&self, simulation_id: i64) -> Result<SimulationSettingsOverview>;
}

/// Creates the HTTP client with a connect timeout only.
#[must_use]
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Checks that the API host is an http(s) URL.
pub fn validate_url(url: &str) -> Result<()> {
    let has_valid_scheme = ["http://", "https://"].iter().any(|s| url.starts_with(s));
    if !has_valid_scheme {
        return Err(Error::Config(format!(
            "Invalid URL scheme in '{}'. Allowed: http, https",
            url
        )));
    }
    if url.len() <= "https://".len() {
        return Err(Error::Config(format!("Invalid URL format: {}", url)));
    }
    Ok(())
}

/// Turns a non-success response into [`Error::Api`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}

/// reqwest implementation of [`SettingsApi`].
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
}

impl ApiClient {
    /// Creates a client for the configured host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host is not an http(s) URL.
    pub fn new(config: ApiConfig) -> Result<Self> {
        validate_url(&config.host)?;
        Ok(Self {
            config,
            client: create_http_client(),
        })
    }

    /// Base URL of the v3 API, without trailing slash.
    fn base_url(&self) -> String {
        let host = self.config.host.trim_end_matches('/');
        if host.ends_with("/v3") {
            host.to_string()
        } else {
            format!("{}/v3", host)
        }
    }

    fn settings_url(&self, simulation_id: i64, group: Option<ResourceGroup>) -> String {
        match group {
            Some(group) => format!(
                "{}/simulations/{}/settings/{}/",
                self.base_url(),
                simulation_id,
                group.as_str()
            ),
            None => format!("{}/simulations/{}/settings/", self.base_url(), simulation_id),
        }
    }

    fn openapi_url(&self) -> String {
        format!("{}/swagger.yaml", self.base_url())
    }

    /// Makes an authenticated request.
    fn build_request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut req = self.client.request(method, url);

        if let Some(token) = &self.config.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        } else if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            req = req.basic_auth(user, Some(pass));
        }

        req
    }

    async fn create<T>(&self, simulation_id: i64, group: ResourceGroup, payload: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        let url = self.settings_url(simulation_id, Some(group));
        debug!("POST {}", url);
        let response = self
            .build_request(Method::POST, &url)
            .json(payload)
            .send()
            .await?;
        let created = check_status(response).await?.json().await?;
        Ok(created)
    }

    /// Downloads the OpenAPI document of the API as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-success status and [`Error::Http`] on
    /// transport failures.
    pub async fn fetch_openapi(&self) -> Result<String> {
        let url = self.openapi_url();
        debug!("GET {}", url);
        let response = self.build_request(Method::GET, &url).send().await?;
        let text = check_status(response).await?.text().await?;
        Ok(text)
    }
}

#[async_trait]
impl SettingsApi for ApiClient {
    async fn create_general_settings(
        &self,
        simulation_id: i64,
        settings: &GeneralSettings,
    ) -> Result<GeneralSettings> {
        self.create(simulation_id, ResourceGroup::General, settings)
            .await
    }

    async fn create_time_step_settings(
        &self,
        simulation_id: i64,
        settings: &TimeStepSettings,
    ) -> Result<TimeStepSettings> {
        self.create(simulation_id, ResourceGroup::TimeStep, settings)
            .await
    }

    async fn create_numerical_settings(
        &self,
        simulation_id: i64,
        settings: &NumericalSettings,
    ) -> Result<NumericalSettings> {
        self.create(simulation_id, ResourceGroup::Numerical, settings)
            .await
    }

    async fn create_aggregation_settings(
        &self,
        simulation_id: i64,
        settings: &AggregationSettings,
    ) -> Result<AggregationSettings> {
        self.create(simulation_id, ResourceGroup::Aggregation, settings)
            .await
    }

    async fn settings_overview(&self, simulation_id: i64) -> Result<SimulationSettingsOverview> {
        let url = self.settings_url(simulation_id, None);
        debug!("GET {}", url);
        let response = self.build_request(Method::GET, &url).send().await?;
        let overview = check_status(response).await?.json().await?;
        Ok(overview)
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
