//! reqwest implementation of [`EmployeeApi`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ApiError, EmployeeApi};
use crate::config::ApiConfig;
use crate::types::{BasicInfo, Department, Details, Location};

/// HTTP client for the two backend services
pub struct HttpEmployeeApi {
    client: Client,
    basic_info_url: String,
    details_url: String,
}

impl HttpEmployeeApi {
    /// Create a client for explicit base URLs
    pub fn new(basic_info_url: impl Into<String>, details_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), basic_info_url, details_url)
    }

    /// Create a client from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::network("client", e.to_string()))?;
        Ok(Self::with_client(
            client,
            &config.basic_info_url,
            &config.details_url,
        ))
    }

    fn with_client(
        client: Client,
        basic_info_url: impl Into<String>,
        details_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            basic_info_url: basic_info_url.into().trim_end_matches('/').to_string(),
            details_url: details_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Send a request and decode the JSON body
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!(endpoint, "backend request");

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(endpoint, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body
            };
            return Err(ApiError::http(endpoint, status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::decode(endpoint, e.to_string()))
    }

    /// `name_like` filter, omitted entirely for an empty search
    fn search_params(query: &str) -> Vec<(&'static str, &str)> {
        if query.is_empty() {
            Vec::new()
        } else {
            vec![("name_like", query)]
        }
    }
}

#[async_trait]
impl EmployeeApi for HttpEmployeeApi {
    async fn list_basic_info(&self) -> Result<Vec<BasicInfo>, ApiError> {
        let url = format!("{}/basicInfo", self.basic_info_url);
        self.send("GET /basicInfo", self.client.get(url)).await
    }

    async fn create_basic_info(&self, record: &BasicInfo) -> Result<BasicInfo, ApiError> {
        let url = format!("{}/basicInfo", self.basic_info_url);
        self.send("POST /basicInfo", self.client.post(url).json(record))
            .await
    }

    async fn list_details(&self) -> Result<Vec<Details>, ApiError> {
        let url = format!("{}/details", self.details_url);
        self.send("GET /details", self.client.get(url)).await
    }

    async fn create_details(&self, record: &Details) -> Result<Details, ApiError> {
        let url = format!("{}/details", self.details_url);
        self.send("POST /details", self.client.post(url).json(record))
            .await
    }

    async fn search_departments(&self, query: &str) -> Result<Vec<Department>, ApiError> {
        let url = format!("{}/departments", self.basic_info_url);
        let request = self.client.get(url).query(&Self::search_params(query));
        self.send("GET /departments", request).await
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, ApiError> {
        let url = format!("{}/locations", self.details_url);
        let request = self.client.get(url).query(&Self::search_params(query));
        self.send("GET /locations", request).await
    }
}
