use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::gateway::UserGateway;
use crate::core::config::ApiConfig;
use crate::core::error::{GatewayError, TransportError};
use crate::models::status::{BulkLoadResponse, BulkLoadResult, DataStatus};
use crate::models::user::User;

/// HTTP client for the user service
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .context(format!("Invalid API base URL: {}", base_url))?;

        if base_url.cannot_be_a_base() {
            bail!("API base URL must be hierarchical: {}", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let mut request = self.client.get(url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }

        debug!(url = %url, "GET");
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }

        Ok(response.json::<T>().await?)
    }

    async fn post_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        debug!(url = %url, "POST");
        let response = self.client.post(url).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }

        Ok(response.json::<T>().await?)
    }
}

fn log_failure(operation: &'static str, err: &GatewayError) {
    warn!(
        operation,
        error = %err,
        cause = %err.cause(),
        timeout = err.cause().is_timeout(),
        "User service call failed"
    );
}

impl UserGateway for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<User>, GatewayError> {
        self.get_json(self.endpoint(&["users"]), &[])
            .await
            .map_err(GatewayError::fetch_all)
            .inspect_err(|e| log_failure("fetch_all", e))
    }

    async fn fetch_by_id(&self, id: u64) -> Result<User, GatewayError> {
        let id = id.to_string();
        self.get_json(self.endpoint(&["users", id.as_str()]), &[])
            .await
            .map_err(GatewayError::fetch_one)
            .inspect_err(|e| log_failure("fetch_by_id", e))
    }

    async fn fetch_by_email(&self, email: &str) -> Result<User, GatewayError> {
        self.get_json(self.endpoint(&["users", "email", email]), &[])
            .await
            .map_err(GatewayError::fetch_one)
            .inspect_err(|e| log_failure("fetch_by_email", e))
    }

    async fn search(&self, term: &str) -> Result<Vec<User>, GatewayError> {
        // an empty term is sent without `q` at all
        let mut query = Vec::with_capacity(1);
        if !term.is_empty() {
            query.push(("q", term));
        }

        self.get_json(self.endpoint(&["users", "search"]), &query)
            .await
            .map_err(GatewayError::Search)
            .inspect_err(|e| log_failure("search", e))
    }

    async fn trigger_bulk_load(&self) -> Result<BulkLoadResult, GatewayError> {
        let result = self
            .post_json::<BulkLoadResponse>(self.endpoint(&["data", "load"]))
            .await
            .and_then(|body| {
                if body.success {
                    Ok(BulkLoadResult {
                        loaded_count: body.loaded_count,
                        message: body.message,
                    })
                } else {
                    Err(TransportError::Rejected(body.message))
                }
            });

        result
            .map_err(GatewayError::Load)
            .inspect_err(|e| log_failure("trigger_bulk_load", e))
    }

    async fn get_status(&self) -> Result<DataStatus, GatewayError> {
        self.get_json(self.endpoint(&["data", "status"]), &[])
            .await
            .map_err(GatewayError::Status)
            .inspect_err(|e| log_failure("get_status", e))
    }
}
