//! HTTP client for the deployments API

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::errors::PluginError;

/// Default base URL of the deployments API
pub const DEFAULT_API_BASE: &str = "https://api.vercel.com";

/// HTTP client for the deployments API
pub struct PagesClient {
    client: Client,
    base_url: String,
}

impl PagesClient {
    /// Create a new client against the default API base
    pub fn new() -> Result<Self, PluginError> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Create a new client against a custom API base
    pub fn with_base_url(base_url: &str) -> Result<Self, PluginError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Make a GET request authenticated with a bearer token
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, PluginError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP GET failed: {} - {}", status, body);
            return Err(PluginError::ApiError(format!("{}: {}", status, body)));
        }

        let body = response.json().await?;
        Ok(body)
    }
}
