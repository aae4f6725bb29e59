//! Content-lake document store
//!
//! HTTP-backed implementation of the document store: queries and mutations
//! go through the data API, the change feed is the listen endpoint's
//! server-sent-events stream.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::errors::PluginError;
use crate::models::config::DeploymentConfig;
use crate::store::changes::{ChangeEvent, MutationKind, Subscription};
use crate::store::documents::{webhook_query, DocumentStore};

/// Pinned data API version
pub const API_VERSION: &str = "2024-05-10";

/// Content-lake connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentLakeConfig {
    /// Project identifier
    pub project_id: String,

    /// Dataset holding the deployment documents
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Data API version date
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Token with read/write access to the dataset
    #[serde(default)]
    pub token: Option<String>,

    /// Override of the API base URL; derived from the project id when absent
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

impl ContentLakeConfig {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            dataset: default_dataset(),
            api_version: default_api_version(),
            token: None,
            base_url: None,
        }
    }

    fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }

    fn data_url(&self, endpoint: &str) -> String {
        format!(
            "{}/v{}/data/{}/{}",
            self.base_url(),
            self.api_version,
            endpoint,
            self.dataset
        )
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Vec<DeploymentConfig>,
}

#[derive(Debug, Serialize)]
struct MutatePayload<'a> {
    mutations: Vec<MutationPayload<'a>>,
}

#[derive(Debug, Serialize)]
enum MutationPayload<'a> {
    #[serde(rename = "create")]
    Create(&'a DeploymentConfig),

    #[serde(rename = "delete")]
    Delete(DeleteById),
}

#[derive(Debug, Serialize)]
struct DeleteById {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, Deserialize)]
struct MutateResult {
    #[serde(default)]
    document: Option<DeploymentConfig>,
}

/// Mutation event payload of the listen endpoint. Entries of `mutations`
/// are objects keyed by their mutation kind.
#[derive(Debug, Deserialize)]
struct MutationMessage {
    #[serde(rename = "documentId")]
    document_id: String,

    #[serde(default)]
    mutations: Vec<serde_json::Value>,

    #[serde(default)]
    result: Option<DeploymentConfig>,
}

fn parse_mutation_frame(data: &str) -> Result<ChangeEvent, PluginError> {
    let message: MutationMessage = serde_json::from_str(data)?;

    let mut kinds = Vec::new();
    for entry in &message.mutations {
        if entry.get("create").is_some() {
            kinds.push(MutationKind::Create);
        }
        if entry.get("patch").is_some() {
            kinds.push(MutationKind::Patch);
        }
        if entry.get("delete").is_some() {
            kinds.push(MutationKind::Delete);
        }
    }

    Ok(ChangeEvent {
        document_id: message.document_id,
        mutations: kinds,
        result: message.result,
    })
}

/// Incremental server-sent-events frame parser
#[derive(Debug, Default)]
struct SseParser {
    buffer: String,
}

#[derive(Debug, PartialEq, Eq)]
struct SseFrame {
    event: String,
    data: String,
}

impl SseParser {
    /// Feed a transport chunk, returning every frame completed by it
    fn push(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..pos + 2).collect();
            if let Some(frame) = Self::parse_frame(&raw) {
                frames.push(frame);
            }
        }
        frames
    }

    fn parse_frame(raw: &str) -> Option<SseFrame> {
        let mut event = String::new();
        let mut data: Vec<&str> = Vec::new();

        for line in raw.lines() {
            if let Some(rest) = line.strip_prefix("event:") {
                event = rest.trim_start().to_string();
            } else if let Some(rest) = line.strip_prefix("data:") {
                data.push(rest.strip_prefix(' ').unwrap_or(rest));
            }
            // comment keep-alives and id lines are ignored
        }

        if event.is_empty() && data.is_empty() {
            return None;
        }

        Some(SseFrame {
            event,
            data: data.join("\n"),
        })
    }
}

/// Document store backed by the studio's content-lake HTTP API
pub struct ContentLakeStore {
    client: Client,
    listen_client: Client,
    config: ContentLakeConfig,
}

impl ContentLakeStore {
    pub fn new(config: ContentLakeConfig) -> Result<Self, PluginError> {
        if config.project_id.is_empty() && config.base_url.is_none() {
            return Err(PluginError::ConfigError(
                "project id is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        // The listen stream is long-lived; only the connect phase is bounded.
        let listen_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            listen_client,
            config,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn mutate(&self, payload: &MutatePayload<'_>) -> Result<MutateResponse, PluginError> {
        let url = self.config.data_url("mutate");
        debug!("POST {}", url);

        let response = self
            .authorize(
                self.client
                    .post(&url)
                    .query(&[("returnDocuments", "true")])
                    .json(payload),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Mutate failed: {} - {}", status, body);
            return Err(PluginError::StoreError(format!("{}: {}", status, body)));
        }

        let body = response.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl DocumentStore for ContentLakeStore {
    async fn fetch(&self) -> Result<Vec<DeploymentConfig>, PluginError> {
        let url = self.config.data_url("query");
        debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url).query(&[("query", webhook_query())]))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Query failed: {} - {}", status, body);
            return Err(PluginError::StoreError(format!("{}: {}", status, body)));
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.result)
    }

    async fn create(&self, doc: &DeploymentConfig) -> Result<DeploymentConfig, PluginError> {
        let payload = MutatePayload {
            mutations: vec![MutationPayload::Create(doc)],
        };

        let response = self.mutate(&payload).await?;
        let created = response
            .results
            .into_iter()
            .find_map(|result| result.document)
            .unwrap_or_else(|| doc.clone());

        info!("Created deployment configuration {}", created.id);
        Ok(created)
    }

    async fn delete(&self, id: &str) -> Result<(), PluginError> {
        let payload = MutatePayload {
            mutations: vec![MutationPayload::Delete(DeleteById { id: id.to_string() })],
        };

        self.mutate(&payload).await?;
        info!("Deleted deployment configuration {}", id);
        Ok(())
    }

    async fn listen(&self) -> Result<Subscription, PluginError> {
        let url = self.config.data_url("listen");
        debug!("GET {} (listen)", url);

        let response = self
            .authorize(
                self.listen_client
                    .get(&url)
                    .query(&[
                        ("query", webhook_query()),
                        ("includeResult", "true".to_string()),
                    ])
                    .header(header::ACCEPT, "text/event-stream"),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(PluginError::ListenError(format!(
                "listen rejected: {}",
                status
            )));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut stream = Box::pin(response.bytes_stream());

        let feed_task = tokio::spawn(async move {
            let mut parser = SseParser::default();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!("Change feed transport error: {}", e);
                        break;
                    }
                };

                for frame in parser.push(&String::from_utf8_lossy(&chunk)) {
                    if frame.event != "mutation" {
                        continue;
                    }

                    match parse_mutation_frame(&frame.data) {
                        Ok(event) => {
                            if tx.send(event).is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!("Skipping malformed change event: {}", e),
                    }
                }
            }

            info!("Change feed ended");
        });

        Ok(Subscription::new(rx, feed_task))
    }
}
