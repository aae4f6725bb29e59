//! Document store capability

use async_trait::async_trait;

use crate::errors::PluginError;
use crate::models::config::{DeploymentConfig, WEBHOOK_TYPE};
use crate::store::changes::Subscription;

/// Query scope for deployment configuration documents: every document of
/// the webhook type, ascending creation order.
pub fn webhook_query() -> String {
    format!("*[_type == \"{}\"] | order(_createdAt)", WEBHOOK_TYPE)
}

/// Host-provided document database client.
///
/// Implementations must honor the scope of [`webhook_query`] for both
/// `fetch` and `listen`, so that the change feed reconciles against the
/// same set of documents the initial load returned.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch all deployment configuration documents, ascending creation order
    async fn fetch(&self) -> Result<Vec<DeploymentConfig>, PluginError>;

    /// Create a single document, returning its stored state
    async fn create(&self, doc: &DeploymentConfig) -> Result<DeploymentConfig, PluginError>;

    /// Delete a document by id
    async fn delete(&self, id: &str) -> Result<(), PluginError>;

    /// Open a change-feed subscription over the same query scope
    async fn listen(&self) -> Result<Subscription, PluginError>;
}
