//! Client for the external deployments API

pub mod client;
pub mod deployments;
pub mod teams;

use async_trait::async_trait;

use crate::errors::PluginError;
use crate::models::deployment::Deployment;

pub use client::PagesClient;
pub use teams::TeamInfo;

/// Deployments API surface, as a trait for testability
#[async_trait]
pub trait PagesApiExt: Send + Sync {
    /// Resolve a team slug to its id and name
    async fn resolve_team(&self, slug: &str, token: &str) -> Result<TeamInfo, PluginError>;

    /// Fetch the most recent deployment for a project
    async fn latest_deployment(
        &self,
        project: &str,
        team_id: Option<&str>,
        token: &str,
    ) -> Result<Option<Deployment>, PluginError>;

    /// Invoke a deploy hook
    async fn trigger_hook(&self, hook_url: &str) -> Result<(), PluginError>;
}

#[async_trait]
impl PagesApiExt for PagesClient {
    async fn resolve_team(&self, slug: &str, token: &str) -> Result<TeamInfo, PluginError> {
        self.fetch_team(slug, token).await
    }

    async fn latest_deployment(
        &self,
        project: &str,
        team_id: Option<&str>,
        token: &str,
    ) -> Result<Option<Deployment>, PluginError> {
        self.fetch_latest_deployment(project, team_id, token).await
    }

    async fn trigger_hook(&self, hook_url: &str) -> Result<(), PluginError> {
        self.post_deploy_hook(hook_url).await
    }
}
