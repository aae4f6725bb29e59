//! Deployment status and deploy-hook triggers

use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use crate::errors::PluginError;
use crate::models::deployment::Deployment;
use crate::pages::client::PagesClient;

/// Wire response of the deployments list endpoint
#[derive(Debug, Deserialize)]
struct DeploymentListResponse {
    #[serde(default)]
    deployments: Vec<Deployment>,
}

impl PagesClient {
    /// Fetch the most recent deployment for a project, scoped to a team
    /// when the configuration has one
    pub async fn fetch_latest_deployment(
        &self,
        project: &str,
        team_id: Option<&str>,
        token: &str,
    ) -> Result<Option<Deployment>, PluginError> {
        let path = {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            query.append_pair("projectId", project);
            query.append_pair("limit", "1");
            if let Some(team_id) = team_id {
                query.append_pair("teamId", team_id);
            }
            format!("/v6/deployments?{}", query.finish())
        };

        let response: DeploymentListResponse = self.get(&path, token).await?;
        Ok(response.deployments.into_iter().next())
    }

    /// Invoke a deploy hook. The hook URL is self-authorizing, so no
    /// bearer header is sent.
    pub async fn post_deploy_hook(&self, hook_url: &str) -> Result<(), PluginError> {
        let url = Url::parse(hook_url)
            .map_err(|e| PluginError::ValidationError(format!("invalid deploy hook url: {e}")))?;
        debug!("POST {}", url);

        let response = self.http().post(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Deploy hook failed: {} - {}", status, body);
            return Err(PluginError::ApiError(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}
