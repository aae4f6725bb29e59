//! Per-row deployment item handle
//!
//! Wraps one deployment configuration: triggers its deploy hook, refreshes
//! build status from the deployments API and deletes its document.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::errors::PluginError;
use crate::models::config::DeploymentConfig;
use crate::models::deployment::{DeployState, Deployment};
use crate::pages::PagesApiExt;
use crate::store::documents::DocumentStore;
use crate::tool::notify::{Notifier, Toast};

/// Build status of an item row
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    /// No status fetched yet
    Loading,

    /// The project has no deployments yet
    None,

    /// Latest known deployment
    Deployed(Deployment),
}

impl ItemStatus {
    pub fn state(&self) -> Option<DeployState> {
        match self {
            ItemStatus::Deployed(deployment) => Some(deployment.state),
            _ => None,
        }
    }
}

/// Handle around one deployment configuration row
pub struct DeployItem {
    config: DeploymentConfig,
    pages: Arc<dyn PagesApiExt>,
    store: Arc<dyn DocumentStore>,
    notifier: Notifier,
    status: RwLock<ItemStatus>,
}

impl DeployItem {
    pub fn new(
        config: DeploymentConfig,
        pages: Arc<dyn PagesApiExt>,
        store: Arc<dyn DocumentStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            config,
            pages,
            store,
            notifier,
            status: RwLock::new(ItemStatus::Loading),
        }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    /// Last known status
    pub async fn status(&self) -> ItemStatus {
        self.status.read().await.clone()
    }

    /// Fetch the most recent deployment for this configuration's project
    pub async fn refresh_status(&self) -> Result<ItemStatus, PluginError> {
        let team_id = self.config.team.as_ref().map(|team| team.id.as_str());
        let latest = self
            .pages
            .latest_deployment(&self.config.project, team_id, &self.config.token)
            .await?;

        let status = match latest {
            Some(deployment) => ItemStatus::Deployed(deployment),
            None => ItemStatus::None,
        };

        *self.status.write().await = status.clone();
        Ok(status)
    }

    /// Invoke the deploy hook for this configuration
    pub async fn trigger(&self) -> Result<(), PluginError> {
        match self.pages.trigger_hook(&self.config.url).await {
            Ok(()) => {
                info!("Triggered deploy for {}", self.config.project);
                self.notifier.push(Toast::success(
                    "Success!",
                    &format!("Triggered Deployment: {}", self.config.name),
                ));
                Ok(())
            }
            Err(e) => {
                error!("Deploy trigger failed: {}", e);
                self.notifier.push(Toast::error(
                    "Deploy Failed",
                    "The deploy hook could not be invoked",
                ));
                Err(e)
            }
        }
    }

    /// Delete this configuration's document. Rejected when the delete
    /// action is disabled for the row; the list only observes the
    /// deletion through the change feed.
    pub async fn delete(&self) -> Result<(), PluginError> {
        if self.config.disable_delete_action {
            return Err(PluginError::ValidationError(format!(
                "delete action is disabled for {}",
                self.config.name
            )));
        }

        self.store.delete(&self.config.id).await?;
        info!("Deleted deployment configuration {}", self.config.id);
        self.notifier.push(Toast::success(
            "Success!",
            &format!("Deleted Deployment: {}", self.config.name),
        ));
        Ok(())
    }
}
