//! Deployment list/form controller
//!
//! The single stateful view of the tool: loads the existing deployment
//! configurations, reconciles the live change feed into local state, and
//! drives the creation form.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::errors::PluginError;
use crate::models::config::{DeploymentConfig, DraftConfig, Team};
use crate::pages::PagesApiExt;
use crate::store::documents::DocumentStore;
use crate::sync::reconcile::apply_change;
use crate::tool::notify::{Notifier, Toast};

/// Controller state shared with the change-feed listener
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub is_loading: bool,
    pub is_submitting: bool,
    pub is_form_open: bool,

    /// Configurations ordered by creation time ascending
    pub deploys: Vec<DeploymentConfig>,

    /// Draft for the creation form
    pub pending: DraftConfig,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            is_loading: true,
            is_submitting: false,
            is_form_open: false,
            deploys: Vec::new(),
            pending: DraftConfig::default(),
        }
    }
}

/// List rendering contract
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    /// Initial load still in flight
    Loading,

    /// Loaded, nothing configured yet: show the call-to-action
    Empty,

    /// One row per configuration
    Rows(Vec<DeploymentConfig>),
}

impl ControllerState {
    pub fn list_view(&self) -> ListView {
        if self.is_loading {
            ListView::Loading
        } else if self.deploys.is_empty() {
            ListView::Empty
        } else {
            ListView::Rows(self.deploys.clone())
        }
    }

    /// The submit control is disabled while submitting or while any
    /// required draft field is empty
    pub fn can_submit(&self) -> bool {
        !self.is_submitting && self.pending.is_submittable()
    }
}

/// Owns the listener task; aborts it on drop
struct ListenerGuard {
    task: JoinHandle<()>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The deployment list/form controller
pub struct DeployController {
    store: Arc<dyn DocumentStore>,
    pages: Arc<dyn PagesApiExt>,
    notifier: Notifier,
    state: Arc<RwLock<ControllerState>>,
    listener: Mutex<Option<ListenerGuard>>,
}

impl DeployController {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        pages: Arc<dyn PagesApiExt>,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            pages,
            notifier,
            state: Arc::new(RwLock::new(ControllerState::default())),
            listener: Mutex::new(None),
        }
    }

    /// Current state snapshot for rendering
    pub async fn snapshot(&self) -> ControllerState {
        self.state.read().await.clone()
    }

    pub async fn open_form(&self) {
        self.state.write().await.is_form_open = true;
    }

    pub async fn close_form(&self) {
        self.state.write().await.is_form_open = false;
    }

    /// Edit the pending draft in place
    pub async fn edit_draft<F>(&self, edit: F)
    where
        F: FnOnce(&mut DraftConfig),
    {
        edit(&mut self.state.write().await.pending);
    }

    /// Load existing configurations and subscribe to the change feed.
    ///
    /// The subscription and its listener task are released by [`unmount`]
    /// (or when the controller is dropped); no state updates happen after
    /// release.
    ///
    /// [`unmount`]: DeployController::unmount
    pub async fn mount(&self) -> Result<(), PluginError> {
        let deploys = self.store.fetch().await?;
        info!("Loaded {} deployment configuration(s)", deploys.len());

        {
            let mut state = self.state.write().await;
            state.deploys = deploys;
            state.is_loading = false;
        }

        let mut subscription = self.store.listen().await?;
        let state = self.state.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.next_event().await {
                let mut state = state.write().await;
                apply_change(&mut state.deploys, &event);
            }
        });

        let mut listener = self.listener.lock().await;
        *listener = Some(ListenerGuard { task });
        Ok(())
    }

    /// Release the change-feed subscription
    pub async fn unmount(&self) {
        self.listener.lock().await.take();
    }

    /// Validate the draft, resolve the team when a slug was entered, and
    /// create the configuration document.
    ///
    /// Team-resolution and create failures are recovered locally: one
    /// error toast, the submitting flag reset, no document created (for
    /// the former) and the draft preserved for a manual retry.
    pub async fn submit(&self) -> Result<(), PluginError> {
        let draft = {
            let mut state = self.state.write().await;
            if state.is_submitting {
                return Err(PluginError::ValidationError(
                    "a submission is already in flight".to_string(),
                ));
            }
            if !state.pending.is_submittable() {
                return Err(PluginError::ValidationError(
                    "project, url and token are required".to_string(),
                ));
            }
            state.is_submitting = true;
            state.pending.clone()
        };

        // Resolve the team id once so every later request can be scoped
        // to the team that owns the project.
        let team = if draft.team.is_empty() {
            None
        } else {
            match self.pages.resolve_team(&draft.team, &draft.token).await {
                Ok(info) => Some(Team {
                    slug: draft.team.clone(),
                    name: info.name,
                    id: info.id,
                }),
                Err(e) => {
                    error!("Team lookup failed: {}", e);
                    self.state.write().await.is_submitting = false;
                    self.notifier.push(Toast::error(
                        "No Team found!",
                        "Make sure the token you provided is valid and that the team's slug corresponds to the one you see in Pages",
                    ));
                    return Ok(());
                }
            }
        };

        let title = draft.title.clone();
        let document = draft.into_document(team);

        match self.store.create(&document).await {
            Ok(created) => {
                info!("Created deployment configuration {}", created.id);
                self.notifier.push(Toast::success(
                    "Success!",
                    &format!("Created Deployment: {}", title),
                ));

                let mut state = self.state.write().await;
                state.is_form_open = false;
                state.is_submitting = false;
                state.pending = DraftConfig::default();
                Ok(())
            }
            Err(e) => {
                error!("Failed to create deployment configuration: {}", e);
                self.state.write().await.is_submitting = false;
                self.notifier.push(Toast::error(
                    "Deployment not created",
                    "The document store rejected the new configuration",
                ));
                Ok(())
            }
        }
    }
}
