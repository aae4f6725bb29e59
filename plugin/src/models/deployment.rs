//! Build status models for the deployments API

use serde::{Deserialize, Serialize};

/// Build state reported by the deployments API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeployState {
    Error,
    Initiated,
    Canceled,
    Ready,
    Building,
    Queued,
}

impl DeployState {
    /// Whether a build in this state can still change on its own
    pub fn is_in_progress(&self) -> bool {
        matches!(self, DeployState::Initiated | DeployState::Building | DeployState::Queued)
    }
}

/// Account that started a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Source-control metadata attached to a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployMeta {
    #[serde(rename = "githubCommitMessage", default, skip_serializing_if = "Option::is_none")]
    pub github_commit_message: Option<String>,

    #[serde(rename = "githubCommitRef", default, skip_serializing_if = "Option::is_none")]
    pub github_commit_ref: Option<String>,
}

/// A single deployment returned by the deployments API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub uid: String,

    #[serde(default)]
    pub created: String,

    pub state: DeployState,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub creator: Creator,

    #[serde(default)]
    pub meta: DeployMeta,
}
