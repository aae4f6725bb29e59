//! Deployment configuration documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document type of deployment configurations
pub const WEBHOOK_TYPE: &str = "webhook_deploy";

/// Namespace prefix for generated document ids. Ids under a path prefix
/// are not publicly enumerable, which keeps tokens and project info off
/// the public query surface.
pub const DOCUMENT_ID_PREFIX: &str = "pages-deploy";

/// Team a project belongs to on the deployment platform.
///
/// The slug is user-entered; name and id are resolved once from the
/// deployments API at creation time and cached on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub slug: String,
    pub name: String,
    pub id: String,
}

/// A deployment configuration document
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Document id, immutable once created
    #[serde(rename = "_id")]
    pub id: String,

    /// Document type discriminator
    #[serde(rename = "_type", default = "default_doc_type")]
    pub doc_type: String,

    /// Creation timestamp, assigned by the store
    #[serde(rename = "_createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Display label
    pub name: String,

    /// Deploy-hook endpoint
    pub url: String,

    /// Target project identifier
    #[serde(rename = "pagesProject")]
    pub project: String,

    /// Team fields are either all absent or all present
    #[serde(rename = "pagesTeam", default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,

    /// Access token, stored in plaintext on the document
    #[serde(rename = "pagesToken")]
    pub token: String,

    /// Hide the delete action for this row
    #[serde(rename = "disableDeleteAction", default)]
    pub disable_delete_action: bool,
}

fn default_doc_type() -> String {
    WEBHOOK_TYPE.to_string()
}

// The token must never reach log output.
impl std::fmt::Debug for DeploymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("project", &self.project)
            .field("team", &self.team)
            .field("token", &"<redacted>")
            .field("disable_delete_action", &self.disable_delete_action)
            .finish()
    }
}

/// Generate a fresh document id under the fixed namespace prefix
pub fn generate_document_id() -> String {
    format!("{}.{}", DOCUMENT_ID_PREFIX, uuid::Uuid::new_v4().simple())
}

/// Pending form value for a new deployment configuration
#[derive(Clone, Default, PartialEq)]
pub struct DraftConfig {
    /// Display title, internal use only
    pub title: String,

    /// Project name as shown in the platform settings
    pub project: String,

    /// Team slug, empty when the project is personal
    pub team: String,

    /// Deploy hook URL
    pub url: String,

    /// Access token
    pub token: String,

    /// Hide the delete action for the created row
    pub disable_delete_action: bool,
}

impl DraftConfig {
    /// Project, url and token are required for a document to be creatable
    pub fn is_submittable(&self) -> bool {
        !self.project.is_empty() && !self.url.is_empty() && !self.token.is_empty()
    }

    /// Build the document to persist, with a fresh id and the resolved team
    pub fn into_document(self, team: Option<Team>) -> DeploymentConfig {
        DeploymentConfig {
            id: generate_document_id(),
            doc_type: WEBHOOK_TYPE.to_string(),
            created_at: None,
            name: self.title,
            url: self.url,
            project: self.project,
            team,
            token: self.token,
            disable_delete_action: self.disable_delete_action,
        }
    }
}

impl std::fmt::Debug for DraftConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftConfig")
            .field("title", &self.title)
            .field("project", &self.project)
            .field("team", &self.team)
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("disable_delete_action", &self.disable_delete_action)
            .finish()
    }
}
