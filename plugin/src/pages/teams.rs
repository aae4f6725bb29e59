//! Team lookup

use serde::Deserialize;

use crate::errors::PluginError;
use crate::pages::client::PagesClient;

/// Team fields resolved from the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInfo {
    pub id: String,
    pub name: String,
}

/// Wire response of the team lookup endpoint
#[derive(Debug, Deserialize)]
struct TeamResponse {
    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    name: Option<String>,
}

impl PagesClient {
    /// Look up a team by slug, authenticated with the user's token.
    ///
    /// A response without an id is an error; a missing name is tolerated
    /// as empty.
    pub async fn fetch_team(&self, slug: &str, token: &str) -> Result<TeamInfo, PluginError> {
        let path = {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            query.append_pair("slug", slug);
            format!("/v2/teams?{}", query.finish())
        };

        let response: TeamResponse = self.get(&path, token).await?;

        let id = response
            .id
            .ok_or_else(|| PluginError::TeamError("no team id found".to_string()))?;

        Ok(TeamInfo {
            id,
            name: response.name.unwrap_or_default(),
        })
    }
}
