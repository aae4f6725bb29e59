//! Plugin registration
//!
//! Pure composition: merge user-supplied overrides over defaults and
//! expose one tool entry mounted at a wildcard route under the host's
//! tool-routing scheme.

/// Route pattern a tool is mounted under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pattern: String,
}

impl Route {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Icon shown next to the tool entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolIcon {
    /// Built-in deploy glyph
    #[default]
    Deploy,

    /// Host-supplied icon asset
    Custom(String),
}

/// User-supplied overrides for the tool entry
#[derive(Debug, Clone, Default)]
pub struct DeployToolOptions {
    pub name: Option<String>,
    pub title: Option<String>,
    pub icon: Option<ToolIcon>,
}

/// One tool entry mounted in the host studio
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: String,
    pub title: String,
    pub icon: ToolIcon,
    pub router: Route,
}

/// Plugin definition handed to the host
#[derive(Debug, Clone)]
pub struct Plugin {
    pub name: String,
    pub tools: Vec<Tool>,
}

/// Plugin name registered with the host
pub const PLUGIN_NAME: &str = "studio-pages-deploy";

/// Default tool name
pub const DEFAULT_TOOL_NAME: &str = "cloudflare-pages-deploy";

/// Default tool title
pub const DEFAULT_TOOL_TITLE: &str = "Deploy";

/// Build the plugin definition, merging user overrides over defaults
pub fn pages_deploy_tool(options: Option<DeployToolOptions>) -> Plugin {
    let options = options.unwrap_or_default();

    Plugin {
        name: PLUGIN_NAME.to_string(),
        tools: vec![Tool {
            name: options.name.unwrap_or_else(|| DEFAULT_TOOL_NAME.to_string()),
            title: options.title.unwrap_or_else(|| DEFAULT_TOOL_TITLE.to_string()),
            icon: options.icon.unwrap_or_default(),
            router: Route::new("/*"),
        }],
    }
}
