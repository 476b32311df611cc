use serde::{Deserialize, Serialize};

pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

pub const DEFAULT_API_URL: &str = "https://api.launchpad.dev/v0";
pub const DEFAULT_BUILDER_URL: &str = "https://launchpad.dev/builder";

/// Main Launchpad configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LaunchpadConfig {
    /// Remote service endpoints
    #[serde(default)]
    pub api: ApiConfig,
}

/// Remote service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the release API
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Dashboard URL users are sent to when a status check fails
    #[serde(default = "default_builder_url")]
    pub builder_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            builder_url: default_builder_url(),
        }
    }
}

impl ApiConfig {
    /// Dashboard page for a single project.
    pub fn project_dashboard_url(&self, project_id: &str) -> String {
        format!(
            "{}/{}/develop",
            self.builder_url.trim_end_matches('/'),
            project_id
        )
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_builder_url() -> String {
    DEFAULT_BUILDER_URL.to_string()
}

/// Names inside a project root used for local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    pub dir_name: String,
    pub meta_file: String,
    pub readme_file: String,
}

impl Default for StateLayout {
    fn default() -> Self {
        Self {
            dir_name: ".launchpad".to_string(),
            meta_file: "meta".to_string(),
            readme_file: "README".to_string(),
        }
    }
}

/// Release policy handed to the selector and orchestrator.
///
/// Not read from config.toml or the environment: every release goes to the
/// experimental channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePolicy {
    pub channel: String,
    pub revision_window: usize,
}

impl ReleasePolicy {
    pub const EXPERIMENTAL_CHANNEL: &'static str = "experimental";
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        Self {
            channel: Self::EXPERIMENTAL_CHANNEL.to_string(),
            revision_window: 5,
        }
    }
}
