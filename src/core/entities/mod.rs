use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use crate::core::types::{ErrorCategory, ErrorSeverity, ReleaseStage};

/// Identity of a linked project, persisted in the hidden state directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Fields written by other tooling; kept so a rewrite never drops them.
    /// Never holds `id`, `name` or `alias`: those keys are dropped on store.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ProjectMeta {
    pub fn new<T: Into<String>>(id: T) -> Self {
        ProjectMeta {
            id: id.into(),
            name: None,
            alias: None,
            extra: BTreeMap::new(),
        }
    }

    /// Copy without `extra` entries that would collide with a typed field when encoded.
    pub fn canonical(&self) -> ProjectMeta {
        let mut meta = self.clone();
        meta.extra
            .retain(|key, _| !Self::RESERVED_KEYS.contains(&key.as_str()));
        meta
    }

    pub const RESERVED_KEYS: [&'static str; 3] = ["id", "name", "alias"];
}

impl From<ProjectInfo> for ProjectMeta {
    fn from(info: ProjectInfo) -> Self {
        ProjectMeta {
            id: info.id,
            name: info.name,
            alias: info.alias,
            extra: BTreeMap::new(),
        }
    }
}

/// Project as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Immutable, server-assigned unit of buildable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Revision {
    pub fn new<I: Into<String>, T: Into<String>>(id: I, tag: T) -> Self {
        Revision {
            id: id.into(),
            tag: tag.into(),
            created_at: None,
        }
    }
}

/// Body of the create-release call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRequest {
    pub revision_id: String,
    pub app_id: String,
    pub version: String,
    pub release_notes: String,
    pub discovery_list: bool,
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRelease {
    pub id: String,
}

/// Terminal promotion status string as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromotionStatus(pub String);

impl PromotionStatus {
    pub const COMPLETE: &'static str = "complete";

    pub fn new<T: Into<String>>(status: T) -> Self {
        PromotionStatus(status.into())
    }

    pub fn is_complete(&self) -> bool {
        self.0 == Self::COMPLETE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inputs of one `release` invocation after flag parsing.
#[derive(Debug, Clone, Default)]
pub struct ReleaseParams {
    pub project_dir: PathBuf,
    pub project_id: Option<String>,
    pub revision_id: Option<String>,
    pub use_latest: bool,
    pub version: String,
    pub listed: bool,
    pub notes: String,
}

/// Non-failing end states of a release run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released { release_id: String, listed: bool },
    /// Submission was refused for lack of credentials; guidance was printed.
    LoginRequired,
}
