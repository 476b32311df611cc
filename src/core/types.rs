use serde::{Deserialize, Serialize};

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// No usable access token, or the service rejected the one we sent.
    Unauthenticated,
    /// A required remote resource (project, revisions) does not exist.
    NotFound,
    ValidationError,
    RemoteOperationError,
    IoError,
    SerializationError,
    InternalError,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
}

/// Steps of a single release run, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStage {
    ResolvingRevision,
    Submitting,
    StreamingLogs,
    PollingPromotion,
    Succeeded,
    Failed,
}

impl ReleaseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStage::ResolvingRevision => "resolving_revision",
            ReleaseStage::Submitting => "submitting",
            ReleaseStage::StreamingLogs => "streaming_logs",
            ReleaseStage::PollingPromotion => "polling_promotion",
            ReleaseStage::Succeeded => "succeeded",
            ReleaseStage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
