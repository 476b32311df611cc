//! Remote release service: the collaborator surface used by the core and
//! its HTTP implementation.
use crate::core::entities::{CreatedRelease, ProjectInfo, PromotionStatus, ReleaseRequest, Revision};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub mod auth;
pub mod client;

pub use auth::{login_info, TokenStore};
pub use client::HttpReleaseApi;

/// Line-oriented release log. Dropping the stream closes the underlying connection.
pub type LogLines = BoxStream<'static, Result<String, ApiError>>;

/// Error types for release service operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no access token found")]
    Unauthenticated,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server returned status {status}: {body}")]
    Server { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("log stream error: {0}")]
    Stream(String),
}

impl ApiError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}

/// Operations the release flow needs from the remote service.
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    /// Revisions of a project, newest first.
    async fn fetch_revisions(&self, project_id: &str) -> Result<Vec<Revision>, ApiError>;

    async fn create_release(&self, request: &ReleaseRequest) -> Result<CreatedRelease, ApiError>;

    async fn open_release_logs(&self, release_id: &str) -> Result<LogLines, ApiError>;

    async fn get_promotion_status(&self, release_id: &str) -> Result<PromotionStatus, ApiError>;

    async fn get_project(&self, project_id: &str) -> Result<ProjectInfo, ApiError>;
}
