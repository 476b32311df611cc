#![allow(clippy::result_large_err)]

use crate::api::{login_info, ApiError, ReleaseApi};
use crate::core::config::ReleasePolicy;
use crate::core::entities::Revision;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::human::Interviewer;
use std::sync::Arc;

pub const CHOOSE_PROMPT: &str = "Choose a revision (most recent revisions):";

/// Resolves a project's revisions to exactly one, automatically or by asking.
pub struct RevisionSelector {
    api: Arc<dyn ReleaseApi>,
    interviewer: Arc<dyn Interviewer>,
    window: usize,
}

impl RevisionSelector {
    pub fn new(api: Arc<dyn ReleaseApi>, interviewer: Arc<dyn Interviewer>) -> Self {
        Self::with_policy(api, interviewer, &ReleasePolicy::default())
    }

    pub fn with_policy(
        api: Arc<dyn ReleaseApi>,
        interviewer: Arc<dyn Interviewer>,
        policy: &ReleasePolicy,
    ) -> Self {
        RevisionSelector {
            api,
            interviewer,
            window: policy.revision_window.max(1),
        }
    }

    /// Pick a revision of `project_id`.
    ///
    /// With `use_latest` the newest revision is returned without prompting;
    /// otherwise the user chooses among the newest `window` revisions.
    pub async fn select(&self, project_id: &str, use_latest: bool) -> Result<Revision, AppError> {
        let revisions = match self.api.fetch_revisions(project_id).await {
            Ok(revisions) => revisions,
            Err(ApiError::Unauthenticated) => {
                return Err(AppError::from(ApiError::Unauthenticated)
                    .with_operation("fetch revisions")
                    .with_suggestion(login_info()))
            }
            Err(err) => {
                return Err(AppError::with_source(
                    ErrorCategory::RemoteOperationError,
                    format!("Failed to get revisions: {}", err),
                    err,
                )
                .with_operation("fetch revisions"))
            }
        };

        if revisions.is_empty() {
            return Err(AppError::new(ErrorCategory::NotFound, "No revisions found.")
                .with_operation("fetch revisions")
                .with_suggestion("Create a revision first by running `launchpad push`."));
        }

        let mut window: Vec<Revision> = revisions.into_iter().take(self.window).collect();
        if use_latest {
            return Ok(window.swap_remove(0));
        }

        let labels = choice_labels(&window);
        let chosen = self.interviewer.ask_choice(CHOOSE_PROMPT, &labels).await?;
        tracing::debug!(project_id, label = %chosen, "revision chosen");

        let index = labels.iter().position(|label| *label == chosen).ok_or_else(|| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("no revision tagged {:?} among the most recent revisions", chosen),
            )
            .with_operation("select revision")
        })?;
        Ok(window.swap_remove(index))
    }
}

/// One label per revision: the tag, or `tag (id)` when the tag repeats in the window.
fn choice_labels(window: &[Revision]) -> Vec<String> {
    window
        .iter()
        .map(|revision| {
            let repeats = window.iter().filter(|other| other.tag == revision.tag).count() > 1;
            if repeats {
                format!("{} ({})", revision.tag, revision.id)
            } else {
                revision.tag.clone()
            }
        })
        .collect()
}
