//! Release flow: resolve a revision, submit the release, stream its build
//! log, then check the promotion status once.
//!
//! Every step runs at most once. A failed step ends the run; re-running the
//! command is the retry policy.
#![allow(clippy::result_large_err)]

use crate::api::{login_info, ApiError, ReleaseApi};
use crate::core::config::{ReleasePolicy, StateLayout, DEFAULT_BUILDER_URL};
use crate::core::entities::{
    CreatedRelease, PromotionStatus, ReleaseOutcome, ReleaseParams, ReleaseRequest,
};
use crate::core::error::{AppError, Reporter};
use crate::core::revision::RevisionSelector;
use crate::core::state::StateManager;
use crate::core::types::{ErrorCategory, ReleaseStage};
use crate::human::Interviewer;
use futures::StreamExt;
use std::sync::Arc;

pub const LATEST_PROMPT: &str = "Do you want to use the latest revision?";

pub struct ReleaseOrchestrator {
    api: Arc<dyn ReleaseApi>,
    interviewer: Arc<dyn Interviewer>,
    reporter: Arc<dyn Reporter>,
    policy: ReleasePolicy,
    layout: StateLayout,
    builder_url: String,
}

impl ReleaseOrchestrator {
    pub fn new(
        api: Arc<dyn ReleaseApi>,
        interviewer: Arc<dyn Interviewer>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        ReleaseOrchestrator {
            api,
            interviewer,
            reporter,
            policy: ReleasePolicy::default(),
            layout: StateLayout::default(),
            builder_url: DEFAULT_BUILDER_URL.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: ReleasePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_layout(mut self, layout: StateLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_builder_url<T: Into<String>>(mut self, builder_url: T) -> Self {
        self.builder_url = builder_url.into();
        self
    }

    /// Drive one release to a terminal state.
    ///
    /// `Ok(LoginRequired)` is returned when the service refuses the release
    /// for lack of credentials. Every `Err` has already been shown to the
    /// user through the reporter.
    pub async fn run(&self, params: ReleaseParams) -> Result<ReleaseOutcome, AppError> {
        self.enter(ReleaseStage::ResolvingRevision);
        let (project_id, revision_id, use_latest) = self
            .resolve(&params)
            .await
            .map_err(|err| self.fail(ReleaseStage::ResolvingRevision, err))?;

        self.reporter
            .report_info(&creating_release_message(params.listed, use_latest));

        self.enter(ReleaseStage::Submitting);
        let request = ReleaseRequest {
            revision_id,
            app_id: project_id.clone(),
            version: params.version.clone(),
            release_notes: params.notes.clone(),
            discovery_list: params.listed,
            channel: self.policy.channel.clone(),
        };
        let created = match self.api.create_release(&request).await {
            Ok(created) => created,
            Err(ApiError::Unauthenticated) => {
                tracing::info!("release submission refused: no access token");
                self.reporter.report_warning(&login_info());
                return Ok(ReleaseOutcome::LoginRequired);
            }
            Err(err) => {
                let err = AppError::with_source(
                    ErrorCategory::RemoteOperationError,
                    format!("Failed to create release: {}", err),
                    err,
                )
                .with_operation("create release");
                return Err(self.fail(ReleaseStage::Submitting, err));
            }
        };
        tracing::info!(release_id = %created.id, revision_id = %request.revision_id, "release created");

        self.enter(ReleaseStage::StreamingLogs);
        self.stream_logs(&created)
            .await
            .map_err(|err| self.fail(ReleaseStage::StreamingLogs, err))?;

        self.enter(ReleaseStage::PollingPromotion);
        let status = self
            .api
            .get_promotion_status(&created.id)
            .await
            .map_err(|err| {
                let err = AppError::with_source(
                    ErrorCategory::RemoteOperationError,
                    format!("Failed to check if release succeeded: {}", err),
                    err,
                )
                .with_operation("get promotion status")
                .with_context("release_id", created.id.clone())
                .with_suggestion(format!(
                    "Please check {} if a new release was created successfully.",
                    self.dashboard_url(&project_id)
                ));
                self.fail(ReleaseStage::PollingPromotion, err)
            })?;

        self.classify(created, status, params.listed)
    }

    /// Project id from the flags or the stored meta, then the revision.
    async fn resolve(&self, params: &ReleaseParams) -> Result<(String, String, bool), AppError> {
        let project_id = match &params.project_id {
            Some(id) => id.clone(),
            None => self.stored_project_id(params)?,
        };

        if let Some(revision_id) = &params.revision_id {
            return Ok((project_id, revision_id.clone(), false));
        }

        let use_latest = if params.use_latest {
            true
        } else {
            self.interviewer.confirm(LATEST_PROMPT).await?
        };

        let selector =
            RevisionSelector::with_policy(self.api.clone(), self.interviewer.clone(), &self.policy);
        let revision = selector.select(&project_id, use_latest).await?;
        self.reporter
            .report_info(&format!("\nSelected revision: {}", revision.tag));

        Ok((project_id, revision.id, use_latest))
    }

    fn stored_project_id(&self, params: &ReleaseParams) -> Result<String, AppError> {
        let state = StateManager::with_layout(
            Some(params.project_dir.clone()),
            false,
            self.layout.clone(),
        )?;
        match state.get_meta()? {
            Some(meta) => Ok(meta.id),
            None => Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "project at {} is not initialized",
                    params.project_dir.display()
                ),
            )
            .with_operation("read project meta")
            .with_suggestion("Run `launchpad link --id <project id>` or pass --id.")),
        }
    }

    /// Forward the release log line by line until the server closes it.
    async fn stream_logs(&self, created: &CreatedRelease) -> Result<(), AppError> {
        let mut lines = self.api.open_release_logs(&created.id).await.map_err(|err| {
            AppError::from(err)
                .with_operation("open release logs")
                .with_context("release_id", created.id.clone())
        })?;

        let mut forwarded = 0usize;
        while let Some(line) = lines.next().await {
            let line = line.map_err(|err| {
                AppError::from(err)
                    .with_operation("read release logs")
                    .with_context("release_id", created.id.clone())
            })?;
            self.reporter.report_log_line(&line);
            forwarded += 1;
        }
        tracing::debug!(release_id = %created.id, forwarded, "release log stream ended");
        Ok(())
    }

    fn classify(
        &self,
        created: CreatedRelease,
        status: PromotionStatus,
        listed: bool,
    ) -> Result<ReleaseOutcome, AppError> {
        if !status.is_complete() {
            let err = AppError::new(
                ErrorCategory::RemoteOperationError,
                format!("release failed: {}", status),
            )
            .with_operation("release")
            .with_context("release_id", created.id)
            .with_context("status", status.as_str())
            .with_suggestion("Failed to create release. Please try again!");
            return Err(self.fail(ReleaseStage::PollingPromotion, err));
        }

        self.enter(ReleaseStage::Succeeded);
        for line in success_summary(listed) {
            self.reporter.report_info(&line);
        }
        Ok(ReleaseOutcome::Released {
            release_id: created.id,
            listed,
        })
    }

    fn enter(&self, stage: ReleaseStage) {
        tracing::debug!(stage = %stage, "release stage");
    }

    /// Move to `Failed`: tag the error with the step it came from and show it.
    fn fail(&self, stage: ReleaseStage, err: AppError) -> AppError {
        let err = if err.stage().is_some() {
            err
        } else {
            err.with_stage(stage)
        };
        self.enter(ReleaseStage::Failed);
        tracing::info!(stage = %stage, category = %err.category, "release failed: {}", err.message);
        if err.is_unauthenticated() {
            self.reporter.report_warning(&login_info());
        } else {
            self.reporter.report_error(&err);
        }
        err.mark_reported()
    }

    fn dashboard_url(&self, project_id: &str) -> String {
        format!("{}/{}/develop", self.builder_url.trim_end_matches('/'), project_id)
    }
}

/// Banner printed right before submission.
pub fn creating_release_message(listed: bool, latest: bool) -> String {
    let listed_info = if listed { " listed" } else { "" };
    let latest_info = if latest { " with the latest Revision" } else { "" };
    format!("\nCreating a{} Release{} ...\n", listed_info, latest_info)
}

pub fn success_summary(listed: bool) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "Lift off -- successfully created a new Release!".to_string(),
        "Your Release is available globally.".to_string(),
        "Anyone can install their own copy of your app.".to_string(),
    ];
    if listed {
        lines.push(LISTED_MESSAGE.to_string());
    }
    lines
}

pub const LISTED_MESSAGE: &str = "Listed on Discovery for others to find!";
