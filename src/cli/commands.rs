#![allow(clippy::result_large_err)]

use crate::{
    api::{login_info, ApiError, HttpReleaseApi, ReleaseApi, TokenStore},
    cli::args::{LinkArgs, ReleaseArgs},
    core::{
        entities::{ProjectMeta, ReleaseOutcome, ReleaseParams},
        AppError, ConfigLoader, ConsoleReporter, ErrorCategory, LaunchpadConfig,
        ReleaseOrchestrator, Reporter, StateManager,
    },
    human::{is_interactive, ConsoleInterviewer},
};
use std::sync::Arc;

pub const NON_INTERACTIVE_MESSAGE: &str =
    "revision id or confirm flag must be provided in non-interactive mode";

pub async fn release(args: ReleaseArgs) -> Result<(), AppError> {
    if args.rid.is_none() && !args.confirm && !is_interactive() {
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            NON_INTERACTIVE_MESSAGE,
        )
        .with_operation("release")
        .with_suggestion("Pass --rid <revision id> or --confirm."));
    }

    let config = ConfigLoader::load()?;
    let api: Arc<dyn ReleaseApi> = Arc::new(build_api(&config));
    let orchestrator = ReleaseOrchestrator::new(
        api,
        Arc::new(ConsoleInterviewer::new()),
        Arc::new(ConsoleReporter::new()),
    )
    .with_builder_url(config.api.builder_url.clone());

    let params = ReleaseParams {
        project_dir: args.dir,
        project_id: args.id,
        revision_id: args.rid,
        use_latest: args.confirm,
        version: args.version,
        listed: args.listed,
        notes: args.notes,
    };

    match orchestrator.run(params).await? {
        ReleaseOutcome::Released { release_id, listed } => {
            tracing::info!(%release_id, listed, "release finished");
        }
        ReleaseOutcome::LoginRequired => {
            tracing::info!("release stopped: login required");
        }
    }
    Ok(())
}

pub async fn link(args: LinkArgs) -> Result<(), AppError> {
    let reporter = ConsoleReporter::new();
    let current = StateManager::initialize(Some(args.dir.clone()), false)?;

    if let Some(existing) = current.get_meta()? {
        if !args.force && existing.id != args.id {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "{} is already linked to project {}",
                    args.dir.display(),
                    existing.id
                ),
            )
            .with_operation("link project")
            .with_suggestion("Pass --force to replace the existing link."));
        }
    }

    let config = ConfigLoader::load()?;
    let api = build_api(&config);
    let project = match api.get_project(&args.id).await {
        Ok(project) => project,
        Err(ApiError::Unauthenticated) => {
            reporter.report_warning(&login_info());
            return Ok(());
        }
        Err(err) => {
            return Err(AppError::from(err)
                .with_operation("link project")
                .with_context("project_id", args.id.clone()));
        }
    };

    let meta = ProjectMeta::from(project);
    let state = StateManager::initialize(Some(args.dir), true)?;
    state.store_meta(&meta)?;
    state.ensure_gitignored()?;
    tracing::info!(project_id = %meta.id, root = %state.root_dir().display(), "project linked");

    let label = meta.name.as_deref().unwrap_or(meta.id.as_str());
    reporter.report_info(&format!(
        "Linked {} to {}.\nDashboard: {}",
        state.root_dir().display(),
        label,
        config.api.project_dashboard_url(&meta.id)
    ));
    Ok(())
}

fn build_api(config: &LaunchpadConfig) -> HttpReleaseApi {
    HttpReleaseApi::new(&config.api, TokenStore::new())
}
