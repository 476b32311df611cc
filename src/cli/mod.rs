pub mod args;
pub mod commands;

pub use args::{LinkArgs, ReleaseArgs};
use crate::core::AppError;
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(version = crate::VERSION)]
#[command(about = "Link projects and release revisions to the Launchpad build service")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: link a project once, push revisions, then release one of them.\n\nEnvironment:\n    LAUNCHPAD_CONFIG        path to config.toml\n    LAUNCHPAD_API_URL       override api.base_url\n    LAUNCHPAD_BUILDER_URL   override api.builder_url\n    LAUNCHPAD_ACCESS_TOKEN  access token used instead of ~/.launchpad/tokens\n    LAUNCHPAD_LOG_DIR       override logging.log_dir\n    LAUNCHPAD_LOG_CONSOLE   override logging.console_output"
)]
pub struct Args {
    /// Raise diagnostics logging to debug
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Create a release from a revision",
        long_about = "Release submits a revision to the experimental channel, streams the build log, and reports whether the promotion completed.",
        after_help = "Examples:\n    launchpad release --confirm\n    launchpad release --rid r_123 --version 1.2.0 --listed"
    )]
    Release(ReleaseArgs),
    #[command(
        about = "Link a local directory to an existing project",
        long_about = "Link fetches the project, records it in .launchpad/meta, and keeps .launchpad out of git.",
        after_help = "Example:\n    launchpad link --id a_123 --dir ./my-app"
    )]
    Link(LinkArgs),
}

#[allow(clippy::result_large_err)]
pub async fn run(args: Args) -> Result<(), AppError> {
    match args.command {
        Command::Release(release_args) => commands::release(release_args).await,
        Command::Link(link_args) => commands::link(link_args).await,
    }
}
