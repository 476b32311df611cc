use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Path of the project to release (default: current directory)
    #[arg(short = 'd', long, default_value = "./", value_name = "DIR")]
    pub dir: PathBuf,

    /// Project id; read from the project's .launchpad/meta when omitted
    #[arg(short = 'i', long, value_name = "ID")]
    pub id: Option<String>,

    /// Release this revision instead of choosing one
    #[arg(long, value_name = "RID", conflicts_with = "confirm")]
    pub rid: Option<String>,

    /// Version label attached to the release
    #[arg(short = 'v', long, default_value = "", value_name = "VERSION")]
    pub version: String,

    /// List the release on Discovery
    #[arg(long)]
    pub listed: bool,

    /// Skip the prompt and release the latest revision
    #[arg(short = 'c', long)]
    pub confirm: bool,

    /// Release notes
    #[arg(short = 'n', long, default_value = "", value_name = "TEXT")]
    pub notes: String,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Project id on the release service
    #[arg(short = 'i', long, value_name = "ID")]
    pub id: String,

    /// Path of the local project root (default: current directory)
    #[arg(short = 'd', long, default_value = "./", value_name = "DIR")]
    pub dir: PathBuf,

    /// Replace an existing link
    #[arg(long)]
    pub force: bool,
}
