pub mod config;
pub mod entities;
pub mod error;
pub mod release;
pub mod revision;
pub mod state;
pub mod types;

pub use config::{ApiConfig, ConfigLoader, ConfigValidator, LaunchpadConfig, ReleasePolicy, StateLayout};
pub use entities::{
    CreatedRelease, ProjectInfo, ProjectMeta, PromotionStatus, ReleaseOutcome, ReleaseParams,
    ReleaseRequest, Revision,
};
pub use error::{AppError, ConsoleReporter, Reporter};
pub use release::ReleaseOrchestrator;
pub use revision::RevisionSelector;
pub use state::StateManager;
pub use types::*;
