use crate::core::error::AppError;
use async_trait::async_trait;
use std::io::IsTerminal;

pub mod console;

pub use console::ConsoleInterviewer;

/// Interface for blocking human input during a command.
#[async_trait]
pub trait Interviewer: Send + Sync {
    /// Yes/no question.
    async fn confirm(&self, prompt: &str) -> Result<bool, AppError>;

    /// Pick exactly one of `choices`; returns the chosen entry.
    async fn ask_choice(&self, prompt: &str, choices: &[String]) -> Result<String, AppError>;
}

/// Whether both stdin and stdout are attached to a terminal.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}
