use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::human::Interviewer;
use async_trait::async_trait;
use std::io::{self, Write};
use tokio::task::spawn_blocking;

/// Prompts on stdout and reads answers from stdin.
pub struct ConsoleInterviewer;

impl ConsoleInterviewer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleInterviewer {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_line_blocking() -> Result<String, AppError> {
    spawn_blocking(|| {
        let mut buffer = String::new();
        let read = io::stdin().read_line(&mut buffer).map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to read stdin: {}", err),
            )
        })?;
        if read == 0 {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "stdin closed before an answer was given",
            ));
        }
        Ok(buffer)
    })
    .await
    .map_err(|err| {
        AppError::new(
            ErrorCategory::InternalError,
            format!("console input task cancelled: {}", err),
        )
    })?
}

fn parse_confirmation(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Resolve a 1-based index or an exact entry to one of `choices`.
fn parse_choice(input: &str, choices: &[String]) -> Option<String> {
    let trimmed = input.trim();
    if let Ok(idx) = trimmed.parse::<usize>() {
        return idx.checked_sub(1).and_then(|i| choices.get(i)).cloned();
    }
    choices.iter().find(|choice| choice.as_str() == trimmed).cloned()
}

#[async_trait]
impl Interviewer for ConsoleInterviewer {
    async fn confirm(&self, prompt: &str) -> Result<bool, AppError> {
        loop {
            print!("{} (y/n): ", prompt);
            io::stdout().flush().ok();
            let line = read_line_blocking().await?;
            match parse_confirmation(&line) {
                Some(answer) => return Ok(answer),
                None => println!("Please respond with 'y' or 'n'."),
            }
        }
    }

    async fn ask_choice(&self, prompt: &str, choices: &[String]) -> Result<String, AppError> {
        if choices.is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "nothing to choose from",
            ));
        }
        println!("{}", prompt);
        for (idx, choice) in choices.iter().enumerate() {
            println!("{:>2}: {}", idx + 1, choice);
        }
        loop {
            print!("Enter choice: ");
            io::stdout().flush().ok();
            let line = read_line_blocking().await?;
            match parse_choice(&line, choices) {
                Some(choice) => return Ok(choice),
                None => println!("Please enter a number between 1 and {}.", choices.len()),
            }
        }
    }
}
