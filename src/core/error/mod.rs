use crate::api::ApiError;
use crate::core::types::{ErrorCategory, ErrorSeverity, ReleaseStage};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::{self, Write};

#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub code: String,
    pub message: String,
    pub context: BTreeMap<String, String>,
    pub recovery_suggestions: Vec<String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
    /// Set once the error has been shown to the user.
    pub reported: bool,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        let severity = match category {
            ErrorCategory::Unauthenticated => ErrorSeverity::Warning,
            ErrorCategory::NotFound
            | ErrorCategory::ValidationError
            | ErrorCategory::RemoteOperationError
            | ErrorCategory::IoError
            | ErrorCategory::SerializationError
            | ErrorCategory::InternalError => ErrorSeverity::Error,
        };
        AppError {
            category,
            severity,
            code: format!("ERR-{}", uuid::Uuid::new_v4()),
            message: message.into(),
            context: BTreeMap::new(),
            recovery_suggestions: vec![],
            occurred_at: Utc::now(),
            source: None,
            reported: false,
        }
    }

    pub fn with_source<T: Into<String>>(
        category: ErrorCategory,
        message: T,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        let mut error = AppError::new(category, message);
        error.source = Some(source.into());
        error
    }

    pub fn with_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Record the user-facing operation that failed ("create release", "read project meta").
    pub fn with_operation<T: Into<String>>(self, operation: T) -> Self {
        self.with_context("operation", operation)
    }

    pub fn with_stage(self, stage: ReleaseStage) -> Self {
        self.with_context("stage", stage.as_str())
    }

    pub fn with_suggestion<T: Into<String>>(mut self, suggestion: T) -> Self {
        self.recovery_suggestions.push(suggestion.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    pub fn mark_reported(mut self) -> Self {
        self.reported = true;
        self
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.category == ErrorCategory::Unauthenticated
    }

    pub fn operation(&self) -> Option<&str> {
        self.context.get("operation").map(String::as_str)
    }

    pub fn stage(&self) -> Option<&str> {
        self.context.get("stage").map(String::as_str)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (Context: {:?})", self.context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError {
            category: ErrorCategory::IoError,
            severity: ErrorSeverity::Error,
            code: "IO_ERROR".to_string(),
            message: e.to_string(),
            context: BTreeMap::new(),
            recovery_suggestions: vec!["Check file permissions and paths".to_string()],
            occurred_at: Utc::now(),
            source: Some(anyhow::anyhow!(e)),
            reported: false,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::with_source(ErrorCategory::SerializationError, e.to_string(), e)
            .with_code("SERDE_ERROR")
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        let category = match &e {
            ApiError::Unauthenticated => ErrorCategory::Unauthenticated,
            ApiError::NotFound(_) => ErrorCategory::NotFound,
            ApiError::Server { .. }
            | ApiError::Network(_)
            | ApiError::Decode(_)
            | ApiError::Stream(_) => ErrorCategory::RemoteOperationError,
        };
        AppError::with_source(category, e.to_string(), e)
    }
}

/// Sink for everything the user sees: errors, notices, and the raw release log.
pub trait Reporter: Send + Sync {
    fn report_error(&self, error: &AppError);
    fn report_warning(&self, message: &str);
    fn report_info(&self, message: &str);
    /// Forward one line of remote build output verbatim.
    fn report_log_line(&self, line: &str);
}

/// Writes log lines and summaries to stdout, errors and warnings to stderr.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        ConsoleReporter
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Lines shown for a failed command: message, context, cause, then hints.
pub fn render_error(error: &AppError) -> Vec<String> {
    let mut lines = vec![format!("Error: {}", error.message)];
    if !error.context.is_empty() {
        let context: Vec<String> = error
            .context
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        lines.push(format!("  Context: {}", context.join(", ")));
    }
    if let Some(ref source) = error.source {
        let cause = source.to_string();
        if cause != error.message {
            lines.push(format!("  Caused by: {}", cause));
        }
    }
    for suggestion in &error.recovery_suggestions {
        lines.push(format!("  hint: {}", suggestion));
    }
    lines
}

impl Reporter for ConsoleReporter {
    fn report_error(&self, error: &AppError) {
        for line in render_error(error) {
            eprintln!("{}", line);
        }
    }

    fn report_warning(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    fn report_info(&self, message: &str) {
        println!("{}", message);
    }

    fn report_log_line(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}
