use crate::api::ApiError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const ACCESS_TOKEN_ENV: &str = "LAUNCHPAD_ACCESS_TOKEN";

/// Message printed whenever a command stops for lack of credentials.
pub fn login_info() -> String {
    format!(
        "No access token found. Set {} or store a token in ~/.launchpad/tokens, then run the command again.",
        ACCESS_TOKEN_ENV
    )
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    access_token: String,
}

/// Finds the access token: environment first, then the token file.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token_file: Option<PathBuf>,
}

impl TokenStore {
    /// Token file at `<home>/.launchpad/tokens`.
    pub fn new() -> Self {
        TokenStore {
            token_file: dirs_next::home_dir().map(|home| home.join(".launchpad").join("tokens")),
        }
    }

    pub fn with_file(path: PathBuf) -> Self {
        TokenStore {
            token_file: Some(path),
        }
    }

    pub fn access_token(&self) -> Result<String, ApiError> {
        if let Ok(token) = env::var(ACCESS_TOKEN_ENV) {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }

        let Some(path) = &self.token_file else {
            return Err(ApiError::Unauthenticated);
        };
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ApiError::Unauthenticated)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "failed to read token file: {}", err);
                return Err(ApiError::Unauthenticated);
            }
        };

        let parsed: TokenFile = serde_json::from_str(&content).map_err(|err| {
            tracing::warn!(path = %path.display(), "malformed token file: {}", err);
            ApiError::Unauthenticated
        })?;
        if parsed.access_token.trim().is_empty() {
            return Err(ApiError::Unauthenticated);
        }
        Ok(parsed.access_token.trim().to_string())
    }
}
