//! Local project state: the hidden per-project directory holding the
//! project meta record, plus `.gitignore` upkeep for that directory.
#![allow(clippy::result_large_err)]

use crate::core::config::StateLayout;
use crate::core::entities::ProjectMeta;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use regex::Regex;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// drwxrw----
pub const DIR_MODE: u32 = 0o760;
/// -rw-rw----
pub const FILE_MODE: u32 = 0o660;

const GITIGNORE: &str = ".gitignore";

/// Reads and writes the project meta record under `<root>/<dir_name>`.
#[derive(Debug, Clone)]
pub struct StateManager {
    layout: StateLayout,
    root_dir: PathBuf,
    state_dir: PathBuf,
    meta_path: PathBuf,
}

impl StateManager {
    /// Resolve paths for `root` (current directory when `None`) using the default layout.
    /// With `create_dirs`, the state directory is created if missing.
    pub fn initialize(root: Option<PathBuf>, create_dirs: bool) -> Result<Self, AppError> {
        Self::with_layout(root, create_dirs, StateLayout::default())
    }

    pub fn with_layout(
        root: Option<PathBuf>,
        create_dirs: bool,
        layout: StateLayout,
    ) -> Result<Self, AppError> {
        let root_dir = match root {
            Some(root) => root,
            None => std::env::current_dir().map_err(|e| {
                AppError::from(e).with_operation("resolve working directory")
            })?,
        };

        let state_dir = root_dir.join(&layout.dir_name);
        if create_dirs {
            create_state_dir(&state_dir).map_err(|e| {
                AppError::from(e)
                    .with_operation("create state directory")
                    .with_context("path", state_dir.display().to_string())
            })?;
        }

        let meta_path = state_dir.join(&layout.meta_file);
        Ok(StateManager {
            layout,
            root_dir,
            state_dir,
            meta_path,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    /// Persist `meta`, replacing any previous record.
    ///
    /// Also drops a README into the state directory warning against
    /// committing it; that write is best-effort.
    pub fn store_meta(&self, meta: &ProjectMeta) -> Result<(), AppError> {
        let encoded = serde_json::to_vec(&meta.canonical())
            .map_err(|e| AppError::from(e).with_operation("encode project meta"))?;

        let readme_path = self.state_dir.join(&self.layout.readme_file);
        if let Err(err) = write_file(&readme_path, self.readme_notes().as_bytes()) {
            tracing::warn!(
                path = %readme_path.display(),
                "failed to write state directory notes: {}",
                err
            );
        }

        write_file(&self.meta_path, &encoded).map_err(|e| {
            AppError::from(e)
                .with_operation("write project meta")
                .with_context("path", self.meta_path.display().to_string())
        })?;
        tracing::debug!(path = %self.meta_path.display(), project_id = %meta.id, "stored project meta");
        Ok(())
    }

    /// Read the stored record. `Ok(None)` means the project was never linked.
    pub fn get_meta(&self) -> Result<Option<ProjectMeta>, AppError> {
        let contents = match fs::read(&self.meta_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AppError::from(err)
                    .with_operation("read project meta")
                    .with_context("path", self.meta_path.display().to_string()))
            }
        };

        let meta: ProjectMeta = serde_json::from_slice(&contents).map_err(|e| {
            AppError::from(e)
                .with_operation("decode project meta")
                .with_context("path", self.meta_path.display().to_string())
        })?;
        Ok(Some(meta))
    }

    pub fn is_initialized(&self) -> Result<bool, AppError> {
        match fs::metadata(&self.meta_path) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(AppError::from(err).with_operation("stat project meta")),
        }
    }

    /// Make sure `<root>/.gitignore` lists the state directory.
    pub fn ensure_gitignored(&self) -> Result<(), AppError> {
        let pattern = self.layout.dir_name.as_str();
        let gitignore_path = self.root_dir.join(GITIGNORE);

        let existing = match fs::read(&gitignore_path) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(AppError::from(err)
                    .with_operation(format!("append {} to .gitignore", pattern)))
            }
        };

        let Some(mut contents) = existing else {
            write_file(&gitignore_path, pattern.as_bytes()).map_err(|e| {
                AppError::with_source(
                    ErrorCategory::IoError,
                    format!("failed to write {} to .gitignore: {}", pattern, e),
                    e,
                )
                .with_operation(format!("write {} to .gitignore", pattern))
            })?;
            tracing::debug!(path = %gitignore_path.display(), "created .gitignore");
            return Ok(());
        };

        if gitignore_lists(&String::from_utf8_lossy(&contents), pattern)? {
            return Ok(());
        }

        contents.push(b'\n');
        contents.extend_from_slice(pattern.as_bytes());
        write_file(&gitignore_path, &contents).map_err(|e| {
            AppError::with_source(
                ErrorCategory::IoError,
                format!("failed to append {} to .gitignore: {}", pattern, e),
                e,
            )
            .with_operation(format!("append {} to .gitignore", pattern))
        })?;
        tracing::debug!(path = %gitignore_path.display(), "appended {} to .gitignore", pattern);
        Ok(())
    }

    fn readme_notes(&self) -> String {
        format!(
            "Don't commit this folder ({}) to git as it may contain security-sensitive data.",
            self.layout.dir_name
        )
    }
}

/// True when some line of `contents` starts with `pattern` followed by a word boundary.
fn gitignore_lists(contents: &str, pattern: &str) -> Result<bool, AppError> {
    let matcher = Regex::new(&format!(r"(?m)^{}\b", regex::escape(pattern))).map_err(|e| {
        AppError::new(
            ErrorCategory::InternalError,
            format!("invalid .gitignore pattern {:?}: {}", pattern, e),
        )
    })?;
    Ok(matcher.is_match(contents))
}

fn create_state_dir(path: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}

fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()
}
