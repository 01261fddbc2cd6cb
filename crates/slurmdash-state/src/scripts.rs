//! Submittable job scripts in a workspace.

use crate::ordering::{OrderingError, collate, present_first};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// File extensions recognized as batch scripts.
pub const JOB_SCRIPT_EXTENSIONS: &[&str] = &["slurm", "sbatch", "job"];

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

/// A batch script found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobScript {
    pub path: Utf8PathBuf,
    /// Path relative to the workspace root
    pub relative_path: String,
    pub modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

impl JobScript {
    /// A script without file metadata.
    pub fn new(path: impl Into<Utf8PathBuf>, workspace_root: &Utf8Path) -> Self {
        let path = path.into();
        let relative_path = path
            .strip_prefix(workspace_root)
            .map(|p| p.to_string())
            .unwrap_or_else(|_| path.to_string());
        Self {
            path,
            relative_path,
            modified: None,
            created: None,
        }
    }

    /// A script with timestamps read from the filesystem.
    ///
    /// Timestamps the platform cannot provide are left unset.
    pub fn from_path(path: impl Into<Utf8PathBuf>, workspace_root: &Utf8Path) -> Self {
        let mut script = Self::new(path, workspace_root);
        if let Ok(meta) = std::fs::metadata(&script.path) {
            script.modified = meta.modified().ok().map(DateTime::<Utc>::from);
            script.created = meta.created().ok().map(DateTime::<Utc>::from);
        }
        script
    }

    pub fn with_times(
        mut self,
        modified: Option<DateTime<Utc>>,
        created: Option<DateTime<Utc>>,
    ) -> Self {
        self.modified = modified;
        self.created = created;
        self
    }

    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }
}

/// Keys the script list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptSortKey {
    FileName,
    RelativePath,
    LastModified,
    Newest,
    Oldest,
}

impl ScriptSortKey {
    pub const ALL: [ScriptSortKey; 5] = [
        Self::FileName,
        Self::RelativePath,
        Self::LastModified,
        Self::Newest,
        Self::Oldest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileName => "filename",
            Self::RelativePath => "rel path",
            Self::LastModified => "last modified",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }
}

impl FromStr for ScriptSortKey {
    type Err = OrderingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| OrderingError::InvalidSortKey {
                key: s.to_string(),
                expected: "filename, rel path, last modified, newest, oldest",
            })
    }
}

impl fmt::Display for ScriptSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare two scripts. Scripts without the compared timestamp sort last.
pub fn compare_scripts(a: &JobScript, b: &JobScript, key: ScriptSortKey) -> Ordering {
    match key {
        ScriptSortKey::FileName => collate(a.file_name(), b.file_name()),
        ScriptSortKey::RelativePath => collate(&a.relative_path, &b.relative_path),
        ScriptSortKey::LastModified => present_first(a.modified.map(Reverse), b.modified.map(Reverse)),
        ScriptSortKey::Newest => present_first(a.created.map(Reverse), b.created.map(Reverse)),
        ScriptSortKey::Oldest => present_first(a.created, b.created),
    }
}

/// Sort `scripts` by a configured key name; see [`crate::sort_jobs`].
pub fn sort_job_scripts(scripts: &mut [JobScript], key: Option<&str>) -> Result<(), OrderingError> {
    let Some(key) = key else {
        return Ok(());
    };

    match key.parse::<ScriptSortKey>() {
        Ok(key) => {
            scripts.sort_by(|a, b| compare_scripts(a, b, key));
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Not sorting job scripts: {}", e);
            Err(e)
        }
    }
}

pub fn is_job_script(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| JOB_SCRIPT_EXTENSIONS.contains(&ext))
}

/// Find every job script below `root`, skipping hidden directories.
///
/// Results are ordered by path.
pub fn discover_job_scripts(root: &Utf8Path) -> Result<Vec<JobScript>, ScriptError> {
    let mut scripts = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = Utf8PathBuf::try_from(entry.path())
                .map_err(|e| ScriptError::NonUtf8Path(e.to_string()))?;

            if path.file_name().is_some_and(|n| n.starts_with('.')) {
                continue;
            }

            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_job_script(&path) {
                scripts.push(JobScript::from_path(path, root));
            }
        }
    }

    scripts.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!("Found {} job scripts under {}", scripts.len(), root);
    Ok(scripts)
}

/// Resolve `path` against the workspace root.
///
/// Absolute paths and `file://` URIs are returned as absolute paths.
pub fn resolve_path_relative_to_workspace(path: &str, workspace_root: &Utf8Path) -> Utf8PathBuf {
    if let Some(stripped) = path.strip_prefix("file://") {
        return Utf8PathBuf::from(stripped);
    }
    let path = Utf8Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace_root.join(path)
    }
}

/// Directory containing `path`, if it has one.
pub fn parent_directory(path: &Utf8Path) -> Option<&Utf8Path> {
    path.parent().filter(|p| !p.as_str().is_empty())
}
