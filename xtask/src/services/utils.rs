use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Returns the root directory of the workspace.
///
/// # Errors
/// Returns an error if the manifest directory does not have a parent.
pub fn get_project_root() -> Result<PathBuf> {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .context("Could not find project root from xtask manifest")
}

/// Normalizes a crate name to the workspace naming convention.
#[must_use]
pub fn normalize_project_name(project: &str) -> String {
    if project.starts_with("sim-") { project.to_owned() } else { format!("sim-{project}") }
}

/// Host operating system family, as far as the pipeline cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Other,
}

impl Platform {
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "linux") { Self::Linux } else { Self::Other }
    }
}

/// Deletes every directory below `root` whose name is in `names`. Returns how many were removed.
///
/// Matching directories are not descended into. Removal failures are logged and skipped.
///
/// # Errors
/// Fails when `root` cannot be read.
pub fn purge_dirs(root: &Path, names: &[String]) -> Result<usize> {
    fs::metadata(root).with_context(|| format!("Cannot read {}", root.display()))?;

    let is_target = |name: &std::ffi::OsStr| names.iter().any(|n| name == n.as_str());
    let mut removed = 0;
    let mut walker = WalkDir::new(root).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_dir() || !is_target(entry.file_name()) {
            continue;
        }
        walker.skip_current_dir();
        match fs::remove_dir_all(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to remove cache directory"),
        }
    }

    Ok(removed)
}
