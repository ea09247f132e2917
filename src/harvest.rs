use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// A file found inside the tool's output location, prior to registration as a
/// pipeline output. The relative path is kept for provenance.
#[derive(Debug, Clone)]
pub struct RecoveredArtifact {
    pub relative_path: PathBuf,
    pub absolute_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

/// Enumerate the regular files beneath `recovery_output`, sorted by relative
/// path so repeated runs over identical contents enumerate identically.
///
/// A missing or non-directory location is "nothing recovered", a normal
/// terminal outcome, and yields an empty set rather than an error.
pub fn harvest(recovery_output: &Path) -> Result<Vec<RecoveredArtifact>, HarvestError> {
    if !recovery_output.is_dir() {
        debug!(
            "recovery output {} not present; nothing recovered",
            recovery_output.display()
        );
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for entry in WalkDir::new(recovery_output) {
        let entry = entry.map_err(|source| HarvestError::Walk {
            path: recovery_output.display().to_string(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative_path = entry
            .path()
            .strip_prefix(recovery_output)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        artifacts.push(RecoveredArtifact {
            relative_path,
            absolute_path: entry.path().to_path_buf(),
        });
    }
    artifacts.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    debug!(
        "harvested {} artifact(s) from {}",
        artifacts.len(),
        recovery_output.display()
    );
    Ok(artifacts)
}
