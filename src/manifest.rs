use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Descriptor of a source artifact to scan. Owned by the external pipeline;
/// read-only here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputFile {
    pub id: String,
    pub path: PathBuf,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl InputFile {
    /// Human-readable name: the pipeline-supplied display name when present,
    /// otherwise the file's basename.
    pub fn display(&self) -> String {
        if let Some(name) = &self.display_name {
            if !name.trim().is_empty() {
                return name.clone();
            }
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the input-file descriptors from a JSON manifest (an array of
/// `{id, path, display_name}` objects).
pub fn load_manifest(path: &Path) -> Result<Vec<InputFile>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
        path: path.display().to_string(),
        source,
    })
}
