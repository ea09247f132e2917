//! Pipeline output records.
//!
//! Each recovered artifact becomes exactly one [`OutputFile`], relocated into
//! a fresh destination path and tagged with provenance back to its input.
//! The per-input recovery log is the one output without a provenance id.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::harvest::RecoveredArtifact;
use crate::manifest::InputFile;

pub const DATA_TYPE_LOG: &str = "text/plain";
pub const DATA_TYPE_EXTRACTED: &str = "extraction:image_export:file";

/// A pipeline-tracked result file. Ownership transfers to the external
/// pipeline once the envelope is returned.
#[derive(Debug, Clone, Serialize)]
pub struct OutputFile {
    pub path: PathBuf,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("artifact materialization failed for {artifact}: {source}")]
    Materialize {
        artifact: String,
        #[source]
        source: std::io::Error,
    },
}

/// Allocate the log output record for one input. The file itself is created
/// when the tool's stdout is redirected into it.
pub fn create_log_output(destination: &Path, input: &InputFile) -> OutputFile {
    OutputFile {
        path: allocate_path(destination, Some("txt")),
        display_name: format!("{}.txt", input.display()),
        original_path: None,
        data_type: DATA_TYPE_LOG.to_string(),
        source_file_id: None,
    }
}

/// Register `artifact` as a pipeline output and move its bytes into the
/// assigned destination path. Move semantics: after success the artifact no
/// longer exists at its harvested location. On failure the artifact is left
/// in place for manual recovery.
pub fn materialize(
    artifact: &RecoveredArtifact,
    input: &InputFile,
    destination: &Path,
) -> Result<OutputFile, OutputError> {
    let display_name = artifact
        .relative_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| artifact.relative_path.display().to_string());

    let output = OutputFile {
        path: allocate_path(destination, None),
        display_name,
        original_path: Some(artifact.relative_path.display().to_string()),
        data_type: DATA_TYPE_EXTRACTED.to_string(),
        source_file_id: Some(input.id.clone()),
    };

    move_file(&artifact.absolute_path, &output.path).map_err(|source| {
        OutputError::Materialize {
            artifact: artifact.absolute_path.display().to_string(),
            source,
        }
    })?;

    debug!(
        "materialized {} -> {}",
        artifact.relative_path.display(),
        output.path.display()
    );
    Ok(output)
}

/// Fresh unique destination path: uuid hex, with an extension for file types
/// the downstream pipeline dispatches on (the log).
fn allocate_path(destination: &Path, extension: Option<&str>) -> PathBuf {
    let token = Uuid::new_v4().simple().to_string();
    let name = match extension {
        Some(ext) => format!("{token}.{ext}"),
        None => token,
    };
    destination.join(name)
}

/// Rename, falling back to copy+delete when the destination is on another
/// filesystem. A partial copy is removed before reporting the error so the
/// source artifact is never the only casualty.
fn move_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    match std::fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(src, dst).map_err(|err| {
                let _ = std::fs::remove_file(dst);
                err
            })?;
            std::fs::remove_file(src)
        }
    }
}
