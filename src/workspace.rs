use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// Per-input working directory handed to the recovery tool.
///
/// The tool does not write recovered files into the directory it is given;
/// it creates a sibling directory by appending a fixed suffix (".1" for
/// PhotoRec) and populates that. Only the workspace directory itself is
/// created here; the sibling path is computed, never created.
///
/// Both directories are removed when the workspace is dropped, on every exit
/// path, unless the workspace was retained for debugging or because a failed
/// materialization left artifacts behind that an operator may still want.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    recovery_output: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Create a collision-free workspace under `base`. The name is a 128-bit
    /// random token, so no cross-run locking is needed.
    pub fn create(base: &Path, output_suffix: &str, keep: bool) -> std::io::Result<Workspace> {
        let token = Uuid::new_v4().simple().to_string();
        let path = base.join(token);
        std::fs::create_dir(&path)?;

        let mut with_suffix = path.clone().into_os_string();
        with_suffix.push(output_suffix);
        let recovery_output = PathBuf::from(with_suffix);

        debug!(
            "workspace created path={} recovery_output={}",
            path.display(),
            recovery_output.display()
        );
        Ok(Workspace {
            path,
            recovery_output,
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the tool is expected to populate. May not exist if nothing
    /// was recovered.
    pub fn recovery_output(&self) -> &Path {
        &self.recovery_output
    }

    /// Skip cleanup when this workspace is dropped.
    pub fn retain(&mut self) {
        self.keep = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            debug!("retaining workspace {}", self.path.display());
            return;
        }
        for dir in [&self.path, &self.recovery_output] {
            match std::fs::remove_dir_all(dir) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!("failed to remove {}: {err}", dir.display()),
            }
        }
    }
}
