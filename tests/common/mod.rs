//! Shared test infrastructure for pipeline tests.
//!
//! Installs a fake recovery tool (a shell script honoring the PhotoRec
//! argument convention) so the full orchestration path can run without the
//! real carver. Argument order seen by the script:
//! `/debug /log /d <workspace> /cmd <input> <families>`.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use carvewrap::config::{Config, LoadedConfig};
use carvewrap::manifest::InputFile;

/// A tool that recovers two files, one in a nested directory.
pub const TOOL_TWO_FILES: &str = r#"#!/bin/sh
out="$4.1"
mkdir -p "$out/sub"
printf 'jpeg-bytes' > "$out/x.jpg"
printf 'png-bytes' > "$out/sub/y.png"
echo "recovered 2 files from $6"
"#;

/// A tool that records the family command string it was given.
pub const TOOL_RECORD_FAMILIES: &str = r#"#!/bin/sh
out="$4.1"
mkdir -p "$out"
printf '%s' "$7" > "$out/families.txt"
"#;

/// A tool that finds nothing and never creates the output directory.
pub const TOOL_NOTHING_RECOVERED: &str = r#"#!/bin/sh
echo "nothing found in $6"
"#;

/// A tool that fails for inputs with "bad" in the name, succeeds otherwise.
pub const TOOL_FAIL_ON_BAD: &str = r#"#!/bin/sh
case "$6" in
  *bad*) echo "scan error" >&2; exit 1;;
esac
out="$4.1"
mkdir -p "$out"
printf 'ok' > "$out/x.jpg"
echo "done"
"#;

/// A tool that hangs long enough to trip any short timeout.
pub const TOOL_HANG: &str = r#"#!/bin/sh
sleep 30
"#;

pub fn install_fake_tool(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("fake_recovery_tool");
    std::fs::write(&path, script).expect("write fake tool");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake tool");
    }
    path
}

pub fn test_config(tool_binary: &Path, timeout_secs: u64) -> LoadedConfig {
    LoadedConfig {
        config: Config {
            run_id: "test_run".to_string(),
            tool_binary: tool_binary.display().to_string(),
            recovery_output_suffix: ".1".to_string(),
            recovery_timeout_secs: timeout_secs,
            keep_workspaces: false,
        },
        config_hash: "test_hash".to_string(),
    }
}

/// Create a dummy input image on disk and its descriptor.
pub fn make_input(dir: &Path, id: &str, file_name: &str) -> InputFile {
    let path = dir.join(file_name);
    std::fs::write(&path, b"raw image bytes").expect("write input image");
    InputFile {
        id: id.to_string(),
        path,
        display_name: None,
    }
}
