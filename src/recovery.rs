//! Invocation of the external recovery tool.
//!
//! Builds the PhotoRec-style argument vector for one input, launches the
//! process with its stdout redirected into the per-input log file, and waits
//! for termination. Harvesting must never start before the exit status is
//! known, so the run call is strictly blocking.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

/// User-facing recovery options. Free-space search is always on; the tool is
/// pointed at unallocated regions in every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryOptions {
    /// Recover every supported file-type family.
    pub everything: bool,
    /// Recover the jpeg family.
    pub jpg: bool,
}

/// Argument vector for one recovery run.
#[derive(Debug, Clone)]
pub struct InvocationSpec {
    pub binary: String,
    pub args: Vec<String>,
}

impl InvocationSpec {
    pub fn command_line(&self) -> String {
        format!("{} {}", self.binary, self.args.join(" "))
    }
}

#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("recovery tool binary not found: {binary}")]
    MissingBinary { binary: String },
    #[error("failed to spawn recovery tool: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("recovery tool failed with exit code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },
    #[error("recovery timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("io error during recovery run: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the argument vector for one input: fixed debug/log flags, the
/// destination workspace, the input path, then the file-family command
/// string driven by `options`.
pub fn build_invocation(
    cfg: &Config,
    workspace: &Path,
    input_path: &Path,
    options: &RecoveryOptions,
) -> InvocationSpec {
    let mut args = vec![
        "/debug".to_string(),
        "/log".to_string(),
        "/d".to_string(),
        workspace.display().to_string(),
        "/cmd".to_string(),
    ];
    args.push(input_path.display().to_string());
    args.push(family_command(options));
    InvocationSpec {
        binary: cfg.tool_binary.clone(),
        args,
    }
}

/// The invariant part of the invocation, recorded in the result envelope.
pub fn base_command_template(cfg: &Config) -> String {
    format!("{} /debug /log /d <workspace> /cmd", cfg.tool_binary)
}

fn family_command(options: &RecoveryOptions) -> String {
    let toggle = |enabled: bool| if enabled { "enable" } else { "disable" };
    format!(
        "fileopt,everything,{},jpg,{},freespace,search",
        toggle(options.everything),
        toggle(options.jpg)
    )
}

/// Run the tool to completion. Stdout goes verbatim into `log_path` (which
/// becomes the per-input log output file); stderr is captured for error
/// reporting. On timeout the child is killed and partial results are the
/// caller's to discard.
pub fn run_recovery(
    spec: &InvocationSpec,
    log_path: &Path,
    timeout: Duration,
) -> Result<(), RecoveryError> {
    let log_file = std::fs::File::create(log_path)?;

    info!("invoking {}", spec.command_line());
    let mut child = match Command::new(&spec.binary)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(RecoveryError::MissingBinary {
                binary: spec.binary.clone(),
            });
        }
        Err(err) => return Err(RecoveryError::Spawn(err)),
    };

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RecoveryError::Spawn(std::io::Error::other("missing stderr pipe")))?;
    let stderr_reader = thread::spawn(move || {
        let mut buf = String::new();
        let mut stderr = stderr;
        let _ = stderr.read_to_string(&mut buf);
        buf
    });

    let start = Instant::now();
    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stderr_reader.join();
                    return Err(RecoveryError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(err) => return Err(RecoveryError::Io(err)),
        }
    };

    let stderr = stderr_reader.join().unwrap_or_default();
    debug!(
        "recovery tool finished exit_code={:?} elapsed_ms={}",
        exit_status.code(),
        start.elapsed().as_millis()
    );

    if !exit_status.success() {
        return Err(RecoveryError::NonZeroExit {
            code: exit_status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use super::{RecoveryError, RecoveryOptions, build_invocation, run_recovery};
    use crate::config::Config;

    fn test_config(binary: &str) -> Config {
        Config {
            run_id: "test".to_string(),
            tool_binary: binary.to_string(),
            recovery_output_suffix: ".1".to_string(),
            recovery_timeout_secs: 5,
            keep_workspaces: false,
        }
    }

    #[test]
    fn invocation_has_fixed_flags_then_input_then_families() {
        let cfg = test_config("photorec");
        let spec = build_invocation(
            &cfg,
            Path::new("/tmp/ws"),
            Path::new("/img/a.dd"),
            &RecoveryOptions {
                everything: true,
                jpg: true,
            },
        );
        assert_eq!(spec.binary, "photorec");
        assert_eq!(
            spec.args,
            vec![
                "/debug",
                "/log",
                "/d",
                "/tmp/ws",
                "/cmd",
                "/img/a.dd",
                "fileopt,everything,enable,jpg,enable,freespace,search",
            ]
        );
    }

    #[test]
    fn options_drive_family_toggles() {
        let cfg = test_config("photorec");
        let spec = build_invocation(
            &cfg,
            Path::new("/tmp/ws"),
            Path::new("/img/a.dd"),
            &RecoveryOptions {
                everything: false,
                jpg: true,
            },
        );
        assert_eq!(
            spec.args.last().map(String::as_str),
            Some("fileopt,everything,disable,jpg,enable,freespace,search")
        );
    }

    #[test]
    fn missing_binary_is_a_distinct_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = super::InvocationSpec {
            binary: "carvewrap-no-such-binary".to_string(),
            args: vec![],
        };
        let err = run_recovery(&spec, &dir.path().join("log.txt"), Duration::from_secs(1))
            .expect_err("should fail");
        assert!(matches!(err, RecoveryError::MissingBinary { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_surfaces_code_and_stderr() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = super::InvocationSpec {
            binary: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo boom >&2; exit 3".to_string(),
            ],
        };
        let err = run_recovery(&spec, &dir.path().join("log.txt"), Duration::from_secs(5))
            .expect_err("should fail");
        match err {
            RecoveryError::NonZeroExit { code, stderr } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_written_to_the_log_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log_path: PathBuf = dir.path().join("log.txt");
        let spec = super::InvocationSpec {
            binary: "sh".to_string(),
            args: vec!["-c".to_string(), "echo scanning".to_string()],
        };
        run_recovery(&spec, &log_path, Duration::from_secs(5)).expect("run");
        let content = std::fs::read_to_string(&log_path).expect("read log");
        assert_eq!(content.trim(), "scanning");
    }

    #[cfg(unix)]
    #[test]
    fn slow_tool_times_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = super::InvocationSpec {
            binary: "sh".to_string(),
            args: vec!["-c".to_string(), "sleep 30".to_string()],
        };
        let err = run_recovery(
            &spec,
            &dir.path().join("log.txt"),
            Duration::from_millis(100),
        )
        .expect_err("should time out");
        assert!(matches!(err, RecoveryError::Timeout { .. }));
    }
}
