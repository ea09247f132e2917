//! Worker threads that each process one input end to end: workspace,
//! recovery run, harvest, materialization.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::warn;

use crate::config::Config;
use crate::envelope::{FailureNote, FailureStage};
use crate::harvest;
use crate::manifest::InputFile;
use crate::outputs;
use crate::recovery::{self, RecoveryOptions};
use crate::workspace::Workspace;

use super::events::TaskEvent;

/// Shared, read-only context for all input workers.
pub struct WorkerContext {
    pub config: Config,
    pub options: RecoveryOptions,
    pub output_path: PathBuf,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct TaskCounters {
    pub inputs_processed: Arc<AtomicU64>,
    pub files_recovered: Arc<AtomicU64>,
    pub failures: Arc<AtomicU64>,
}

impl TaskCounters {
    pub fn new() -> Self {
        Self {
            inputs_processed: Arc::new(AtomicU64::new(0)),
            files_recovered: Arc::new(AtomicU64::new(0)),
            failures: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for TaskCounters {
    fn default() -> Self {
        Self::new()
    }
}

pub fn spawn_input_workers(
    workers: usize,
    ctx: Arc<WorkerContext>,
    rx: Receiver<InputFile>,
    event_tx: Sender<TaskEvent>,
    counters: TaskCounters,
) -> Vec<thread::JoinHandle<()>> {
    let mut handles = Vec::new();
    for _ in 0..workers.max(1) {
        let ctx = ctx.clone();
        let rx = rx.clone();
        let event_tx = event_tx.clone();
        let counters = counters.clone();
        handles.push(thread::spawn(move || {
            for input in rx {
                process_input(&ctx, &input, &event_tx, &counters);
                counters.inputs_processed.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }
    handles
}

/// One input's full recovery run. Failures are recorded and isolated; the
/// remaining inputs keep processing.
fn process_input(
    ctx: &WorkerContext,
    input: &InputFile,
    events: &Sender<TaskEvent>,
    counters: &TaskCounters,
) {
    let mut workspace = match Workspace::create(
        &ctx.output_path,
        &ctx.config.recovery_output_suffix,
        ctx.config.keep_workspaces,
    ) {
        Ok(workspace) => workspace,
        Err(err) => {
            warn!("workspace creation failed for input {}: {err}", input.id);
            counters.failures.fetch_add(1, Ordering::Relaxed);
            let _ = events.send(TaskEvent::Failure(FailureNote {
                input_id: input.id.clone(),
                stage: FailureStage::Workspace,
                message: err.to_string(),
            }));
            return;
        }
    };

    let log_output = outputs::create_log_output(&ctx.output_path, input);
    let spec = recovery::build_invocation(&ctx.config, workspace.path(), &input.path, &ctx.options);
    let run = recovery::run_recovery(&spec, &log_output.path, ctx.timeout);

    // The captured tool log is an output in its own right, kept even when the
    // run fails so operators can see what the tool reported.
    if log_output.path.exists() {
        let _ = events.send(TaskEvent::Output(log_output));
    }

    if let Err(err) = run {
        warn!("recovery failed for input {}: {err}", input.id);
        counters.failures.fetch_add(1, Ordering::Relaxed);
        let _ = events.send(TaskEvent::Failure(FailureNote {
            input_id: input.id.clone(),
            stage: FailureStage::Recovery,
            message: err.to_string(),
        }));
        // Partial results for this input are discarded with the workspace.
        return;
    }

    let artifacts = match harvest::harvest(workspace.recovery_output()) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            warn!("harvest failed for input {}: {err}", input.id);
            counters.failures.fetch_add(1, Ordering::Relaxed);
            let _ = events.send(TaskEvent::Failure(FailureNote {
                input_id: input.id.clone(),
                stage: FailureStage::Harvest,
                message: err.to_string(),
            }));
            return;
        }
    };

    for artifact in &artifacts {
        match outputs::materialize(artifact, input, &ctx.output_path) {
            Ok(output) => {
                counters.files_recovered.fetch_add(1, Ordering::Relaxed);
                let _ = events.send(TaskEvent::Output(output));
            }
            Err(err) => {
                warn!("{err}");
                counters.failures.fetch_add(1, Ordering::Relaxed);
                let _ = events.send(TaskEvent::Failure(FailureNote {
                    input_id: input.id.clone(),
                    stage: FailureStage::Materialize,
                    message: err.to_string(),
                }));
                // Leave the artifact at its harvested path for manual
                // recovery instead of deleting it with the workspace.
                workspace.retain();
            }
        }
    }
}
