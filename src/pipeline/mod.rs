//! # Pipeline Module
//!
//! Orchestrates the recovery runs: one workspace and tool invocation per
//! input on a bounded worker pool, with outputs and failure notes funneled to
//! a collecting thread and aggregated into the result envelope.

pub mod events;
pub mod workers;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use thiserror::Error;
use tracing::info;

use crate::config::LoadedConfig;
use crate::envelope::{FailureNote, RunMeta, TaskResult};
use crate::manifest::InputFile;
use crate::outputs::OutputFile;
use crate::recovery::{RecoveryOptions, base_command_template};

use events::TaskEvent;
use workers::{TaskCounters, WorkerContext};

const MIN_CHANNEL_CAPACITY: usize = 4;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("no output files were created")]
    NoOutputFiles,
    #[error("input channel closed before all inputs were dispatched")]
    ChannelClosed,
    #[error("result collector thread panicked")]
    CollectorPanicked,
}

/// Run the whole task: every input processed, outputs aggregated, a hard
/// failure only when nothing at all was produced.
pub fn run_task(
    loaded: &LoadedConfig,
    inputs: Vec<InputFile>,
    output_path: &Path,
    workflow_id: &str,
    options: RecoveryOptions,
    worker_threads: usize,
) -> Result<TaskResult, TaskError> {
    let started = chrono::Utc::now();
    let cfg = &loaded.config;
    let worker_count = worker_threads.max(1).min(inputs.len().max(1));
    let channel_cap = worker_count.saturating_mul(2).max(MIN_CHANNEL_CAPACITY);

    info!(
        "starting run_id={} inputs={} output={} workers={} timeout_secs={}",
        cfg.run_id,
        inputs.len(),
        output_path.display(),
        worker_count,
        cfg.recovery_timeout_secs
    );

    let (job_tx, job_rx) = bounded::<InputFile>(channel_cap);
    let (event_tx, event_rx) = bounded::<TaskEvent>(channel_cap * 2);

    let collector = thread::spawn(move || {
        let mut output_files: Vec<OutputFile> = Vec::new();
        let mut failures: Vec<FailureNote> = Vec::new();
        for event in event_rx {
            match event {
                TaskEvent::Output(output) => output_files.push(output),
                TaskEvent::Failure(note) => failures.push(note),
            }
        }
        (output_files, failures)
    });

    let ctx = Arc::new(WorkerContext {
        config: cfg.clone(),
        options,
        output_path: output_path.to_path_buf(),
        timeout: Duration::from_secs(cfg.recovery_timeout_secs),
    });
    let counters = TaskCounters::new();
    let handles =
        workers::spawn_input_workers(worker_count, ctx, job_rx, event_tx.clone(), counters.clone());

    let mut dispatch_failed = false;
    for input in inputs {
        if job_tx.send(input).is_err() {
            dispatch_failed = true;
            break;
        }
    }
    drop(job_tx);

    for handle in handles {
        let _ = handle.join();
    }
    drop(event_tx);

    let (output_files, failures) = collector.join().map_err(|_| TaskError::CollectorPanicked)?;
    if dispatch_failed {
        return Err(TaskError::ChannelClosed);
    }

    info!(
        "run_summary run_id={} inputs_processed={} files_recovered={} outputs={} failures={}",
        cfg.run_id,
        counters.inputs_processed.load(Ordering::Relaxed),
        counters.files_recovered.load(Ordering::Relaxed),
        output_files.len(),
        failures.len()
    );

    if output_files.is_empty() {
        return Err(TaskError::NoOutputFiles);
    }

    Ok(TaskResult {
        output_files,
        workflow_id: workflow_id.to_string(),
        command: base_command_template(cfg),
        meta: RunMeta {
            run_id: cfg.run_id.clone(),
            config_hash: loaded.config_hash.clone(),
            started,
            finished: chrono::Utc::now(),
            failures,
        },
    })
}
