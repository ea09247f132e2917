use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::outputs::OutputFile;

/// Aggregate result for one task invocation, handed back to the external
/// task-queue collaborator as JSON.
#[derive(Debug, Serialize)]
pub struct TaskResult {
    pub output_files: Vec<OutputFile>,
    pub workflow_id: String,
    pub command: String,
    pub meta: RunMeta,
}

impl TaskResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Serialize)]
pub struct RunMeta {
    pub run_id: String,
    pub config_hash: String,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureNote>,
}

/// Per-input failure that did not abort the rest of the run.
#[derive(Debug, Clone, Serialize)]
pub struct FailureNote {
    pub input_id: String,
    pub stage: FailureStage,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Workspace,
    Recovery,
    Harvest,
    Materialize,
}
