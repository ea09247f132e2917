//! Events that flow from the input workers to the collecting thread.

use crate::envelope::FailureNote;
use crate::outputs::OutputFile;

#[derive(Debug)]
pub enum TaskEvent {
    /// A pipeline output was produced (log or extracted file).
    Output(OutputFile),
    /// A per-input failure that did not abort the run.
    Failure(FailureNote),
}
