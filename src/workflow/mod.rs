pub mod orchestrator;
pub mod poller;

pub use orchestrator::{
    query_files, select_data_sources, TranslationRun, Workflow, WorkflowOutcome, WorkflowPhase,
};
pub use poller::{cancel_pair, CancelHandle, CancelToken, JobPoller};
