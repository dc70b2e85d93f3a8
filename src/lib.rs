pub mod api;
pub mod report;
pub mod utils;
pub mod workflow;

pub use api::{
    ApiClient, ApiTransport, AuthScheme, DataSource, HttpTransport, JobStatus, MockTransport,
    QueryFile, Session, TranslatedModel, TranslationJob,
};
pub use report::{diff_lines, render_report, DiffColumns, SourceLine, TargetLine};
pub use utils::{AppConfig, Result, TranslatorError};
pub use workflow::{
    cancel_pair, CancelHandle, CancelToken, JobPoller, TranslationRun, Workflow, WorkflowOutcome,
    WorkflowPhase,
};
