use crate::api::{ApiClient, DataSource, QueryFile, Session, TranslationJob};
use crate::utils::{AppConfig, Result, TranslatorError};
use crate::workflow::poller::{CancelToken, JobPoller};
use std::time::Duration;
use tracing::{info, warn};

/// Phases of a translation run. Each transition is gated on one
/// successful remote call; a failed call aborts the run in place with
/// no rollback of remote resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Unstarted,
    OrgProvisioned,
    ProjectCreated,
    FilesUploaded,
    JobStarted,
    Polling,
    Done,
    Failed,
}

impl std::fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowPhase::Unstarted => write!(f, "unstarted"),
            WorkflowPhase::OrgProvisioned => write!(f, "org_provisioned"),
            WorkflowPhase::ProjectCreated => write!(f, "project_created"),
            WorkflowPhase::FilesUploaded => write!(f, "files_uploaded"),
            WorkflowPhase::JobStarted => write!(f, "job_started"),
            WorkflowPhase::Polling => write!(f, "polling"),
            WorkflowPhase::Done => write!(f, "done"),
            WorkflowPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Identifiers produced by the project/upload/start sequence.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRun {
    pub project_id: i64,
    pub translation_id: i64,
}

/// Result of a full end-to-end run.
#[derive(Debug)]
pub struct WorkflowOutcome {
    pub session: Session,
    pub run: TranslationRun,
    pub job: TranslationJob,
    pub phase: WorkflowPhase,
}

/// Select source and target data source ids.
///
/// Policy: the target is the first data source whose type equals
/// `target_kind`; the source is the first data source of any other type.
/// First-match is deliberate and mirrors the service's single-target
/// setup; ambiguity among several source candidates is logged.
pub fn select_data_sources(sources: &[DataSource], target_kind: &str) -> Result<(i64, i64)> {
    let target = sources
        .iter()
        .find(|ds| ds.kind == target_kind)
        .ok_or_else(|| {
            TranslatorError::DataSourceSelection(format!(
                "no data source of type `{}` registered",
                target_kind
            ))
        })?;

    let candidates: Vec<&DataSource> = sources.iter().filter(|ds| ds.kind != target_kind).collect();
    let source = candidates.first().ok_or_else(|| {
        TranslatorError::DataSourceSelection(format!(
            "no source data source: every registered data source has type `{}`",
            target_kind
        ))
    })?;

    if candidates.len() > 1 {
        warn!(
            candidates = candidates.len(),
            chosen = source.id,
            "Multiple source data sources found, using the first"
        );
    }

    Ok((source.id, target.id))
}

/// Synthesize upload payloads, one file per query, 1-indexed.
pub fn query_files(queries: &[String]) -> Vec<QueryFile> {
    queries
        .iter()
        .enumerate()
        .map(|(i, query)| QueryFile {
            filename: format!("query_{}.sql", i + 1),
            content: query.clone(),
        })
        .collect()
}

/// Sequences the whole remote workflow: provision organization, create
/// project, upload files, start the job, poll until terminal.
pub struct Workflow {
    client: ApiClient,
    config: AppConfig,
}

impl Workflow {
    pub fn new(client: ApiClient, config: AppConfig) -> Self {
        Self { client, config }
    }

    /// `Unstarted -> OrgProvisioned`
    pub async fn provision_organization(&self, org_token: &str) -> Result<Session> {
        let session = self.client.create_organization(org_token).await?;
        info!(phase = %WorkflowPhase::OrgProvisioned, org_id = session.org_id, "Phase complete");
        Ok(session)
    }

    /// `OrgProvisioned -> ProjectCreated -> FilesUploaded -> JobStarted`
    ///
    /// An empty query list is legal and uploads zero files. Project
    /// creation and job start are never retried here: retrying would
    /// duplicate server-side resources.
    pub async fn translate_queries(
        &self,
        session: &Session,
        queries: &[String],
    ) -> Result<TranslationRun> {
        let data_sources = self.client.list_data_sources(session).await?;
        let (source_id, target_id) =
            select_data_sources(&data_sources, &self.config.project.target_data_source_type)?;

        info!(source_id, target_id, "Creating project");
        let project_id = self
            .client
            .create_project(session, &self.config.project.name, source_id, target_id)
            .await?;
        info!(phase = %WorkflowPhase::ProjectCreated, project_id, "Phase complete");

        let files = query_files(queries);
        info!(project_id, files = files.len(), "Uploading queries to translate");
        self.client.upload_files(session, project_id, &files).await?;
        info!(phase = %WorkflowPhase::FilesUploaded, project_id, "Phase complete");

        let translation_id = self.client.start_translation(session, project_id).await?;
        info!(phase = %WorkflowPhase::JobStarted, project_id, translation_id, "Phase complete");

        Ok(TranslationRun {
            project_id,
            translation_id,
        })
    }

    /// `JobStarted -> Polling -> {Done, Failed}`
    pub async fn wait_for_results(
        &self,
        session: &Session,
        run: &TranslationRun,
        cancel: CancelToken,
    ) -> Result<TranslationJob> {
        info!(
            phase = %WorkflowPhase::Polling,
            project_id = run.project_id,
            translation_id = run.translation_id,
            "Waiting for translation results"
        );

        let poller = JobPoller::new(Duration::from_secs(self.config.polling.interval_seconds));
        poller
            .wait_until_terminal(
                &self.client,
                session,
                run.project_id,
                run.translation_id,
                cancel,
            )
            .await
    }

    /// End-to-end run. A `failed` job status is reported through
    /// `outcome.phase`, not as an error.
    pub async fn run(
        &self,
        org_token: &str,
        queries: &[String],
        cancel: CancelToken,
    ) -> Result<WorkflowOutcome> {
        let session = self.provision_organization(org_token).await?;
        let run = self.translate_queries(&session, queries).await?;
        let job = self.wait_for_results(&session, &run, cancel).await?;

        let phase = match job.status {
            crate::api::JobStatus::Failed => WorkflowPhase::Failed,
            _ => WorkflowPhase::Done,
        };

        Ok(WorkflowOutcome {
            session,
            run,
            job,
            phase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{JobStatus, MockTransport};
    use serde_json::json;
    use std::sync::Arc;
    use crate::workflow::poller::cancel_pair;

    fn workflow_with(mock: Arc<MockTransport>) -> Workflow {
        let client = ApiClient::new("https://app.example.com", mock);
        Workflow::new(client, AppConfig::default())
    }

    fn ds(id: i64, kind: &str) -> DataSource {
        serde_json::from_value(json!({"id": id, "type": kind})).unwrap()
    }

    #[test]
    fn selects_first_non_target_source_and_target() {
        let sources = vec![ds(1, "snowflake"), ds(2, "databricks")];
        let (source_id, target_id) = select_data_sources(&sources, "databricks").unwrap();
        assert_eq!(source_id, 1);
        assert_eq!(target_id, 2);
    }

    #[test]
    fn selection_fails_without_target() {
        let sources = vec![ds(1, "snowflake"), ds(2, "redshift")];
        let result = select_data_sources(&sources, "databricks");
        assert!(matches!(
            result,
            Err(TranslatorError::DataSourceSelection(_))
        ));
    }

    #[test]
    fn selection_fails_without_source() {
        let sources = vec![ds(2, "databricks")];
        let result = select_data_sources(&sources, "databricks");
        assert!(matches!(
            result,
            Err(TranslatorError::DataSourceSelection(_))
        ));
    }

    #[test]
    fn selection_prefers_first_among_multiple_sources() {
        let sources = vec![ds(3, "redshift"), ds(1, "snowflake"), ds(2, "databricks")];
        let (source_id, _) = select_data_sources(&sources, "databricks").unwrap();
        assert_eq!(source_id, 3);
    }

    #[test]
    fn query_files_are_one_indexed_and_ordered() {
        let queries = vec!["SELECT 1".to_string(), "SELECT 2".to_string()];
        let files = query_files(&queries);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "query_1.sql");
        assert_eq!(files[0].content, "SELECT 1");
        assert_eq!(files[1].filename, "query_2.sql");
        assert_eq!(files[1].content, "SELECT 2");
    }

    #[test]
    fn empty_query_list_yields_no_files() {
        assert!(query_files(&[]).is_empty());
    }

    fn script_happy_path(mock: &MockTransport) {
        mock.enqueue("POST", "/org", json!({"api_token": "key-1", "org_id": 42}));
        mock.enqueue(
            "GET",
            "/api/v1/data_sources",
            json!([{"id": 1, "type": "snowflake"}, {"id": 2, "type": "databricks"}]),
        );
        mock.enqueue(
            "POST",
            "/api/internal/dma/projects",
            json!({"project": {"id": 9}}),
        );
        mock.enqueue(
            "POST",
            "/projects/9/files",
            json!({"files": [{"filename": "query_1.sql", "status": "ok"}]}),
        );
        mock.enqueue("POST", "/projects/9/translate/jobs", json!({"task_id": 314}));
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_run_uploads_named_files_and_returns_results() {
        let mock = Arc::new(MockTransport::new());
        script_happy_path(&mock);
        mock.enqueue("GET", "/translate/jobs/314", json!({"status": "pending"}));
        mock.enqueue(
            "GET",
            "/translate/jobs/314",
            json!({
                "status": "done",
                "translated_models": [{
                    "asset_name": "query_1.sql",
                    "source_sql": "SELECT 1",
                    "target_sql": "SELECT 1",
                    "translation_status": "success"
                }]
            }),
        );

        let workflow = workflow_with(mock.clone());
        let (_handle, token) = cancel_pair();
        let queries = vec!["SELECT 1".to_string(), "SELECT 2".to_string()];

        let outcome = workflow.run("donor-token", &queries, token).await.unwrap();

        assert_eq!(outcome.phase, WorkflowPhase::Done);
        assert_eq!(outcome.run.project_id, 9);
        assert_eq!(outcome.run.translation_id, 314);
        assert_eq!(outcome.job.status, JobStatus::Done);
        assert_eq!(outcome.job.translated_models.len(), 1);
        assert_eq!(mock.request_count("GET", "/translate/jobs/314"), 2);

        let upload = mock
            .requests()
            .into_iter()
            .find(|r| r.url.ends_with("/projects/9/files"))
            .expect("upload request recorded");
        let files = upload.body.unwrap()["files"].clone();
        assert_eq!(files[0]["filename"], "query_1.sql");
        assert_eq!(files[0]["content"], "SELECT 1");
        assert_eq!(files[1]["filename"], "query_2.sql");
        assert_eq!(files[1]["content"], "SELECT 2");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_maps_to_failed_phase_without_error() {
        let mock = Arc::new(MockTransport::new());
        script_happy_path(&mock);
        mock.enqueue("GET", "/translate/jobs/314", json!({"status": "failed"}));

        let workflow = workflow_with(mock);
        let (_handle, token) = cancel_pair();

        let outcome = workflow.run("donor-token", &[], token).await.unwrap();
        assert_eq!(outcome.phase, WorkflowPhase::Failed);
        assert_eq!(outcome.job.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn selection_error_aborts_before_project_creation() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue("POST", "/org", json!({"api_token": "key-1", "org_id": 42}));
        mock.enqueue(
            "GET",
            "/api/v1/data_sources",
            json!([{"id": 1, "type": "snowflake"}]),
        );

        let workflow = workflow_with(mock.clone());
        let (_handle, token) = cancel_pair();

        let result = workflow.run("donor-token", &[], token).await;
        assert!(matches!(
            result,
            Err(TranslatorError::DataSourceSelection(_))
        ));
        assert_eq!(mock.request_count("POST", "/api/internal/dma/projects"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_list_uploads_zero_files() {
        let mock = Arc::new(MockTransport::new());
        script_happy_path(&mock);
        mock.enqueue(
            "GET",
            "/translate/jobs/314",
            json!({"status": "done", "translated_models": []}),
        );

        let workflow = workflow_with(mock.clone());
        let (_handle, token) = cancel_pair();
        workflow.run("donor-token", &[], token).await.unwrap();

        let upload = mock
            .requests()
            .into_iter()
            .find(|r| r.url.ends_with("/projects/9/files"))
            .expect("upload request recorded");
        assert_eq!(upload.body.unwrap()["files"].as_array().unwrap().len(), 0);
    }
}
