use crate::api::transport::{api_url, ApiTransport, AuthScheme};
use crate::utils::{Result, TranslatorError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Credentials issued by organization provisioning.
///
/// Replaces an implicit process-wide API key cache: the session is created
/// once, then passed by reference into every subsequent call.
#[derive(Clone)]
pub struct Session {
    api_key: String,
    pub org_id: i64,
}

impl Session {
    pub fn new(api_key: impl Into<String>, org_id: i64) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TranslatorError::Precondition(
                "API key is empty; provision an organization first".to_string(),
            ));
        }

        Ok(Self { api_key, org_id })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn auth(&self) -> AuthScheme {
        AuthScheme::Key(self.api_key.clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_key", &"***")
            .field("org_id", &self.org_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSource {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryFile {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// `done` and `failed` both end the polling loop; `failed` is a
    /// terminal value for the caller to inspect, not an error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslatedModel {
    pub asset_name: String,
    pub source_sql: String,
    #[serde(default)]
    pub target_sql: Option<String>,
    pub translation_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationJob {
    pub status: JobStatus,
    #[serde(default)]
    pub translated_models: Vec<TranslatedModel>,
}

#[derive(Debug, Serialize)]
struct CreateProjectRequest<'a> {
    name: &'a str,
    from_data_source_id: i64,
    to_data_source_id: i64,
    version: u32,
    settings: ProjectSettings,
}

/// Fixed migration-behavior flags. Not user-configurable.
#[derive(Debug, Serialize)]
struct ProjectSettings {
    error_on_zero_diff: bool,
    transform_group_creation_strategy: &'static str,
    experimental: ExperimentalSettings,
}

#[derive(Debug, Serialize)]
struct ExperimentalSettings {
    import_sql_files_as_script_objects: bool,
    infer_schema_from_scripts: bool,
    generate_synthetic_data: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            error_on_zero_diff: false,
            transform_group_creation_strategy: "group_individual_operations",
            experimental: ExperimentalSettings {
                import_sql_files_as_script_objects: true,
                infer_schema_from_scripts: true,
                generate_synthetic_data: true,
            },
        }
    }
}

/// Typed client over the migration service API, one method per endpoint.
pub struct ApiClient {
    host: String,
    transport: Arc<dyn ApiTransport>,
}

impl ApiClient {
    pub fn new(host: impl Into<String>, transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            host: host.into(),
            transport,
        }
    }

    /// POST /org — create an organization copied from the donor token and
    /// return the session credentials issued for it.
    pub async fn create_organization(&self, org_token: &str) -> Result<Session> {
        let url = api_url(&self.host, "org");
        info!("Creating organization");

        let body = self
            .transport
            .post_json(&url, &AuthScheme::Bearer(org_token.to_string()), None)
            .await?;

        let api_key = body
            .get("api_token")
            .and_then(Value::as_str)
            .ok_or_else(|| TranslatorError::MalformedResponse("api_token".to_string()))?;
        let org_id = body
            .get("org_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| TranslatorError::MalformedResponse("org_id".to_string()))?;

        info!(org_id, "Organization created");
        Session::new(api_key, org_id)
    }

    /// GET /api/v1/data_sources — all registered data sources.
    pub async fn list_data_sources(&self, session: &Session) -> Result<Vec<DataSource>> {
        let url = api_url(&self.host, "api/v1/data_sources");
        let body = self.transport.get_json(&url, &session.auth()).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// POST /api/internal/dma/projects — create a migration project linking
    /// a source and a target data source.
    pub async fn create_project(
        &self,
        session: &Session,
        name: &str,
        from_data_source_id: i64,
        to_data_source_id: i64,
    ) -> Result<i64> {
        let url = api_url(&self.host, "api/internal/dma/projects");
        let payload = serde_json::to_value(CreateProjectRequest {
            name,
            from_data_source_id,
            to_data_source_id,
            version: 2,
            settings: ProjectSettings::default(),
        })?;

        let body = self
            .transport
            .post_json(&url, &session.auth(), Some(&payload))
            .await?;

        body.pointer("/project/id")
            .and_then(Value::as_i64)
            .ok_or_else(|| TranslatorError::MalformedResponse("project.id".to_string()))
    }

    /// POST .../projects/{id}/files — upload query files as one batch.
    /// The per-file upload stats in the response are logged, nothing more.
    pub async fn upload_files(
        &self,
        session: &Session,
        project_id: i64,
        files: &[QueryFile],
    ) -> Result<()> {
        let url = api_url(
            &self.host,
            &format!("api/internal/dma/v2/projects/{}/files", project_id),
        );
        let payload = serde_json::json!({ "files": files });

        let stats = self
            .transport
            .post_json(&url, &session.auth(), Some(&payload))
            .await?;

        debug!(project_id, files = files.len(), %stats, "Files uploaded");
        Ok(())
    }

    /// POST .../projects/{id}/translate/jobs — start the translation job.
    pub async fn start_translation(&self, session: &Session, project_id: i64) -> Result<i64> {
        let url = api_url(
            &self.host,
            &format!("api/internal/dma/v2/projects/{}/translate/jobs", project_id),
        );
        let payload = serde_json::json!({ "project_id": project_id });

        let body = self
            .transport
            .post_json(&url, &session.auth(), Some(&payload))
            .await?;

        body.get("task_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| TranslatorError::MalformedResponse("task_id".to_string()))
    }

    /// GET .../translate/jobs/{job_id} — current job status and, once
    /// finished, the translated models.
    pub async fn fetch_translation_job(
        &self,
        session: &Session,
        project_id: i64,
        translation_id: i64,
    ) -> Result<TranslationJob> {
        let url = api_url(
            &self.host,
            &format!(
                "api/internal/dma/v2/projects/{}/translate/jobs/{}",
                project_id, translation_id
            ),
        );

        let body = self.transport.get_json(&url, &session.auth()).await?;
        Ok(serde_json::from_value(body)?)
    }
}
