use sql_translator::{cancel_pair, render_report, ApiClient, AppConfig, HttpTransport, Workflow};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("sql_translator=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut output = "translation_report.html".to_string();
    let mut query_paths: Vec<String> = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--output" {
            output = iter
                .next()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("--output requires a path"))?;
        } else {
            query_paths.push(arg.clone());
        }
    }

    if query_paths.is_empty() {
        anyhow::bail!("usage: sql-translator [--output report.html] <query.sql>...");
    }

    let org_token = env::var("ORG_TOKEN")
        .map_err(|_| anyhow::anyhow!("ORG_TOKEN environment variable not set"))?;

    let mut queries = Vec::with_capacity(query_paths.len());
    for path in &query_paths {
        queries.push(std::fs::read_to_string(path)?);
    }

    let config = AppConfig::load_or_default(Some("config.toml"));
    tracing::info!(host = %config.api.host, queries = queries.len(), "Starting translation workflow");

    let transport = Arc::new(HttpTransport::new(Duration::from_secs(
        config.api.timeout_seconds,
    ))?);
    let client = ApiClient::new(config.api.host.clone(), transport);
    let workflow = Workflow::new(client, config);

    let (_cancel_handle, cancel) = cancel_pair();
    let outcome = workflow.run(&org_token, &queries, cancel).await?;

    let report = render_report(&outcome.job);
    std::fs::write(&output, report)?;

    tracing::info!(
        path = %output,
        project_id = outcome.run.project_id,
        translation_id = outcome.run.translation_id,
        status = %outcome.job.status,
        "Report written"
    );

    Ok(())
}
