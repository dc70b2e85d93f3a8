use crate::api::{ApiClient, Session, TranslationJob};
use crate::utils::{Result, TranslatorError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Create a linked cancel handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Caller-side handle that cancels the polling loop.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Token checked by the poller before each request and raced against
/// each sleep.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the token is cancelled. If the handle is dropped
    /// without cancelling, the future never resolves.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Fixed-interval polling loop over the translation job endpoint.
///
/// Returns the job unconditionally once it reaches `done` or `failed`;
/// a failed job is a value for the caller to inspect, not an error.
/// There is no timeout bound; callers bound the wait via the token.
pub struct JobPoller {
    interval: Duration,
}

impl JobPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub async fn wait_until_terminal(
        &self,
        client: &ApiClient,
        session: &Session,
        project_id: i64,
        translation_id: i64,
        mut cancel: CancelToken,
    ) -> Result<TranslationJob> {
        loop {
            if cancel.is_cancelled() {
                return Err(TranslatorError::Cancelled);
            }

            let job = client
                .fetch_translation_job(session, project_id, translation_id)
                .await?;

            if job.status.is_terminal() {
                info!(project_id, translation_id, status = %job.status, "Translation finished");
                return Ok(job);
            }

            debug!(project_id, translation_id, status = %job.status, "Translation still running");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = cancel.cancelled() => return Err(TranslatorError::Cancelled),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn setup(mock: &Arc<MockTransport>) -> (ApiClient, Session) {
        let client = ApiClient::new("https://app.example.com", mock.clone());
        let session = Session::new("key", 1).unwrap();
        (client, session)
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_done_with_exactly_two_sleeps() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue("GET", "/translate/jobs/5", json!({"status": "pending"}));
        mock.enqueue("GET", "/translate/jobs/5", json!({"status": "pending"}));
        mock.enqueue(
            "GET",
            "/translate/jobs/5",
            json!({"status": "done", "translated_models": []}),
        );

        let (client, session) = setup(&mock);
        let interval = Duration::from_secs(5);
        let poller = JobPoller::new(interval);
        let (_handle, token) = cancel_pair();

        let start = tokio::time::Instant::now();
        let job = poller
            .wait_until_terminal(&client, &session, 3, 5, token)
            .await
            .unwrap();

        assert_eq!(job.status, crate::api::JobStatus::Done);
        assert_eq!(mock.request_count("GET", "/translate/jobs/5"), 3);
        assert_eq!(start.elapsed(), interval * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_is_returned_not_escalated() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue("GET", "/translate/jobs/5", json!({"status": "failed"}));

        let (client, session) = setup(&mock);
        let poller = JobPoller::new(Duration::from_secs(5));
        let (_handle, token) = cancel_pair();

        let job = poller
            .wait_until_terminal(&client, &session, 3, 5, token)
            .await
            .unwrap();

        assert_eq!(job.status, crate::api::JobStatus::Failed);
        assert_eq!(mock.request_count("GET", "/translate/jobs/5"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_stops_before_first_request() {
        let mock = Arc::new(MockTransport::new());
        let (client, session) = setup(&mock);
        let poller = JobPoller::new(Duration::from_secs(5));
        let (handle, token) = cancel_pair();
        handle.cancel();

        let result = poller
            .wait_until_terminal(&client, &session, 3, 5, token)
            .await;

        assert!(matches!(result, Err(TranslatorError::Cancelled)));
        assert_eq!(mock.request_count("GET", "/translate/jobs/5"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_sleep_interrupts_the_wait() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue("GET", "/translate/jobs/5", json!({"status": "running"}));

        let (client, session) = setup(&mock);
        let poller = JobPoller::new(Duration::from_secs(3600));
        let (handle, token) = cancel_pair();

        let wait = tokio::spawn(async move {
            poller
                .wait_until_terminal(&client, &session, 3, 5, token)
                .await
        });

        // Let the first request and the sleep start, then cancel.
        tokio::task::yield_now().await;
        handle.cancel();

        let result = wait.await.unwrap();
        assert!(matches!(result, Err(TranslatorError::Cancelled)));
        assert_eq!(mock.request_count("GET", "/translate/jobs/5"), 1);
    }
}
