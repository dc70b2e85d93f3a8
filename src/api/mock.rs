//! Scripted transport for tests and offline runs.
//!
//! Responses are queued per method + path suffix and replayed in order,
//! so a polling loop hitting the same URL can observe a status sequence.
//! Every request is recorded for later assertions.

use crate::api::transport::{ApiTransport, AuthScheme};
use crate::utils::{Result, TranslatorError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub auth: AuthScheme,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<Vec<(String, String, VecDeque<Value>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests whose URL ends with `path`.
    pub fn enqueue(&self, method: &str, path: &str, response: Value) {
        let mut scripts = self.scripts.lock().unwrap();
        if let Some((_, _, queue)) = scripts
            .iter_mut()
            .find(|(m, p, _)| m == method && p == path)
        {
            queue.push_back(response);
        } else {
            scripts.push((
                method.to_string(),
                path.to_string(),
                VecDeque::from([response]),
            ));
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests whose URL ends with `path`.
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(path))
            .count()
    }

    fn record_and_reply(
        &self,
        method: &str,
        url: &str,
        auth: &AuthScheme,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            auth: auth.clone(),
            body: body.cloned(),
        });

        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts
            .iter_mut()
            .find(|(m, p, _)| m == method && url.ends_with(p.as_str()));

        match script.and_then(|(_, _, queue)| queue.pop_front()) {
            Some(response) => Ok(response),
            None => Err(TranslatorError::Precondition(format!(
                "no scripted response for {} {}",
                method, url
            ))),
        }
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn get_json(&self, url: &str, auth: &AuthScheme) -> Result<Value> {
        self.record_and_reply("GET", url, auth, None)
    }

    async fn post_json(
        &self,
        url: &str,
        auth: &AuthScheme,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.record_and_reply("POST", url, auth, body)
    }
}
