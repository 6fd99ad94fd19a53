//! Scripted collaborators for controller tests

use crate::api::{ApiFailure, PlatformApi};
use crate::crawler::Sleeper;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

type Response = Result<Value, ApiFailure>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

#[derive(Default)]
struct Script {
    queues: HashMap<String, VecDeque<Response>>,
    defaults: Vec<(String, Response)>,
    calls: Vec<RecordedCall>,
    cancel_after: Option<(String, usize, CancellationToken)>,
}

/// API fake answering from per-path response queues
///
/// A call with an exhausted queue falls back to the first default whose
/// prefix matches the path; anything else panics so a mis-scripted test
/// fails instead of retrying forever.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` for the next call to exactly `path`
    pub fn push(&self, path: &str, response: Response) {
        self.script
            .lock()
            .unwrap()
            .queues
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    /// Answers every otherwise unscripted call under `prefix` with `response`
    pub fn respond_by_default(&self, prefix: &str, response: Response) {
        self.script
            .lock()
            .unwrap()
            .defaults
            .push((prefix.to_string(), response));
    }

    /// Cancels `token` once the `n`th call under `prefix` has been answered
    pub fn cancel_after(&self, prefix: &str, n: usize, token: CancellationToken) {
        self.script.lock().unwrap().cancel_after = Some((prefix.to_string(), n, token));
    }

    pub fn calls_with_prefix(&self, prefix: &str) -> Vec<RecordedCall> {
        self.script
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.path.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PlatformApi for ScriptedApi {
    async fn call(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiFailure> {
        let mut script = self.script.lock().unwrap();

        script.calls.push(RecordedCall {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        let queued = script.queues.get_mut(path).and_then(VecDeque::pop_front);
        let response = match queued {
            Some(response) => response,
            None => match script.defaults.iter().find(|(p, _)| path.starts_with(p.as_str())) {
                Some((_, response)) => response.clone(),
                None => panic!("unscripted call to {}", path),
            },
        };

        if let Some((prefix, n, token)) = &script.cancel_after {
            let served = script
                .calls
                .iter()
                .filter(|c| c.path.starts_with(prefix.as_str()))
                .count();
            if served == *n {
                token.cancel();
            }
        }

        response
    }
}

/// Records requested waits and returns immediately
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
