//! Scripted transport and store doubles for unit tests.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::StatusCode;

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::ApiError;
use crate::auth::{CredentialKey, MemoryStore, SessionStore};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync;

/// Answers every request with a closure and records what was sent.
pub(crate) struct ScriptedTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<ApiRequest>>,
    yielding: bool,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            yielding: false,
        }
    }

    /// Yield to the scheduler before answering, so joined futures interleave.
    pub(crate) fn yielding(mut self) -> Self {
        self.yielding = true;
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count_path(&self, path: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.yielding {
            tokio::task::yield_now().await;
        }
        (self.handler)(request)
    }
}

pub(crate) fn json_response(value: serde_json::Value) -> ApiResponse {
    ApiResponse::new(StatusCode::OK, value.to_string())
}

pub(crate) fn status_response(status: StatusCode) -> ApiResponse {
    ApiResponse::new(status, "")
}

/// Memory store whose reads or writes of one key always fail.
#[derive(Default)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    fail_get: Option<CredentialKey>,
    fail_set: Option<CredentialKey>,
}

impl FailingStore {
    pub(crate) fn with_tokens(access: &str, refresh: &str) -> Self {
        Self {
            inner: MemoryStore::with_tokens(access, refresh),
            ..Self::default()
        }
    }

    pub(crate) fn failing_get(mut self, key: CredentialKey) -> Self {
        self.fail_get = Some(key);
        self
    }

    pub(crate) fn failing_set(mut self, key: CredentialKey) -> Self {
        self.fail_set = Some(key);
        self
    }
}

impl SessionStore for FailingStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        if self.fail_get == Some(key) {
            bail!("{} unreadable", key);
        }
        self.inner.get(key)
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        if self.fail_set == Some(key) {
            bail!("{} not writable", key);
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: CredentialKey) -> Result<()> {
        self.inner.remove(key)
    }
}
