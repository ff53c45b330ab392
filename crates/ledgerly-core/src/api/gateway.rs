//! Authenticated request dispatch.
//!
//! Every request goes out with the stored access credential attached. When
//! the backend answers 401, the gateway makes one attempt to renew the
//! credential with the stored refresh credential and re-issues the request
//! once. If renewal is impossible the session is terminated: both
//! credentials are removed and `SessionEvent::Expired` is emitted.

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::ApiError;
use crate::auth::Session;

/// Token renewal endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "auth/token/refresh/";

#[derive(Debug, Deserialize)]
struct RenewalResponse {
    access: String,
}

pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: Session,
    // Held for the duration of a renewal so concurrent 401s share one
    renewal: Mutex<()>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self {
            transport,
            session,
            renewal: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Uniform call: method, path, optional JSON payload.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = ApiRequest::new(method, path);
        request.body = payload;
        self.send(request).await
    }

    /// Send a request, renewing the access credential at most once.
    /// Non-2xx answers come back as `Err`.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        loop {
            if !request.is_public() {
                self.decorate(&mut request);
            }

            let result = self.dispatch(&request).await;
            match result {
                Err(ApiError::Unauthorized) if !request.is_public() && !request.retried => {
                    request.retried = true;
                    let access = self.renew_for(&request).await?;
                    if let Err(e) = request.set_bearer(&access) {
                        warn!(error = %e, "Renewed access token is not a valid header value");
                    }
                    debug!(path = %request.path, "Retrying request with renewed credential");
                }
                result => return result,
            }
        }
    }

    /// Attach the stored access credential, or strip any stale one.
    /// A retried request keeps its renewed credential when the store has
    /// nothing to offer.
    fn decorate(&self, request: &mut ApiRequest) {
        match self.session.access_token() {
            Some(token) => {
                if let Err(e) = request.set_bearer(&token) {
                    warn!(error = %e, "Stored access token is not a valid header value");
                    request.clear_bearer();
                }
            }
            None if request.retried => {}
            None => request.clear_bearer(),
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        debug!(
            method = %request.method,
            path = %request.path,
            retried = request.retried,
            authenticated = request.bearer_token().is_some(),
            "Sending request"
        );
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_status(response.status, &response.body))
        }
    }

    /// Obtain a usable access credential for a request that just got a 401.
    ///
    /// Returns the original `Unauthorized` when no refresh credential is
    /// stored, or the renewal call's own error when renewal fails. Either
    /// way the session is terminated first.
    async fn renew_for(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let _guard = self.renewal.lock().await;

        // Another request may have renewed while this one was in flight
        if let Some(current) = self.session.access_token() {
            if request.bearer_token() != Some(current.as_str()) {
                debug!("Access credential already renewed, reusing it");
                return Ok(current);
            }
        }

        let Some(refresh) = self.session.refresh_token() else {
            warn!("No refresh credential stored");
            self.session.terminate();
            return Err(ApiError::Unauthorized);
        };

        match self.request_renewal(&refresh).await {
            Ok(access) => {
                debug!("Access credential renewed");
                Ok(access)
            }
            Err(e) => {
                warn!(error = %e, "Refresh token expired or rejected");
                self.session.terminate();
                Err(e)
            }
        }
    }

    async fn request_renewal(&self, refresh: &str) -> Result<String, ApiError> {
        let request = ApiRequest::post(REFRESH_PATH)
            .with_json(serde_json::json!({ "refresh": refresh }))
            .public();

        let response = self.dispatch(&request).await?;
        let renewed: RenewalResponse = response.json()?;
        self.session
            .set_access(&renewed.access)
            .map_err(ApiError::CredentialStore)?;
        Ok(renewed.access)
    }
}
