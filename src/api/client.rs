//! Reqwest-backed client for the compliance API.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;

use super::wire::{ApiErrorBody, UpcomingBuckets};
use super::{IndicatorApi, ReachabilityProbe};
use crate::model::{Indicator, IndicatorPatch, Project};
use crate::types::{Result, SyncError};

/// Endpoint used for reachability probing: cheap, authenticated,
/// side-effect-free.
const PROBE_PATH: &str = "/auth/me/";

/// HTTP client carrying a bearer credential for the compliance API.
///
/// The token is settable at runtime so a session can authenticate after the
/// client is constructed; the client never refreshes tokens itself.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    probe_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            probe_timeout,
        })
    }

    pub fn set_token(&self, token: &str) {
        let mut guard = self.token.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(token.to_string());
    }

    pub fn clear_token(&self) {
        let mut guard = self.token.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    pub fn has_token(&self) -> bool {
        let guard = self.token.read().unwrap_or_else(|p| p.into_inner());
        guard.is_some()
    }

    fn current_token(&self) -> Option<String> {
        let guard = self.token.read().unwrap_or_else(|p| p.into_inner());
        guard.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.current_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a non-2xx response to the error taxonomy: 401 is an auth
    /// failure, anything else carries the server's own message verbatim.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: ApiErrorBody = response.json().await.unwrap_or_default();
        let message = body.into_message(status.as_u16());
        if status == StatusCode::UNAUTHORIZED {
            Err(SyncError::Auth(message))
        } else {
            Err(SyncError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Fetch the authoritative project listing (indicators and evidence
    /// included). The offline cache is a projection of this response.
    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        let response = self
            .authorized(self.http.get(self.url("/projects/")))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// PATCH a partial field set onto one indicator.
    pub async fn patch_indicator(&self, id: &str, patch: &IndicatorPatch) -> Result<Indicator> {
        let response = self
            .authorized(self.http.patch(self.url(&format!("/indicators/{id}/"))))
            .json(patch)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Record a quick compliance log for a recurring indicator; the server
    /// marks it compliant and stamps the log time.
    pub async fn quick_log(&self, id: &str) -> Result<Indicator> {
        let response = self
            .authorized(
                self.http
                    .post(self.url(&format!("/indicators/{id}/quick_log/"))),
            )
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch upcoming recurring tasks, pre-grouped by the server.
    pub async fn fetch_upcoming(&self) -> Result<UpcomingBuckets> {
        let response = self
            .authorized(self.http.get(self.url("/indicators/upcoming/")))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IndicatorApi for ApiClient {
    async fn update_indicator(&self, id: &str, patch: &IndicatorPatch) -> Result<Indicator> {
        self.patch_indicator(id, patch).await
    }
}

#[async_trait]
impl ReachabilityProbe for ApiClient {
    async fn probe(&self) -> Option<bool> {
        let token = self.current_token()?;
        let result = self
            .http
            .get(self.url(PROBE_PATH))
            .bearer_auth(token)
            .timeout(self.probe_timeout)
            .send()
            .await;
        let reachable = match result {
            // Any answer below 500 proves the network path and server
            // process are fine, even a 401 from a stale credential.
            Ok(response) => response.status().as_u16() < 500,
            Err(e) => {
                debug!(error = %e, "reachability probe failed");
                false
            }
        };
        Some(reachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = ApiClient::new(
            "http://localhost:8000/api/",
            Duration::from_secs(30),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.url("/indicators/IND-1/"),
            "http://localhost:8000/api/indicators/IND-1/"
        );
    }

    #[test]
    fn test_token_lifecycle() {
        let client = ApiClient::new(
            "http://localhost:8000/api",
            Duration::from_secs(30),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(!client.has_token());

        client.set_token("secret");
        assert!(client.has_token());

        client.clear_token();
        assert!(!client.has_token());
    }

    #[tokio::test]
    async fn test_probe_without_token_cannot_check() {
        let client = ApiClient::new(
            "http://localhost:8000/api",
            Duration::from_secs(30),
            Duration::from_millis(100),
        )
        .unwrap();
        assert_eq!(client.probe().await, None);
    }
}
