// ABOUTME: reqwest-backed transport executing native reporting requests
// ABOUTME: Bearer-token authentication with exponential backoff on HTTP 429
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use async_trait::async_trait;
use googalytics_core::ProviderError;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::http_client::shared_client;
use crate::transport::{ApiBaseUrls, NativeRequest, RawQuery};

/// Transport-level retry behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts before giving up on a retryable status
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry
    pub initial_backoff_ms: u64,
    /// Statuses that trigger a retry
    pub retryable_status_codes: Vec<StatusCode>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            retryable_status_codes: vec![StatusCode::TOO_MANY_REQUESTS],
        }
    }
}

impl RetryConfig {
    /// Backoff before retry number `attempt` (1-based)
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

/// HTTP transport for the Google reporting APIs
///
/// The access token is obtained elsewhere; this transport only attaches it.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    access_token: String,
    base_urls: ApiBaseUrls,
    retry: RetryConfig,
}

impl Debug for HttpTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("access_token", &"[redacted]")
            .field("base_urls", &self.base_urls)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Transport on the shared client with default endpoints and retry
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: shared_client().clone(),
            access_token: access_token.into(),
            base_urls: ApiBaseUrls::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Use a dedicated client instead of the shared one
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Override the API roots
    #[must_use]
    pub fn with_base_urls(mut self, base_urls: ApiBaseUrls) -> Self {
        self.base_urls = base_urls;
        self
    }

    /// Override retry behaviour
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn classify_failure(provider: &str, status: StatusCode, body: String) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::AuthenticationFailed {
                    provider: provider.to_owned(),
                    reason: body,
                }
            }
            _ => ProviderError::ApiError {
                provider: provider.to_owned(),
                status_code: status.as_u16(),
                message: body,
                retryable: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            },
        }
    }
}

#[async_trait]
impl RawQuery for HttpTransport {
    async fn raw_query(&self, request: &NativeRequest) -> Result<JsonValue, ProviderError> {
        let provider = request.provider().as_str();
        let url = self.base_urls.url_for(&request.endpoint);
        debug!("Starting {provider} API request to: {url}");

        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.access_token)
                .json(&request.body)
                .send()
                .await
                .map_err(|e| ProviderError::NetworkError {
                    provider: provider.to_owned(),
                    message: e.to_string(),
                })?;

            let status = response.status();
            debug!("Received {provider} HTTP response with status: {status}");

            if self.retry.retryable_status_codes.contains(&status) {
                attempt += 1;
                if attempt >= self.retry.max_retries {
                    let max_retries = self.retry.max_retries;
                    warn!("{provider} API rate limit exceeded - max retries ({max_retries}) reached");
                    let retry_after_secs = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse().ok());
                    return Err(ProviderError::RateLimitExceeded {
                        provider: provider.to_owned(),
                        retry_after_secs,
                    });
                }

                let backoff = self.retry.backoff(attempt);
                let max_retries = self.retry.max_retries;
                let backoff_ms = backoff.as_millis();
                warn!(
                    "{provider} API rate limit hit ({status}) - retry {attempt}/{max_retries} after {backoff_ms}ms backoff"
                );
                sleep(backoff).await;
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                error!("{provider} API request failed - status: {status}, body: {text}");
                return Err(Self::classify_failure(provider, status, text));
            }

            let body = response
                .json::<JsonValue>()
                .await
                .map_err(|e| ProviderError::ParseError {
                    provider: provider.to_owned(),
                    message: e.to_string(),
                })?;
            info!("{provider} API request to {url} succeeded");
            return Ok(body);
        }
    }
}
