// ABOUTME: Shared HTTP client with connection pooling for reporting API calls
// ABOUTME: Singleton with configurable timeouts, initialized once per process
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;

/// Default request timeout in seconds; full report pages can take a while
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// User agent sent with every reporting call
const USER_AGENT: &str = concat!("googalytics/", env!("CARGO_PKG_VERSION"));

/// Timeouts for the shared client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout_secs: u64,
    /// TCP/TLS connect timeout
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

static CLIENT_CONFIG: OnceLock<HttpClientConfig> = OnceLock::new();

static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Set the shared client timeouts
///
/// Only the first call has an effect, and only if it happens before the first
/// `shared_client()` call. Returns whether this call's values were stored.
pub fn initialize_shared_client(config: HttpClientConfig) -> bool {
    CLIENT_CONFIG.set(config).is_ok()
}

/// Pooled HTTP client shared by every `HttpTransport`
///
/// Falls back to default timeouts if `initialize_shared_client()` was not called.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let config = CLIENT_CONFIG.get().copied().unwrap_or_default();
        ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}
