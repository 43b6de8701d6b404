// ABOUTME: Structured errors for reporting API calls
// ABOUTME: Carries the provider name and raw status so callers can decide on retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use thiserror::Error;

/// Error returned by a provider adapter or transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The API answered with a non-success status
    #[error("{provider} API error ({status_code}): {message}")]
    ApiError {
        /// Provider that produced the error
        provider: String,
        /// Raw HTTP status code
        status_code: u16,
        /// Response body or error description
        message: String,
        /// Whether repeating the call could succeed
        retryable: bool,
    },

    /// The request never produced a response
    #[error("{provider} network error: {message}")]
    NetworkError {
        /// Provider that was being called
        provider: String,
        /// Underlying transport error
        message: String,
    },

    /// The response body could not be decoded
    #[error("{provider} response could not be parsed: {message}")]
    ParseError {
        /// Provider that produced the body
        provider: String,
        /// Decoder error
        message: String,
    },

    /// Credentials were rejected
    #[error("{provider} authentication failed: {reason}")]
    AuthenticationFailed {
        /// Provider that rejected the credentials
        provider: String,
        /// Reason reported by the API
        reason: String,
    },

    /// Quota or rate limit exhausted after transport retries
    #[error("{provider} rate limit exceeded")]
    RateLimitExceeded {
        /// Provider that throttled the call
        provider: String,
        /// Suggested wait before retrying, when the API reported one
        retry_after_secs: Option<u64>,
    },

    /// Adapter could not be built from the session scope
    #[error("{provider} is not configured: {details}")]
    ConfigurationError {
        /// Provider missing configuration
        provider: String,
        /// What is missing
        details: String,
    },

    /// A field in an otherwise valid response had an unexpected shape
    #[error("{provider} returned invalid data in '{field}': {reason}")]
    InvalidData {
        /// Provider that produced the data
        provider: String,
        /// Offending field
        field: String,
        /// What was wrong with it
        reason: String,
    },
}

impl ProviderError {
    /// Name of the provider the error came from
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::ApiError { provider, .. }
            | Self::NetworkError { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::AuthenticationFailed { provider, .. }
            | Self::RateLimitExceeded { provider, .. }
            | Self::ConfigurationError { provider, .. }
            | Self::InvalidData { provider, .. } => provider,
        }
    }

    /// Raw HTTP status, when the API answered at all
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => Some(*status_code),
            Self::AuthenticationFailed { .. } => Some(401),
            Self::RateLimitExceeded { .. } => Some(429),
            _ => None,
        }
    }

    /// Whether the caller may retry the same request
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { retryable, .. } => *retryable,
            Self::NetworkError { .. } | Self::RateLimitExceeded { .. } => true,
            _ => false,
        }
    }

    /// Whether the error came back as an HTTP response
    #[must_use]
    pub const fn is_http_error(&self) -> bool {
        self.status_code().is_some()
    }
}
