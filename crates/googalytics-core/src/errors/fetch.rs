// ABOUTME: Errors returned by a whole fetch-and-assemble call
// ABOUTME: Distinguishes invalid requests, provider failures and internal inconsistencies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use thiserror::Error;

use super::provider::ProviderError;
use super::table::TableError;
use crate::models::ProviderKind;

/// Error returned by a fetch
///
/// A fetch either yields a complete table or one of these; partial tables are
/// never returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request was rejected before any I/O
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What is wrong with the request
        reason: String,
    },

    /// A provider call failed while fetching a batch
    #[error("{provider} fetch failed for batch {batch} at row offset {page_offset}: {source}")]
    ProviderFetch {
        /// Provider being fetched
        provider: ProviderKind,
        /// Index of the metric batch
        batch: usize,
        /// Row offset of the page that failed
        page_offset: usize,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// Batches or pages disagreed in a way that indicates a logic defect
    #[error("internal inconsistency: {details}")]
    InternalInconsistency {
        /// Description of the mismatch
        details: String,
    },

    /// The row cap was reached and the request asked for no truncation
    #[error("{provider} result exceeds the row cap of {row_cap}")]
    Truncated {
        /// Provider being fetched
        provider: ProviderKind,
        /// Row cap that was hit
        row_cap: usize,
    },
}

impl FetchError {
    /// Build an `InvalidRequest` error
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Build an `InternalInconsistency` error
    #[must_use]
    pub fn inconsistency(details: impl Into<String>) -> Self {
        Self::InternalInconsistency {
            details: details.into(),
        }
    }

    /// Provider error behind a failed fetch, if any
    #[must_use]
    pub const fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::ProviderFetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TableError> for FetchError {
    fn from(err: TableError) -> Self {
        Self::inconsistency(err.to_string())
    }
}
