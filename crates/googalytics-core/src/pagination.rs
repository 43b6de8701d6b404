// ABOUTME: Page cursors and fetched pages for paginated reporting APIs
// ABOUTME: Covers offset-based (GSC, GA4) and token-based (GA3) continuation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::table::ResultTable;

/// Position of the next page to request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageCursor {
    /// Zero-based row offset (`startRow`, `offset`)
    Offset(usize),
    /// Opaque continuation token returned by the previous page
    Token(String),
}

impl PageCursor {
    /// Cursor for the first page
    #[must_use]
    pub const fn start() -> Self {
        Self::Offset(0)
    }

    /// Row offset, when the cursor is offset-based
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::Offset(offset) => Some(*offset),
            Self::Token(_) => None,
        }
    }

    /// Continuation token, when the cursor is token-based
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Offset(_) => None,
            Self::Token(token) => Some(token),
        }
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::start()
    }
}

impl Display for PageCursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset(offset) => write!(f, "offset:{offset}"),
            Self::Token(token) => write!(f, "token:{token}"),
        }
    }
}

/// Consumed and remaining tokens for one GA4 quota bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// Tokens consumed by the request
    pub consumed: i64,
    /// Tokens left in the bucket
    pub remaining: i64,
}

/// GA4 property quota snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyQuota {
    /// Daily token bucket
    pub tokens_per_day: Option<QuotaStatus>,
    /// Hourly token bucket
    pub tokens_per_hour: Option<QuotaStatus>,
    /// Concurrent request slots
    pub concurrent_requests: Option<QuotaStatus>,
    /// Server errors allowed per project and property per hour
    pub server_errors_per_project_per_hour: Option<QuotaStatus>,
    /// Potentially thresholded requests per hour
    pub potentially_thresholded_requests_per_hour: Option<QuotaStatus>,
}

/// Provider-reported facts about one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Total rows the provider says the report has
    pub total_rows: Option<usize>,
    /// GSC `responseAggregationType`
    pub response_aggregation: Option<String>,
    /// GA4 property quota
    pub quota: Option<PropertyQuota>,
    /// GA4 currency code
    pub currency_code: Option<String>,
    /// GA4 time zone
    pub time_zone: Option<String>,
}

/// One page of rows under provider-native column names
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Rows with raw provider headers
    pub table: ResultTable,
    /// Where the next page starts; `None` when the provider says there is none
    pub next: Option<PageCursor>,
    /// Provider-reported facts
    pub info: PageInfo,
}

impl Page {
    /// Number of rows on this page
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the page has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
