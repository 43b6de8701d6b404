// ABOUTME: Closed set of reporting providers
// ABOUTME: Parses and prints the short names used throughout the public API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FetchError;

/// Reporting API a fetch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Search Console search analytics
    #[serde(rename = "GSC")]
    Gsc,
    /// Universal Analytics reporting v4
    #[serde(rename = "GA3")]
    Ga3,
    /// GA4 data API
    #[serde(rename = "GA4")]
    Ga4,
    /// Search Console URL inspection
    #[serde(rename = "URL")]
    UrlInspection,
}

impl ProviderKind {
    /// Every provider, in display order
    pub const ALL: [Self; 4] = [Self::Gsc, Self::Ga3, Self::Ga4, Self::UrlInspection];

    /// Short upper-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gsc => "GSC",
            Self::Ga3 => "GA3",
            Self::Ga4 => "GA4",
            Self::UrlInspection => "URL",
        }
    }

    /// Whether the provider is one of the Google Analytics APIs
    #[must_use]
    pub const fn is_analytics(self) -> bool {
        matches!(self, Self::Ga3 | Self::Ga4)
    }

    /// Whether the provider reports over a date range
    #[must_use]
    pub const fn needs_date_range(self) -> bool {
        !matches!(self, Self::UrlInspection)
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GSC" => Ok(Self::Gsc),
            "GA3" | "UA" => Ok(Self::Ga3),
            "GA4" => Ok(Self::Ga4),
            "URL" | "URL_INSPECTION" => Ok(Self::UrlInspection),
            other => Err(FetchError::invalid(format!("unknown provider '{other}'"))),
        }
    }
}
