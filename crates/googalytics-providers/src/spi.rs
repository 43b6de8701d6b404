// ABOUTME: Capability flags and hard limits describing each reporting adapter
// ABOUTME: Lets the fetch pipeline decide on batching and pagination without matching on providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use googalytics_core::constants::limits;
use googalytics_core::ProviderKind;

bitflags::bitflags! {
    /// Adapter capability flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ProviderCapabilities: u8 {
        /// Results span several pages
        const PAGINATED = 0b0000_0001;
        /// Requests carry a date range
        const DATE_RANGE = 0b0000_0010;
        /// Metric lists may need to be split across calls
        const METRIC_BATCHING = 0b0000_0100;
        /// Requests are driven by a list of URLs
        const URL_LIST = 0b0000_1000;
        /// Responses report property quota
        const PROPERTY_QUOTA = 0b0001_0000;
    }
}

impl ProviderCapabilities {
    /// Search Console search analytics
    #[must_use]
    pub const fn search_analytics() -> Self {
        Self::PAGINATED.union(Self::DATE_RANGE)
    }

    /// GA3 reporting
    #[must_use]
    pub const fn universal_analytics() -> Self {
        Self::PAGINATED
            .union(Self::DATE_RANGE)
            .union(Self::METRIC_BATCHING)
    }

    /// GA4 data API
    #[must_use]
    pub const fn ga4() -> Self {
        Self::universal_analytics().union(Self::PROPERTY_QUOTA)
    }

    /// URL inspection
    #[must_use]
    pub const fn url_inspection() -> Self {
        Self::URL_LIST
    }

    /// Capabilities of a provider
    #[must_use]
    pub const fn for_provider(provider: ProviderKind) -> Self {
        match provider {
            ProviderKind::Gsc => Self::search_analytics(),
            ProviderKind::Ga3 => Self::universal_analytics(),
            ProviderKind::Ga4 => Self::ga4(),
            ProviderKind::UrlInspection => Self::url_inspection(),
        }
    }

    /// Whether results are paginated
    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.contains(Self::PAGINATED)
    }

    /// Whether metric lists are split across calls
    #[must_use]
    pub const fn batches_metrics(&self) -> bool {
        self.contains(Self::METRIC_BATCHING)
    }
}

/// Hard limits of one reporting API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderLimits {
    /// Metrics one call may request
    pub max_metrics_per_call: usize,
    /// Largest page the API serves
    pub max_page_size: usize,
    /// Row cap applied when the request sets none; `None` means unbounded
    pub default_row_limit: Option<usize>,
}

impl ProviderLimits {
    /// Limits of a provider
    #[must_use]
    pub const fn for_provider(provider: ProviderKind) -> Self {
        match provider {
            ProviderKind::Gsc => Self {
                max_metrics_per_call: limits::GSC_METRIC_COUNT,
                max_page_size: limits::GSC_MAX_PAGE_SIZE,
                default_row_limit: Some(limits::DEFAULT_ROW_LIMIT),
            },
            ProviderKind::Ga3 => Self {
                max_metrics_per_call: limits::MAX_METRICS_PER_CALL,
                max_page_size: limits::GA3_MAX_PAGE_SIZE,
                default_row_limit: None,
            },
            ProviderKind::Ga4 => Self {
                max_metrics_per_call: limits::MAX_METRICS_PER_CALL,
                max_page_size: limits::GA4_MAX_PAGE_SIZE,
                default_row_limit: None,
            },
            ProviderKind::UrlInspection => Self {
                max_metrics_per_call: 0,
                max_page_size: usize::MAX,
                default_row_limit: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_analytics_batches_metrics() {
        assert!(ProviderCapabilities::for_provider(ProviderKind::Ga3).batches_metrics());
        assert!(ProviderCapabilities::for_provider(ProviderKind::Ga4).batches_metrics());
        assert!(!ProviderCapabilities::for_provider(ProviderKind::Gsc).batches_metrics());
        assert!(!ProviderCapabilities::for_provider(ProviderKind::UrlInspection).is_paginated());
    }
}
