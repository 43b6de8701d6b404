// ABOUTME: Per-field rules mapping provider field names to canonical snake_case columns
// ABOUTME: One raw dimension may expand into several canonical columns or drop its row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::BTreeSet;

use chrono::Timelike;
use googalytics_core::{ProviderKind, Value};

use super::values::{
    camel_to_snake, clean_product_name, country_from_alpha2, country_from_alpha3,
    parse_compact_date, parse_compact_datetime, parse_iso_date, split_source_medium,
    strip_ga_prefix, url_parameter, url_path, url_path_without_query, CountryCode, OTHER_DATE,
};

/// Canonical name of the report date column
pub const RECORD_DATE: &str = "record_date";
/// Canonical name of the report start date column for date-less reports
pub const RECORD_DATE_START: &str = "record_date_start";

const DATE_COLUMNS: &[&str] = &[RECORD_DATE];
const DATE_TIME_COLUMNS: &[&str] = &[RECORD_DATE, "record_time"];
const COUNTRY_COLUMNS: &[&str] = &["country_iso_code"];
const DEVICE_COLUMNS: &[&str] = &["device"];
const QUERY_COLUMNS: &[&str] = &["query"];
const ANALYTICS_PAGE_COLUMNS: &[&str] =
    &["landing_page", "landing_page_full", "landing_page_parameter"];
const SEARCH_PAGE_COLUMNS: &[&str] = &[
    "landing_page",
    "landing_page_full",
    "landing_page_parameter",
    "landing_page_nodomain",
];
const SOURCE_MEDIUM_COLUMNS: &[&str] = &["source", "medium"];
const PRODUCT_COLUMNS: &[&str] = &["product_name"];

/// How one raw dimension becomes canonical columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionRule {
    /// GA `YYYYMMDD` date; `(other)` rows are dropped
    CompactDate,
    /// Search Console `YYYY-MM-DD` date
    IsoDate,
    /// GA `dateHour` / `dateHourMinute`
    DateTime,
    /// GA alpha-2 country code
    Alpha2Country,
    /// Search Console alpha-3 country code
    Alpha3Country,
    /// Device category, lower-cased
    Device,
    /// Search query, lower-cased
    Query,
    /// GA landing page path
    AnalyticsLandingPage,
    /// Search Console page URL
    SearchPage,
    /// Combined `source / medium`
    SourceMedium,
    /// GA product or item name
    ProductName,
    /// Anything else: snake-cased name, value unchanged
    Plain(String),
}

impl DimensionRule {
    /// Rule for a raw dimension of `provider`
    #[must_use]
    pub fn for_field(provider: ProviderKind, raw: &str) -> Self {
        let name = strip_ga_prefix(raw);
        match provider {
            ProviderKind::Gsc => match name {
                "date" => Self::IsoDate,
                "country" => Self::Alpha3Country,
                "device" => Self::Device,
                "query" => Self::Query,
                "page" => Self::SearchPage,
                _ => Self::Plain(camel_to_snake(name)),
            },
            ProviderKind::Ga3 | ProviderKind::Ga4 => match name {
                "date" => Self::CompactDate,
                "dateHour" | "dateHourMinute" => Self::DateTime,
                "countryIsoCode" | "countryId" => Self::Alpha2Country,
                "deviceCategory" => Self::Device,
                "landingPagePath" | "landingPagePlusQueryString" | "landingPage" => {
                    Self::AnalyticsLandingPage
                }
                "sourceMedium" | "sessionSourceMedium" => Self::SourceMedium,
                "productName" | "itemName" => Self::ProductName,
                _ => Self::Plain(camel_to_snake(name)),
            },
            ProviderKind::UrlInspection => Self::Plain(camel_to_snake(name)),
        }
    }

    /// Canonical columns produced, in order
    #[must_use]
    pub fn outputs(&self) -> Vec<String> {
        let fixed: &[&str] = match self {
            Self::CompactDate | Self::IsoDate => DATE_COLUMNS,
            Self::DateTime => DATE_TIME_COLUMNS,
            Self::Alpha2Country | Self::Alpha3Country => COUNTRY_COLUMNS,
            Self::Device => DEVICE_COLUMNS,
            Self::Query => QUERY_COLUMNS,
            Self::AnalyticsLandingPage => ANALYTICS_PAGE_COLUMNS,
            Self::SearchPage => SEARCH_PAGE_COLUMNS,
            Self::SourceMedium => SOURCE_MEDIUM_COLUMNS,
            Self::ProductName => PRODUCT_COLUMNS,
            Self::Plain(name) => return vec![name.clone()],
        };
        fixed.iter().map(|c| (*c).to_owned()).collect()
    }

    /// Canonical cells for one raw cell, or `None` when the row must be dropped
    ///
    /// Unknown country codes are collected into `unknown_countries`.
    pub fn apply(
        &self,
        value: &Value,
        unknown_countries: &mut BTreeSet<String>,
    ) -> Option<Vec<Value>> {
        let Some(text) = value.as_str() else {
            return Some(self.passthrough(value));
        };
        let cells = match self {
            Self::CompactDate => {
                if text == OTHER_DATE {
                    return None;
                }
                vec![parse_compact_date(text).map_or(Value::Null, Value::Date)]
            }
            Self::IsoDate => vec![parse_iso_date(text).map_or(Value::Null, Value::Date)],
            Self::DateTime => {
                if text == OTHER_DATE {
                    return None;
                }
                parse_compact_datetime(text).map_or_else(
                    || vec![Value::Null, Value::Null],
                    |at| {
                        let minute = at
                            .time()
                            .with_second(0)
                            .map_or(Value::Null, Value::Time);
                        vec![Value::Date(at.date()), minute]
                    },
                )
            }
            Self::Alpha2Country => vec![country_cell(country_from_alpha2(text), unknown_countries)],
            Self::Alpha3Country => vec![country_cell(country_from_alpha3(text), unknown_countries)],
            Self::Device | Self::Query => vec![Value::text(text.to_lowercase())],
            Self::AnalyticsLandingPage => {
                let full = url_path(text);
                vec![
                    Value::text(url_path_without_query(full)),
                    Value::text(full),
                    Value::optional_text(url_parameter(full)),
                ]
            }
            Self::SearchPage => vec![
                Value::text(url_path_without_query(text)),
                Value::text(text),
                Value::optional_text(url_parameter(text)),
                Value::text(url_path(text)),
            ],
            Self::SourceMedium => {
                let (source, medium) = split_source_medium(text);
                vec![Value::Text(source), Value::optional_text(medium)]
            }
            Self::ProductName => vec![Value::Text(clean_product_name(text))],
            Self::Plain(_) => vec![value.clone()],
        };
        Some(cells)
    }

    fn passthrough(&self, value: &Value) -> Vec<Value> {
        match self {
            Self::Plain(_) => vec![value.clone()],
            _ => vec![Value::Null; self.outputs().len()],
        }
    }
}

fn country_cell(code: CountryCode, unknown_countries: &mut BTreeSet<String>) -> Value {
    match code {
        CountryCode::Known(code) => Value::Text(code),
        CountryCode::Unknown(code) => {
            unknown_countries.insert(code.clone());
            Value::Text(code)
        }
    }
}

/// Canonical name of a metric
#[must_use]
pub fn canonical_metric(provider: ProviderKind, metric: &str) -> String {
    let name = strip_ga_prefix(metric);
    match (provider, name) {
        (ProviderKind::Ga3 | ProviderKind::Ga4, "transactionsPerSession") => {
            "conversion_rate".to_owned()
        }
        (ProviderKind::Ga3 | ProviderKind::Ga4, "itemPurchaseQuantity") => "item_quantity".to_owned(),
        _ => camel_to_snake(name),
    }
}

/// Canonical columns for raw dimensions, in order
#[must_use]
pub fn canonical_dimensions(provider: ProviderKind, dimensions: &[String]) -> Vec<String> {
    dimensions
        .iter()
        .flat_map(|d| DimensionRule::for_field(provider, d).outputs())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ga3_defaults_expand() {
        let dims: Vec<String> = ["ga:date", "ga:landingPagePath", "ga:sourceMedium"]
            .iter()
            .map(|d| (*d).to_owned())
            .collect();
        assert_eq!(
            canonical_dimensions(ProviderKind::Ga3, &dims),
            vec![
                "record_date",
                "landing_page",
                "landing_page_full",
                "landing_page_parameter",
                "source",
                "medium"
            ]
        );
    }

    #[test]
    fn test_metric_renames() {
        assert_eq!(
            canonical_metric(ProviderKind::Ga3, "ga:transactionsPerSession"),
            "conversion_rate"
        );
        assert_eq!(
            canonical_metric(ProviderKind::Ga4, "itemPurchaseQuantity"),
            "item_quantity"
        );
        assert_eq!(canonical_metric(ProviderKind::Ga4, "totalUsers"), "total_users");
        assert_eq!(canonical_metric(ProviderKind::Gsc, "clicks"), "clicks");
    }

    #[test]
    fn test_other_date_drops_row() {
        let mut unknown = BTreeSet::new();
        assert!(DimensionRule::CompactDate
            .apply(&Value::text("(other)"), &mut unknown)
            .is_none());
    }

    #[test]
    fn test_search_page_expansion() {
        let mut unknown = BTreeSet::new();
        let cells = DimensionRule::SearchPage
            .apply(&Value::text("https://example.com/a/b?x=1"), &mut unknown)
            .unwrap_or_default();
        assert_eq!(
            cells,
            vec![
                Value::text("/a/b"),
                Value::text("https://example.com/a/b?x=1"),
                Value::text("x=1"),
                Value::text("/a/b?x=1"),
            ]
        );
    }
}
