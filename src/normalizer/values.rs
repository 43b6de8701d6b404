// ABOUTME: Cell-level conversions applied while normalizing provider tables
// ABOUTME: Name casing, URL splitting, product name cleanup, date parsing and country codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use googalytics_core::constants::countries;
use regex::Regex;

/// Literal `\uXXXX` escapes left in GA product names
static UNICODE_ESCAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\\u[a-f\d]{4}").ok());

/// Runs of whitespace
static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Prefix GA3 puts on every field name
const GA_PREFIX: &str = "ga:";

/// Date value GA reports for rows beyond its cardinality limits
pub const OTHER_DATE: &str = "(other)";

/// Field name without the GA3 `ga:` prefix
#[must_use]
pub fn strip_ga_prefix(name: &str) -> &str {
    name.strip_prefix(GA_PREFIX).unwrap_or(name)
}

/// `landingPagePath` to `landing_page_path`
#[must_use]
pub fn camel_to_snake(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    for (idx, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() && idx > 0 {
            snake.push('_');
        }
        snake.push(ch.to_ascii_lowercase());
    }
    snake
}

/// Everything from the first `/` after the host, or the input when it has no path
///
/// `https://www.example.com/a/b?c=1` gives `/a/b?c=1`.
#[must_use]
pub fn url_path(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    rest.find('/').map_or(url, |idx| &rest[idx..])
}

/// Path of a URL without its query string
#[must_use]
pub fn url_path_without_query(url: &str) -> &str {
    url_path(url.split('?').next().unwrap_or(url))
}

/// Query string of a URL, without the `?`
#[must_use]
pub fn url_parameter(url: &str) -> Option<&str> {
    url.split('?').nth(1)
}

/// Lower-cased product name with separators, entities and escapes cleaned up
#[must_use]
pub fn clean_product_name(name: &str) -> String {
    let lowered = name
        .trim()
        .to_lowercase()
        .replace(['-', '_'], " ")
        .replace("&amp;", "&");
    let unescaped = UNICODE_ESCAPE
        .as_ref()
        .map_or_else(|| lowered.clone(), |re| re.replace_all(&lowered, " ").into_owned());
    WHITESPACE
        .as_ref()
        .map_or_else(
            || unescaped.clone(),
            |re| re.replace_all(&unescaped, " ").into_owned(),
        )
        .trim()
        .to_owned()
}

/// `google / organic` to (`google`, `Some("organic")`)
#[must_use]
pub fn split_source_medium(value: &str) -> (String, Option<String>) {
    let mut parts = value.split('/');
    let source = parts.next().unwrap_or_default().trim().to_owned();
    let medium = parts.next().map(|m| m.trim().to_owned());
    (source, medium)
}

/// GA `YYYYMMDD` date
#[must_use]
pub fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d").ok()
}

/// Search Console `YYYY-MM-DD` date
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// GA `YYYYMMDDHH` or `YYYYMMDDHHMM` timestamp
#[must_use]
pub fn parse_compact_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    match value.len() {
        10 => NaiveDateTime::parse_from_str(&format!("{value}00"), "%Y%m%d%H%M").ok(),
        12 => NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M").ok(),
        _ => None,
    }
}

/// Outcome of mapping a country code to ISO-3166 alpha-3
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryCode {
    /// Known code, in alpha-3 form
    Known(String),
    /// Unknown code, passed through unchanged
    Unknown(String),
}

/// Map a GA alpha-2 code to alpha-3
#[must_use]
pub fn country_from_alpha2(code: &str) -> CountryCode {
    let trimmed = code.trim();
    match countries::alpha3(trimmed) {
        Some(alpha3) => CountryCode::Known(alpha3.to_owned()),
        None if countries::is_alpha3(trimmed) => CountryCode::Known(trimmed.to_uppercase()),
        None => CountryCode::Unknown(trimmed.to_owned()),
    }
}

/// Upper-case a Search Console alpha-3 code
#[must_use]
pub fn country_from_alpha3(code: &str) -> CountryCode {
    let upper = code.trim().to_uppercase();
    if countries::is_alpha3(&upper) {
        CountryCode::Known(upper)
    } else {
        CountryCode::Unknown(upper)
    }
}
