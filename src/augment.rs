// ABOUTME: Derived boolean columns and the Google-organic row filter
// ABOUTME: Query intent flags for Search Console, traffic and shopping flags for Analytics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Derived Columns
//!
//! Boolean columns computed from one source column and inserted right after
//! it. A derived column takes the role of its source column, so a flag derived
//! from a dimension joins like a dimension and a flag derived from a metric
//! aggregates like a metric.

use std::sync::LazyLock;

use googalytics_core::{Column, ColumnRole, ProviderKind, ResultTable, RowView, TableError, Value};
use regex::Regex;
use tracing::debug;

static QUESTION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(what|why|how|can |do |does|where|who(se)? |who'?s |which|when|is |are )|\?$",
    )
    .ok()
});

static TRANSACTIONAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"buy|cost|price|cheap|pricing|affordable").ok());

static INVESTIGATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"best|most|cheapest| vs| v\.s\.").ok());

/// GA `userType` value for first-time visitors
const NEW_VISITOR: &str = "New Visitor";
/// GA `shoppingStage` value covering every visit
const ALL_VISITS: &str = "ALL_VISITS";
/// GA `searchUsed` value for visits that used site search
const SITE_SEARCH_USED: &str = "Visits With Site Search";

/// Whether a search query reads as a question
#[must_use]
pub fn is_question(query: &str) -> bool {
    matches_pattern(&QUESTION, query)
}

/// Whether a search query shows buying intent
#[must_use]
pub fn is_transactional(query: &str) -> bool {
    matches_pattern(&TRANSACTIONAL, query)
}

/// Whether a search query compares options
#[must_use]
pub fn is_investigation(query: &str) -> bool {
    matches_pattern(&INVESTIGATION, query)
}

fn matches_pattern(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Flag derived from a single source column
struct Flag {
    name: &'static str,
    source: &'static str,
    derive: fn(&Value) -> Value,
}

fn text_flag(value: &Value, test: fn(&str) -> bool) -> Value {
    value
        .as_str()
        .map_or(Value::Null, |text| Value::Boolean(test(text)))
}

fn question_flag(value: &Value) -> Value {
    text_flag(value, is_question)
}

fn transactional_flag(value: &Value) -> Value {
    text_flag(value, is_transactional)
}

fn investigation_flag(value: &Value) -> Value {
    text_flag(value, is_investigation)
}

fn has_item_flag(value: &Value) -> Value {
    Value::Boolean(value.as_f64().is_some_and(|quantity| quantity > 0.0))
}

fn new_user_flag(value: &Value) -> Value {
    text_flag(value, |user_type| user_type == NEW_VISITOR)
}

fn shopping_stage_all_flag(value: &Value) -> Value {
    text_flag(value, |stage| stage == ALL_VISITS)
}

fn site_search_flag(value: &Value) -> Value {
    text_flag(value, |search_used| search_used == SITE_SEARCH_USED)
}

const SEARCH_FLAGS: &[Flag] = &[
    Flag {
        name: "is_question",
        source: "query",
        derive: question_flag,
    },
    Flag {
        name: "is_transactional",
        source: "query",
        derive: transactional_flag,
    },
    Flag {
        name: "is_investigation",
        source: "query",
        derive: investigation_flag,
    },
];

const ANALYTICS_FLAGS: &[Flag] = &[
    Flag {
        name: "has_item",
        source: "item_quantity",
        derive: has_item_flag,
    },
    Flag {
        name: "is_new_user",
        source: "user_type",
        derive: new_user_flag,
    },
    Flag {
        name: "shopping_stage_all",
        source: "shopping_stage",
        derive: shopping_stage_all_flag,
    },
    Flag {
        name: "has_site_search",
        source: "search_used",
        derive: site_search_flag,
    },
];

/// Insert every boolean column whose source column is present
///
/// Search Console tables get query intent flags after `query`; Analytics
/// tables get `is_google_organic` after `medium` plus item, visitor, shopping
/// and site-search flags after their source columns. Flags already present
/// are left alone.
///
/// # Errors
///
/// Returns a `TableError` only if the table is internally inconsistent
pub fn add_boolean_metrics(
    table: &mut ResultTable,
    provider: ProviderKind,
) -> Result<(), TableError> {
    let flags: &[Flag] = match provider {
        ProviderKind::Gsc => SEARCH_FLAGS,
        ProviderKind::Ga3 | ProviderKind::Ga4 => {
            add_google_organic_column(table)?;
            ANALYTICS_FLAGS
        }
        ProviderKind::UrlInspection => &[],
    };
    // Insert in reverse so flags sharing a source keep their listed order
    for flag in flags.iter().rev() {
        add_flag(table, flag)?;
    }
    Ok(())
}

fn add_flag(table: &mut ResultTable, flag: &Flag) -> Result<(), TableError> {
    let Some(role) = table.role_of(flag.source) else {
        return Ok(());
    };
    if table.has_column(flag.name) {
        return Ok(());
    }
    table.derive_column(
        column_with_role(flag.name, role),
        Some(flag.source),
        |row| row.get(flag.source).map_or(Value::Null, flag.derive),
    )?;
    debug!(column = flag.name, "Added derived column");
    Ok(())
}

fn column_with_role(name: &str, role: ColumnRole) -> Column {
    match role {
        ColumnRole::Dimension => Column::dimension(name),
        ColumnRole::Metric => Column::metric(name),
    }
}

/// Insert `is_google_organic` after `medium` when `source` and `medium` exist
///
/// # Errors
///
/// Returns a `TableError` only if the table is internally inconsistent
pub fn add_google_organic_column(table: &mut ResultTable) -> Result<(), TableError> {
    if !table.has_column("source") || table.has_column("is_google_organic") {
        return Ok(());
    }
    let Some(role) = table.role_of("medium") else {
        return Ok(());
    };
    table.derive_column(
        column_with_role("is_google_organic", role),
        Some("medium"),
        |row| Value::Boolean(is_google_organic_row(&row)),
    )
}

fn is_google_organic_row(row: &RowView<'_>) -> bool {
    row.text("source") == Some("google") && row.text("medium") == Some("organic")
}

/// Keep Google organic rows and drop the `source` and `medium` columns
///
/// # Errors
///
/// Returns `TableError::UnknownColumn` if `source` or `medium` is missing
pub fn filter_google_organic(table: &ResultTable) -> Result<ResultTable, TableError> {
    for required in ["source", "medium"] {
        if !table.has_column(required) {
            return Err(TableError::UnknownColumn(required.to_owned()));
        }
    }
    let mut filtered = table.filter_rows(|row| is_google_organic_row(&row));
    filtered.drop_columns(&["source", "medium"])?;
    Ok(filtered)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_intent() {
        assert!(is_question("how to tie shoes"));
        assert!(is_question("shoes for running?"));
        assert!(is_question("who's playing tonight"));
        assert!(!is_question("doctor who's new companion"));
        assert!(!is_question("running shoes"));
        assert!(is_transactional("buy running shoes"));
        assert!(is_transactional("cheapest running shoes"));
        assert!(is_investigation("best running shoes"));
        assert!(is_investigation("nike vs adidas"));
        assert!(!is_investigation("running shoes"));
    }

    #[test]
    fn test_flags_follow_source_role() {
        let mut table = ResultTable::from_rows(
            vec![Column::dimension("query"), Column::metric("clicks")],
            vec![
                vec![Value::text("what is a shoe"), Value::Float(3.0)],
                vec![Value::text("buy shoes"), Value::Float(1.0)],
            ],
        )
        .unwrap();
        add_boolean_metrics(&mut table, ProviderKind::Gsc).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["query", "is_question", "is_transactional", "is_investigation", "clicks"]
        );
        assert_eq!(table.role_of("is_question"), Some(ColumnRole::Dimension));
        assert_eq!(table.value(0, "is_question"), Some(&Value::Boolean(true)));
        assert_eq!(table.value(1, "is_transactional"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_has_item_is_a_metric() {
        let mut table = ResultTable::from_rows(
            vec![Column::dimension("product_name"), Column::metric("item_quantity")],
            vec![
                vec![Value::text("shoe"), Value::Float(2.0)],
                vec![Value::text("sock"), Value::Float(0.0)],
            ],
        )
        .unwrap();
        add_boolean_metrics(&mut table, ProviderKind::Ga3).unwrap();
        assert_eq!(table.role_of("has_item"), Some(ColumnRole::Metric));
        assert_eq!(table.value(0, "has_item"), Some(&Value::Boolean(true)));
        assert_eq!(table.value(1, "has_item"), Some(&Value::Boolean(false)));
    }
}
