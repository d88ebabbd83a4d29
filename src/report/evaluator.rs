//! Filter predicate evaluation
//!
//! Rows are anything implementing [`Fields`]. Clauses AND together; an empty
//! clause list keeps every row.
//!
//! # Operator semantics
//!
//! ```text
//! equals / notEquals      text exact, numbers numerically, null never equal
//! contains / notContains  text: case-insensitive substring, list: membership
//! greaterThan / lessThan  numeric, else chronological, else lexicographic
//! between                 inclusive, bounds from [low, high] or "low,high"
//! inTheLast               date within [now - days, now]
//! isNull / isNotNull      null or empty text
//! ```
//!
//! The free-text search, date presets and field sort used by list views live
//! here as well, since they share the same value coercions.

use crate::report::ast::{FilterClause, Operator};
use crate::store::{Fields, Value};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Largest `inTheLast` window a filter may ask for, in days
pub const MAX_DAYS_BACK: f64 = 36_500.0;

/// Evaluation context; pins "now" for relative date operators
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    pub now: DateTime<Utc>,
}

impl EvalContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// Keep the rows that satisfy every clause
pub fn apply_filters<T: Fields>(rows: Vec<T>, clauses: &[FilterClause], ctx: &EvalContext) -> Vec<T> {
    if clauses.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| matches_all(row, clauses, ctx))
        .collect()
}

/// Check if a row satisfies all clauses
pub fn matches_all<T: Fields + ?Sized>(row: &T, clauses: &[FilterClause], ctx: &EvalContext) -> bool {
    clauses.iter().all(|clause| matches(row, clause, ctx))
}

/// Check a single clause against a row
pub fn matches<T: Fields + ?Sized>(row: &T, clause: &FilterClause, ctx: &EvalContext) -> bool {
    let field = row.field(&clause.field);
    evaluate(&field, clause.operator, &clause.value, ctx)
}

/// Apply one operator to a field value and a filter value
pub fn evaluate(field: &Value, op: Operator, target: &Value, ctx: &EvalContext) -> bool {
    match op {
        Operator::Equals => equals(field, target),
        Operator::NotEquals => !equals(field, target),
        Operator::Contains => match field {
            Value::Text(s) => contains_ci(s, &target.to_string()),
            Value::List(items) => items.contains(&target.to_string()),
            _ => false,
        },
        Operator::NotContains => match field {
            Value::Text(s) => !contains_ci(s, &target.to_string()),
            Value::List(items) => !items.contains(&target.to_string()),
            _ => false,
        },
        Operator::GreaterThan => compare_values(field, target) == Some(Ordering::Greater),
        Operator::LessThan => compare_values(field, target) == Some(Ordering::Less),
        Operator::Between => match range_bounds(target) {
            Some((low, high)) => {
                matches!(
                    compare_values(field, &low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    compare_values(field, &high),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            None => false,
        },
        Operator::InTheLast => in_the_last(field, target, ctx.now),
        Operator::IsNull => field.is_blank(),
        Operator::IsNotNull => !field.is_blank(),
    }
}

fn equals(field: &Value, target: &Value) -> bool {
    match field {
        Value::Null => false,
        Value::Number(n) => target
            .as_number()
            .map(|t| (n - t).abs() < f64::EPSILON)
            .unwrap_or(false),
        Value::Bool(b) => match target {
            Value::Bool(t) => b == t,
            Value::Text(t) => t.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" }),
            _ => false,
        },
        Value::Text(s) => match target {
            Value::Null => false,
            other => *s == other.to_string(),
        },
        Value::List(items) => match target {
            Value::List(t) => items == t,
            _ => false,
        },
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Order a field value against a filter value
///
/// Numeric when both sides are numbers, chronological when both are dates,
/// lexicographic when both are text. `None` when the values don't compare.
pub fn compare_values(field: &Value, target: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (field.as_number(), target.as_number()) {
        return a.partial_cmp(&b);
    }

    if let (Some(a), Some(b)) = (field.as_date(), target.as_date()) {
        return Some(a.cmp(&b));
    }

    match (field, target) {
        (Value::Text(a), Value::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

/// Bounds of a `between` value
pub(crate) fn range_bounds(value: &Value) -> Option<(Value, Value)> {
    let parts: Vec<String> = match value {
        Value::List(items) => items.clone(),
        Value::Text(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
        _ => return None,
    };

    match parts.as_slice() {
        [low, high] if !low.is_empty() && !high.is_empty() => {
            Some((Value::Text(low.clone()), Value::Text(high.clone())))
        }
        _ => None,
    }
}

fn in_the_last(field: &Value, days: &Value, now: DateTime<Utc>) -> bool {
    let (Some(date), Some(days)) = (field.as_date(), days.as_number()) else {
        return false;
    };
    if days.is_nan() || days < 0.0 {
        return false;
    }

    // A window reaching past the earliest representable date covers every past date
    let start = Duration::try_seconds((days * 86_400.0) as i64)
        .and_then(|window| now.checked_sub_signed(window));
    match start {
        Some(start) => date >= start && date <= now,
        None => date <= now,
    }
}

/// Case-insensitive free-text search across several fields
///
/// A dotted field path falls back to its last segment, since rows are flat.
pub fn filter_by_text<T: Fields>(rows: Vec<T>, term: &str, fields: &[&str]) -> Vec<T> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            fields.iter().any(|field| {
                let mut value = row.field(field);
                if value.is_null() {
                    if let Some((_, leaf)) = field.rsplit_once('.') {
                        value = row.field(leaf);
                    }
                }
                value.to_string().to_lowercase().contains(&term)
            })
        })
        .collect()
}

/// Relative date windows offered by list views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRangePreset {
    #[default]
    All,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl DateRangePreset {
    pub fn days(&self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Some(Self::All),
            "last7days" => Some(Self::Last7Days),
            "last30days" => Some(Self::Last30Days),
            "last90days" => Some(Self::Last90Days),
            _ => None,
        }
    }
}

/// Keep rows whose date field falls inside the preset window
pub fn filter_by_date_range<T: Fields>(
    rows: Vec<T>,
    field: &str,
    preset: DateRangePreset,
    ctx: &EvalContext,
) -> Vec<T> {
    let Some(days) = preset.days() else {
        return rows;
    };

    let start = ctx.now - Duration::days(days);
    rows.into_iter()
        .filter(|row| {
            row.field(field)
                .as_date()
                .map(|d| d >= start && d <= ctx.now)
                .unwrap_or(false)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Stable sort by one field
///
/// `name` sorts by "first last" when the row has no `name` of its own.
/// Text compares case-insensitively; nulls sort last in either direction.
pub fn sort_by_field<T: Fields>(rows: &mut [T], field: &str, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let (ka, kb) = (sort_key(a, field), sort_key(b, field));
        match (ka.is_blank(), kb.is_blank()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = compare_for_sort(&ka, &kb);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        }
    });
}

fn sort_key<T: Fields>(row: &T, field: &str) -> Value {
    let value = row.field(field);
    if field == "name" && value.is_null() {
        let full = format!("{} {}", row.field("firstName"), row.field("lastName"));
        return Value::Text(full.trim().to_string());
    }
    value
}

fn compare_for_sort(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => compare_values(a, b)
            .filter(|_| a.as_date().is_some())
            .unwrap_or_else(|| a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase())),
    }
}
