//! Visualization shaping
//!
//! Turns a filtered row set into either a table or a chart-ready structure.
//!
//! ```text
//! rows + fields ──► table             columns = fields, cells formatted
//!               └─► chart, 1 field    count per formatted value ("Count")
//!               └─► chart, 2+ fields  first field as category, second as value
//! ```
//!
//! Only counting is supported; there is one series per chart.

use crate::report::ast::ChartType;
use crate::schema;
use crate::store::{Fields, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message shown when there is nothing to draw
pub const NO_DATA: &str = "No data available";

/// Chart colors, applied in order
pub const PALETTE: &[&str] = &[
    "#3b82f6", "#8b5cf6", "#f59e0b", "#10b981", "#ef4444", "#06b6d4",
];

/// Rendered output of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Visualization {
    Empty { message: String },
    Table(TableView),
    Chart(ChartView),
}

impl Visualization {
    pub fn empty() -> Self {
        Visualization::Empty {
            message: NO_DATA.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Visualization::Empty { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    pub data: Vec<f64>,
}

/// Pie charts take a flat list of values; the other charts take named series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartSeries {
    Flat(Vec<f64>),
    Named(Vec<NamedSeries>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub chart_type: ChartType,
    pub title: String,
    pub categories: Vec<String>,
    pub series: ChartSeries,
    /// Slice labels, pie only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub colors: Vec<String>,
}

/// Shape rows for display
pub fn shape<T: Fields>(
    rows: &[T],
    fields: &[String],
    entity: &str,
    chart_type: ChartType,
) -> Visualization {
    if rows.is_empty() || fields.is_empty() {
        return Visualization::empty();
    }

    match (chart_type, fields) {
        (ChartType::Table, _) => Visualization::Table(table(rows, fields, entity)),
        (_, [only]) => Visualization::Chart(count_chart(rows, only, entity, chart_type)),
        (_, [first, second, ..]) => {
            Visualization::Chart(value_chart(rows, first, second, entity, chart_type))
        }
        (_, []) => Visualization::empty(),
    }
}

/// Column labels and formatted cells
pub fn table<T: Fields>(rows: &[T], fields: &[String], entity: &str) -> TableView {
    let columns = fields
        .iter()
        .map(|f| Column {
            id: f.clone(),
            label: schema::field_label(entity, f).to_string(),
        })
        .collect();

    let rows = rows
        .iter()
        .map(|row| fields.iter().map(|f| format_value(&row.field(f), f)).collect())
        .collect();

    TableView { columns, rows }
}

fn count_chart<T: Fields>(rows: &[T], field: &str, entity: &str, chart_type: ChartType) -> ChartView {
    // First-seen order of categories
    let mut categories: Vec<String> = Vec::new();
    let mut counts: Vec<f64> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = format_value(&row.field(field), field);
        match index.get(&key) {
            Some(&i) => counts[i] += 1.0,
            None => {
                index.insert(key.clone(), categories.len());
                categories.push(key);
                counts.push(1.0);
            }
        }
    }

    let (series, labels) = if chart_type == ChartType::Pie {
        (ChartSeries::Flat(counts), Some(categories.clone()))
    } else {
        (
            ChartSeries::Named(vec![NamedSeries {
                name: "Count".to_string(),
                data: counts,
            }]),
            None,
        )
    };

    ChartView {
        chart_type,
        title: format!("{} Distribution", schema::field_label(entity, field)),
        categories,
        series,
        labels,
        colors: palette(),
    }
}

fn value_chart<T: Fields>(
    rows: &[T],
    category: &str,
    measure: &str,
    entity: &str,
    chart_type: ChartType,
) -> ChartView {
    let categories = rows
        .iter()
        .map(|row| format_value(&row.field(category), category))
        .collect();

    // Non-numeric measures plot as 1 so every row still shows up
    let data = rows
        .iter()
        .map(|row| match row.field(measure) {
            Value::Number(n) => n,
            _ => 1.0,
        })
        .collect();

    let category_label = schema::field_label(entity, category);
    let measure_label = schema::field_label(entity, measure);

    ChartView {
        chart_type,
        title: format!("{} vs {}", category_label, measure_label),
        categories,
        series: ChartSeries::Named(vec![NamedSeries {
            name: measure_label.to_string(),
            data,
        }]),
        labels: None,
        colors: palette(),
    }
}

fn palette() -> Vec<String> {
    PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Display form of a cell
///
/// Null renders as `-`; text in a date-named field renders as
/// `YYYY-MM-DD HH:MM` (UTC) when it parses; lists join with `, `.
pub fn format_value(value: &Value, field_id: &str) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Text(s) if is_date_field(field_id) => match value.as_date() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => s.clone(),
        },
        other => other.to_string(),
    }
}

fn is_date_field(field_id: &str) -> bool {
    field_id.contains("date") || field_id.contains("Date")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;

    fn fields(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn contacts() -> Vec<Record> {
        vec![
            Record::new().with("status", "Customer").with("firstName", "John"),
            Record::new().with("status", "Lead").with("firstName", "Emily"),
            Record::new().with("status", "Customer").with("firstName", "Sarah"),
            Record::new().with("firstName", "Nobody"),
        ]
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<Record> = Vec::new();
        assert_eq!(
            shape(&rows, &fields(&["status"]), "contacts", ChartType::Bar),
            Visualization::empty()
        );
        assert!(shape(&contacts(), &[], "contacts", ChartType::Table).is_empty());
    }

    #[test]
    fn test_single_field_counts() {
        let viz = shape(&contacts(), &fields(&["status"]), "contacts", ChartType::Bar);
        let Visualization::Chart(chart) = viz else {
            panic!("expected chart");
        };

        assert_eq!(chart.title, "Status Distribution");
        assert_eq!(chart.categories, vec!["Customer", "Lead", "-"]);
        assert_eq!(
            chart.series,
            ChartSeries::Named(vec![NamedSeries {
                name: "Count".to_string(),
                data: vec![2.0, 1.0, 1.0],
            }])
        );
        assert!(chart.labels.is_none());
        assert_eq!(chart.colors.len(), PALETTE.len());
    }

    #[test]
    fn test_count_chart_many_categories() {
        let rows: Vec<Record> = (0..1000)
            .map(|i| Record::new().with("company", format!("Company {}", (i * 7) % 250)))
            .collect();

        let Visualization::Chart(chart) = shape(&rows, &fields(&["company"]), "contacts", ChartType::Bar) else {
            panic!("expected chart");
        };

        assert_eq!(chart.categories.len(), 250);
        assert_eq!(chart.categories[0], "Company 0");
        assert_eq!(chart.categories[1], "Company 7");
        let ChartSeries::Named(series) = chart.series else {
            panic!("expected named series");
        };
        assert!(series[0].data.iter().all(|c| *c == 4.0));
    }

    #[test]
    fn test_pie_uses_flat_series_and_labels() {
        let viz = shape(&contacts(), &fields(&["status"]), "contacts", ChartType::Pie);
        let Visualization::Chart(chart) = viz else {
            panic!("expected chart");
        };

        assert_eq!(chart.series, ChartSeries::Flat(vec![2.0, 1.0, 1.0]));
        assert_eq!(chart.labels, Some(vec!["Customer".into(), "Lead".into(), "-".into()]));
    }

    #[test]
    fn test_two_field_chart() {
        let rows = vec![
            Record::new().with("stage", "Proposal").with("amount", 15000.0),
            Record::new().with("stage", "Negotiation").with("amount", "8500"),
            Record::new().with("stage", "Proposal"),
        ];

        let viz = shape(&rows, &fields(&["stage", "amount", "priority"]), "deals", ChartType::Line);
        let Visualization::Chart(chart) = viz else {
            panic!("expected chart");
        };

        assert_eq!(chart.title, "Stage vs Amount");
        assert_eq!(chart.categories, vec!["Proposal", "Negotiation", "Proposal"]);
        assert_eq!(
            chart.series,
            ChartSeries::Named(vec![NamedSeries {
                name: "Amount".to_string(),
                data: vec![15000.0, 1.0, 1.0],
            }])
        );
    }

    #[test]
    fn test_table_formatting() {
        let rows = vec![Record::new()
            .with("title", "Send invoice")
            .with("dueDate", "2023-09-10T00:00:00Z")
            .with("completedAt", Value::Null)
            .with("tags", vec!["a".to_string(), "b".to_string()])];

        let viz = shape(
            &rows,
            &fields(&["title", "dueDate", "completedAt", "tags"]),
            "tasks",
            ChartType::Table,
        );
        let Visualization::Table(table) = viz else {
            panic!("expected table");
        };

        assert_eq!(table.columns[0].label, "Task Title");
        assert_eq!(table.columns[3].label, "tags");
        assert_eq!(
            table.rows[0],
            vec!["Send invoice", "2023-09-10 00:00", "-", "a, b"]
        );
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Number(70.0), "probability"), "70");
        assert_eq!(format_value(&Value::from("soon"), "closeDate"), "soon");
        // completedAt has no "date" in its id
        assert_eq!(
            format_value(&Value::from("2023-09-09T15:00:00Z"), "completedAt"),
            "2023-09-09T15:00:00Z"
        );
        assert_eq!(format_value(&Value::from(""), "name"), "");
    }

    #[test]
    fn test_visualization_json_shape() {
        let viz = shape(&contacts(), &fields(&["status"]), "contacts", ChartType::Pie);
        let json = serde_json::to_value(&viz).unwrap();
        assert_eq!(json["kind"], "chart");
        assert_eq!(json["chartType"], "pie");
        assert_eq!(json["series"][0], 2.0);
        assert_eq!(json["labels"][0], "Customer");

        let json = serde_json::to_value(Visualization::empty()).unwrap();
        assert_eq!(json["kind"], "empty");
        assert_eq!(json["message"], NO_DATA);
    }
}
