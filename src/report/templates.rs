//! Built-in report templates
//!
//! Templates are ready-made definitions. Instantiating one yields an
//! unsaved copy named `"<template name> (Copy)"`.

use crate::report::ast::{ChartType, FilterClause, Operator, ReportDefinition};
use crate::report::error::{ReportError, ReportResult};
use crate::store::Value;
use chrono::{DateTime, Utc};

fn template(
    id: &str,
    name: &str,
    description: &str,
    chart_type: ChartType,
    entity: &str,
    fields: &[&str],
    filters: Vec<FilterClause>,
) -> ReportDefinition {
    let mut builder = ReportDefinition::builder(name)
        .description(description)
        .entity(entity)
        .fields(fields)
        .chart(chart_type);
    for clause in filters {
        builder = builder.filter(clause);
    }

    let mut definition = builder.build();
    definition.id = id.to_string();
    definition
}

/// All templates; `now` anchors the overdue-task cutoff
pub fn templates(now: DateTime<Utc>) -> Vec<ReportDefinition> {
    vec![
        template(
            "template-sales-pipeline",
            "Sales Pipeline Report",
            "Overview of all deals grouped by stage with total value",
            ChartType::Bar,
            "deals",
            &["stage", "amount"],
            vec![],
        ),
        template(
            "template-contact-status",
            "Contact Status Report",
            "Distribution of contacts by status (lead, customer, partner)",
            ChartType::Pie,
            "contacts",
            &["status"],
            vec![],
        ),
        template(
            "template-task-priority",
            "Task Priority Report",
            "Tasks grouped by priority level",
            ChartType::Bar,
            "tasks",
            &["priority", "status"],
            vec![FilterClause::new("status", Operator::NotEquals, "Completed")],
        ),
        template(
            "template-deals-month",
            "Monthly Deal Forecast",
            "Expected deal closures by month with probability-weighted value",
            ChartType::Line,
            "deals",
            &["closeDate", "amount", "probability"],
            vec![FilterClause::new("stage", Operator::NotEquals, "Closed Lost")],
        ),
        template(
            "template-task-overdue",
            "Overdue Tasks",
            "List of all tasks that are past their due date",
            ChartType::Table,
            "tasks",
            &["title", "dueDate", "priority", "assignedTo", "relatedTo"],
            vec![
                FilterClause::new("status", Operator::NotEquals, "Completed"),
                FilterClause::new("dueDate", Operator::LessThan, Value::date(now)),
            ],
        ),
        template(
            "template-active-contacts",
            "Recent Contact Activity",
            "Contacts with recent activity, sorted by last interaction date",
            ChartType::Table,
            "contacts",
            &["firstName", "lastName", "email", "company", "lastActivity", "status"],
            vec![FilterClause::new("lastActivity", Operator::InTheLast, "30")],
        ),
        template(
            "template-high-value-deals",
            "High Value Deals",
            "All deals with value above $10,000",
            ChartType::Table,
            "deals",
            &["name", "amount", "stage", "probability", "closeDate"],
            vec![FilterClause::new("amount", Operator::GreaterThan, "10000")],
        ),
        template(
            "template-won-deals",
            "Closed Won Deals",
            "Analysis of successfully closed deals",
            ChartType::Bar,
            "deals",
            &["closeDate", "amount"],
            vec![FilterClause::new("stage", Operator::Equals, "Closed Won")],
        ),
        template(
            "template-companies-contacts",
            "Companies with Contacts",
            "List of companies and their associated contacts",
            ChartType::Table,
            "contacts",
            &["company", "firstName", "lastName", "title", "email", "phone"],
            vec![],
        ),
    ]
}

pub fn find_template(id: &str, now: DateTime<Utc>) -> ReportResult<ReportDefinition> {
    templates(now)
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| ReportError::TemplateNotFound(id.to_string()))
}

/// Copy a template into a new, unsaved definition
pub fn instantiate(id: &str, now: DateTime<Utc>) -> ReportResult<ReportDefinition> {
    let template = find_template(id, now)?;

    Ok(ReportDefinition {
        id: String::new(),
        name: format!("{} (Copy)", template.name),
        created_at: None,
        modified_at: None,
        last_run: None,
        ..template
    })
}
