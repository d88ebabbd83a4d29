//! Report definition types
//!
//! A report names an entity, an ordered list of fields, a list of filter
//! clauses and a chart type. Filter clauses combine with AND.
//!
//! # Example
//!
//! ```text
//! entity:   deals
//! fields:   stage, amount
//! filters:  stage notEquals 'Closed Lost'
//!           amount greaterThan 10000
//! chart:    bar
//! ```

use crate::report::error::{ReportError, ReportResult};
use crate::report::evaluator;
use crate::schema::{self, EntityDef, FieldType};
use crate::store::{FieldErrors, Keyed, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    /// Inclusive range, value is `[low, high]` or `"low,high"`
    Between,
    /// Date within the last N days
    InTheLast,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Every operator in menu order
    pub fn all() -> &'static [Operator] {
        &[
            Self::Equals,
            Self::NotEquals,
            Self::Contains,
            Self::NotContains,
            Self::GreaterThan,
            Self::LessThan,
            Self::Between,
            Self::InTheLast,
            Self::IsNull,
            Self::IsNotNull,
        ]
    }

    /// Wire id, as stored in saved reports
    pub fn id(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::GreaterThan => "greaterThan",
            Self::LessThan => "lessThan",
            Self::Between => "between",
            Self::InTheLast => "inTheLast",
            Self::IsNull => "isNull",
            Self::IsNotNull => "isNotNull",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::NotEquals => "Does Not Equal",
            Self::Contains => "Contains",
            Self::NotContains => "Does Not Contain",
            Self::GreaterThan => "Greater Than",
            Self::LessThan => "Less Than",
            Self::Between => "Between",
            Self::InTheLast => "In the Last",
            Self::IsNull => "Is Empty",
            Self::IsNotNull => "Is Not Empty",
        }
    }

    /// Whether the operator can filter a field of this type
    pub fn applies_to(&self, field_type: FieldType) -> bool {
        use FieldType::*;
        match self {
            Self::Equals | Self::NotEquals => {
                matches!(field_type, Text | Number | Select | Relation)
            }
            Self::Contains | Self::NotContains => matches!(field_type, Text | Array),
            Self::GreaterThan | Self::LessThan | Self::Between => {
                matches!(field_type, Number | Date)
            }
            Self::InTheLast => field_type == Date,
            Self::IsNull | Self::IsNotNull => true,
        }
    }

    /// Null tests ignore the clause value
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Parse from a wire id or a comparison symbol
    pub fn from_str(s: &str) -> Option<Self> {
        let op = match s.trim() {
            "=" | "==" => Self::Equals,
            "!=" | "<>" => Self::NotEquals,
            ">" => Self::GreaterThan,
            "<" => Self::LessThan,
            other => {
                let lower = other.to_lowercase();
                return Self::all()
                    .iter()
                    .copied()
                    .find(|op| op.id().to_lowercase() == lower);
            }
        };
        Some(op)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// One filter condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    /// Client-side handle for editing a clause in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            id: None,
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Clause for an operator that takes no value
    pub fn unary(field: impl Into<String>, operator: Operator) -> Self {
        Self::new(field, operator, Value::Null)
    }

    /// Check the clause against an entity's schema
    pub fn check(&self, entity: &EntityDef) -> ReportResult<()> {
        let def = entity
            .field(&self.field)
            .ok_or_else(|| ReportError::UnknownField {
                entity: entity.id.to_string(),
                field: self.field.clone(),
            })?;

        if !self.operator.applies_to(def.field_type) {
            return Err(ReportError::IncompatibleOperator {
                field: self.field.clone(),
                operator: self.operator.id().to_string(),
                field_type: def.field_type.to_string(),
            });
        }

        let invalid = |reason: &str| ReportError::InvalidFilterValue {
            field: self.field.clone(),
            reason: reason.to_string(),
        };

        match self.operator {
            Operator::Between if evaluator::range_bounds(&self.value).is_none() => {
                Err(invalid("between needs two values, e.g. \"5000,15000\""))
            }
            Operator::InTheLast => match self.value.as_number() {
                Some(days) if days.is_finite() && days >= 0.0 && days <= evaluator::MAX_DAYS_BACK => {
                    Ok(())
                }
                Some(days) if days.is_finite() && days > evaluator::MAX_DAYS_BACK => Err(invalid(
                    &format!("at most {} days", evaluator::MAX_DAYS_BACK),
                )),
                _ => Err(invalid("expected a number of days")),
            },
            Operator::GreaterThan | Operator::LessThan
                if def.field_type == FieldType::Number && self.value.as_number().is_none() =>
            {
                Err(invalid("expected a number"))
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for FilterClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.operator.takes_value() {
            write!(f, "{} {} {}", self.field, self.operator, self.value)
        } else {
            write!(f, "{} {}", self.field, self.operator)
        }
    }
}

/// How a report is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Table,
    Bar,
    Line,
    Pie,
    Area,
}

impl ChartType {
    pub fn all() -> &'static [ChartType] {
        &[Self::Table, Self::Bar, Self::Line, Self::Pie, Self::Area]
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Table => ReportKind::Table,
            _ => ReportKind::Chart,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Bar => "Bar Chart",
            Self::Line => "Line Chart",
            Self::Pie => "Pie Chart",
            Self::Area => "Area Chart",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "bar" => Some(Self::Bar),
            "line" => Some(Self::Line),
            "pie" => Some(Self::Pie),
            "area" => Some(Self::Area),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Bar => write!(f, "bar"),
            Self::Line => write!(f, "line"),
            Self::Pie => write!(f, "pie"),
            Self::Area => write!(f, "area"),
        }
    }
}

/// Table or chart, always derived from the chart type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Table,
    Chart,
}

/// A report definition, saved or ad hoc
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    /// Empty until the report is saved
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ReportKind,
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterClause>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
}

impl ReportDefinition {
    /// Start building a definition
    pub fn builder(name: impl Into<String>) -> ReportBuilder {
        ReportBuilder::new(name)
    }

    /// Re-derive `kind` from `chart_type` and tidy whitespace
    pub fn normalize(&mut self) {
        self.kind = self.chart_type.kind();
        self.name = self.name.trim().to_string();
        self.entity = self.entity.trim().to_string();
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Full validation, as required before saving
    pub fn validate(&self) -> ReportResult<&'static EntityDef> {
        self.check(true)
    }

    /// Validation for an unsaved preview (no name needed)
    pub fn validate_preview(&self) -> ReportResult<&'static EntityDef> {
        self.check(false)
    }

    fn check(&self, require_name: bool) -> ReportResult<&'static EntityDef> {
        let mut errors = FieldErrors::new();

        if require_name && self.name.trim().is_empty() {
            errors.insert("name".to_string(), "Report name is required".to_string());
        }
        if self.entity.trim().is_empty() {
            errors.insert("entity".to_string(), "Please select an entity".to_string());
        }
        if self.fields.is_empty() {
            errors.insert("fields".to_string(), "Select at least one field".to_string());
        }
        if !errors.is_empty() {
            return Err(ReportError::Invalid(errors));
        }

        let entity = schema::entity(self.entity.trim())
            .ok_or_else(|| ReportError::UnknownEntity(self.entity.clone()))?;

        for field in &self.fields {
            if entity.field(field).is_none() {
                return Err(ReportError::UnknownField {
                    entity: entity.id.to_string(),
                    field: field.clone(),
                });
            }
        }

        for clause in &self.filters {
            clause.check(entity)?;
        }

        Ok(entity)
    }

    /// Display labels of the selected fields
    pub fn field_labels(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| schema::field_label(&self.entity, f).to_string())
            .collect()
    }
}

impl Keyed for ReportDefinition {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Builder for constructing report definitions programmatically
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    definition: ReportDefinition,
}

impl ReportBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            definition: ReportDefinition {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.definition.description = description.into();
        self
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.definition.entity = entity.into();
        self
    }

    /// Set the selected fields, in display order
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.definition.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn chart(mut self, chart_type: ChartType) -> Self {
        self.definition.chart_type = chart_type;
        self
    }

    /// Add a filter clause (AND-combined with the others)
    pub fn filter(mut self, clause: FilterClause) -> Self {
        self.definition.filters.push(clause);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.definition.tags.push(tag.into());
        self
    }

    /// Build the definition
    pub fn build(self) -> ReportDefinition {
        self.definition.normalized()
    }
}
