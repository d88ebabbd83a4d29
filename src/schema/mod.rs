//! Entity catalog
//!
//! The report builder can query three entities. Each entity has a fixed
//! list of fields with a display label and a field type; the field type
//! decides which filter operators apply.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   fields   ┌──────────┐   type   ┌────────────────┐
//! │ EntityDef│──────────► │ FieldDef │────────► │ Operator table │
//! └──────────┘            └──────────┘          └────────────────┘
//! ```
//!
//! The catalog is static data; lookups never allocate.

use crate::report::Operator;
use serde::Serialize;

/// Type of a field, used for operator compatibility and value formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
    Relation,
    Array,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::Relation => "relation",
            FieldType::Array => "array",
            FieldType::Date => "date",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A field of an entity
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Allowed values for select fields
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
    /// Target entity for relation fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<&'static str>,
}

impl FieldDef {
    const fn new(id: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            id,
            label,
            field_type,
            options: &[],
            relates_to: None,
        }
    }

    const fn select(id: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            id,
            label,
            field_type: FieldType::Select,
            options,
            relates_to: None,
        }
    }

    const fn relation(id: &'static str, label: &'static str, target: &'static str) -> Self {
        Self {
            id,
            label,
            field_type: FieldType::Relation,
            options: &[],
            relates_to: Some(target),
        }
    }

    /// Operators that can filter this field
    pub fn operators(&self) -> Vec<Operator> {
        operators_for(self.field_type)
    }
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

/// A queryable entity
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntityDef {
    pub id: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldDef],
}

impl EntityDef {
    pub fn field(&self, id: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }
}

const PRIORITIES: &[&str] = &["Low", "Medium", "High"];

const CONTACT_FIELDS: &[FieldDef] = &[
    FieldDef::new("firstName", "First Name", FieldType::Text),
    FieldDef::new("lastName", "Last Name", FieldType::Text),
    FieldDef::new("email", "Email", FieldType::Text),
    FieldDef::new("phone", "Phone", FieldType::Text),
    FieldDef::new("company", "Company", FieldType::Text),
    FieldDef::new("title", "Job Title", FieldType::Text),
    FieldDef::select("status", "Status", &["Lead", "Customer", "Partner"]),
    FieldDef::new("tags", "Tags", FieldType::Array),
    FieldDef::new("createdAt", "Created Date", FieldType::Date),
    FieldDef::new("lastActivity", "Last Activity Date", FieldType::Date),
];

const DEAL_FIELDS: &[FieldDef] = &[
    FieldDef::new("name", "Deal Name", FieldType::Text),
    FieldDef::new("amount", "Amount", FieldType::Number),
    FieldDef::select(
        "stage",
        "Stage",
        &[
            "Prospect",
            "Qualification",
            "Proposal",
            "Negotiation",
            "Closed Won",
            "Closed Lost",
        ],
    ),
    FieldDef::select("priority", "Priority", PRIORITIES),
    FieldDef::new("probability", "Probability (%)", FieldType::Number),
    FieldDef::relation("contactId", "Contact", "contacts"),
    FieldDef::relation("companyId", "Company", "companies"),
    FieldDef::new("closeDate", "Expected Close Date", FieldType::Date),
    FieldDef::new("createdAt", "Created Date", FieldType::Date),
    FieldDef::new("lastUpdated", "Last Updated", FieldType::Date),
];

const TASK_FIELDS: &[FieldDef] = &[
    FieldDef::new("title", "Task Title", FieldType::Text),
    FieldDef::new("description", "Description", FieldType::Text),
    FieldDef::select(
        "status",
        "Status",
        &["Not Started", "In Progress", "Completed", "Deferred"],
    ),
    FieldDef::select("priority", "Priority", PRIORITIES),
    FieldDef::new("assignedTo", "Assigned To", FieldType::Text),
    FieldDef::new("relatedTo", "Related To", FieldType::Text),
    FieldDef::new("dueDate", "Due Date", FieldType::Date),
    FieldDef::new("completedAt", "Completed Date", FieldType::Date),
    FieldDef::new("createdAt", "Created Date", FieldType::Date),
];

const ENTITIES: &[EntityDef] = &[
    EntityDef {
        id: "contacts",
        label: "Contacts",
        fields: CONTACT_FIELDS,
    },
    EntityDef {
        id: "deals",
        label: "Deals",
        fields: DEAL_FIELDS,
    },
    EntityDef {
        id: "tasks",
        label: "Tasks",
        fields: TASK_FIELDS,
    },
];

/// All entities in catalog order
pub fn entities() -> &'static [EntityDef] {
    ENTITIES
}

pub fn entity(id: &str) -> Option<&'static EntityDef> {
    ENTITIES.iter().find(|e| e.id == id)
}

pub fn field(entity_id: &str, field_id: &str) -> Option<&'static FieldDef> {
    entity(entity_id).and_then(|e| e.field(field_id))
}

/// Display label for a field, falling back to the raw id
pub fn field_label<'a>(entity_id: &str, field_id: &'a str) -> &'a str {
    match field(entity_id, field_id) {
        Some(def) => def.label,
        None => field_id,
    }
}

/// Operators compatible with a field type, in menu order
pub fn operators_for(field_type: FieldType) -> Vec<Operator> {
    Operator::all()
        .iter()
        .copied()
        .filter(|op| op.applies_to(field_type))
        .collect()
}

/// First compatible operator, preselected when a filter field changes
pub fn default_operator(field_type: FieldType) -> Operator {
    Operator::all()
        .iter()
        .copied()
        .find(|op| op.applies_to(field_type))
        .unwrap_or(Operator::IsNotNull)
}
