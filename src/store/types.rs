//! Core data types for the Prospect record store
//!
//! This module defines the fundamental types shared across the crate:
//! - `Value`: A loosely typed field value (text, number, list, ...)
//! - `Record`: A row of field values keyed by field id
//! - `Contact` and `ContactDraft`: The CRM contact and its editable form
//! - `ContactStatus`: Lead / Customer / Partner

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Validation messages keyed by field id
pub type FieldErrors = BTreeMap<String, String>;

/// A single field value
///
/// Serialized untagged, so a record round-trips as plain JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing or explicitly null
    #[default]
    Null,
    /// Boolean flag
    Bool(bool),
    /// Any numeric value
    Number(f64),
    /// Free text, select options and ISO dates
    Text(String),
    /// Multi-valued text such as tags
    List(Vec<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null or an empty string
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view: numbers as-is, text when it parses as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Date view: text in RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD` form
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Render a timestamp the way records store dates
    pub fn date(dt: DateTime<Utc>) -> Self {
        Value::Text(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Parse the date formats records carry
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Anything that exposes named field values to the filter evaluator
pub trait Fields {
    /// Value of a field, `Value::Null` when absent
    fn field(&self, id: &str) -> Value;
}

/// A row of field values keyed by field id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Borrow a field value; absent fields read as null
    pub fn get(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(key).unwrap_or(&NULL)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl Fields for Record {
    fn field(&self, id: &str) -> Value {
        self.get(id).clone()
    }
}

/// Relationship stage of a contact
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactStatus {
    #[default]
    Lead,
    Customer,
    Partner,
}

impl ContactStatus {
    /// Get all statuses for iteration
    pub fn all() -> &'static [ContactStatus] {
        &[
            ContactStatus::Lead,
            ContactStatus::Customer,
            ContactStatus::Partner,
        ]
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lead" => Some(Self::Lead),
            "customer" => Some(Self::Customer),
            "partner" => Some(Self::Partner),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactStatus::Lead => write!(f, "Lead"),
            ContactStatus::Customer => write!(f, "Customer"),
            ContactStatus::Partner => write!(f, "Partner"),
        }
    }
}

/// The editable part of a contact, as submitted by a form or an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub title: String,
    pub status: ContactStatus,
    pub tags: Vec<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ContactDraft {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    /// Builder method: set status
    pub fn status(mut self, status: ContactStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method: set phone
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Builder method: set job title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder method: add a tag (duplicates are ignored)
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        push_unique(&mut self.tags, tag.into());
        self
    }

    /// Trim whitespace from every text field and drop blank or repeated tags
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.company = self.company.trim().to_string();
        self.title = self.title.trim().to_string();

        let mut tags = Vec::with_capacity(self.tags.len());
        for tag in self.tags.drain(..) {
            push_unique(&mut tags, tag.trim().to_string());
        }
        self.tags = tags;
        self
    }
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}

/// A stored CRM contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

impl Contact {
    /// Create a contact from a draft with a fresh id
    pub fn from_draft(draft: ContactDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            title: draft.title,
            status: draft.status,
            tags: draft.tags,
            created_at: now,
            modified_at: None,
            last_activity: draft.last_activity,
        }
    }

    /// Overwrite the editable fields, keeping id and creation time
    pub fn apply(&mut self, draft: ContactDraft, now: DateTime<Utc>) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.email = draft.email;
        self.phone = draft.phone;
        self.company = draft.company;
        self.title = draft.title;
        self.status = draft.status;
        self.tags = draft.tags;
        if draft.last_activity.is_some() {
            self.last_activity = draft.last_activity;
        }
        self.modified_at = Some(now);
    }

    /// Display name ("first last")
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Add a tag; returns false when it was already present
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag; returns false when it was not present
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// The editable fields as a draft (for updates that touch one field)
    pub fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            title: self.title.clone(),
            status: self.status,
            tags: self.tags.clone(),
            last_activity: self.last_activity,
        }
    }

    /// Flatten into a report row
    pub fn to_record(&self) -> Record {
        [
            "id",
            "firstName",
            "lastName",
            "name",
            "email",
            "phone",
            "company",
            "title",
            "status",
            "tags",
            "createdAt",
            "modifiedAt",
            "lastActivity",
        ]
        .iter()
        .fold(Record::new(), |record, key| record.with(*key, self.field(key)))
    }
}

impl Fields for Contact {
    fn field(&self, id: &str) -> Value {
        match id {
            "id" => Value::from(self.id.as_str()),
            "firstName" => Value::from(self.first_name.as_str()),
            "lastName" => Value::from(self.last_name.as_str()),
            "name" => Value::from(self.full_name()),
            "email" => Value::from(self.email.as_str()),
            "phone" => Value::from(self.phone.as_str()),
            "company" => Value::from(self.company.as_str()),
            "title" => Value::from(self.title.as_str()),
            "status" => Value::from(self.status.to_string()),
            "tags" => Value::List(self.tags.clone()),
            "createdAt" => Value::date(self.created_at),
            "modifiedAt" => self.modified_at.map(Value::date).unwrap_or_default(),
            "lastActivity" => self.last_activity.map(Value::date).unwrap_or_default(),
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_contact() -> Contact {
        let created = Utc.with_ymd_and_hms(2023, 1, 15, 10, 30, 0).unwrap();
        Contact::from_draft(
            ContactDraft::new("John", "Smith", "john@example.com", "Acme Inc.")
                .status(ContactStatus::Customer)
                .tag("VIP"),
            created,
        )
    }

    #[test]
    fn test_value_untagged_json() {
        let record: Record = serde_json::from_str(
            r#"{"name": "Deal", "amount": 15000, "tags": ["a", "b"], "completedAt": null}"#,
        )
        .unwrap();

        assert_eq!(record.get("name"), &Value::Text("Deal".to_string()));
        assert_eq!(record.get("amount"), &Value::Number(15000.0));
        assert_eq!(
            record.get("tags"),
            &Value::List(vec!["a".to_string(), "b".to_string()])
        );
        assert!(record.get("completedAt").is_null());
        assert!(record.get("missing").is_null());
    }

    #[test]
    fn test_value_number_view() {
        assert_eq!(Value::from("10000").as_number(), Some(10000.0));
        assert_eq!(Value::from(70.0).as_number(), Some(70.0));
        assert_eq!(Value::from("Acme").as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let full = parse_date("2023-09-10T14:25:00Z").unwrap();
        assert_eq!(full, Utc.with_ymd_and_hms(2023, 9, 10, 14, 25, 0).unwrap());

        let naive = parse_date("2023-09-10T14:25:00").unwrap();
        assert_eq!(naive, full);

        let day = parse_date("2023-09-10").unwrap();
        assert_eq!(day, Utc.with_ymd_and_hms(2023, 9, 10, 0, 0, 0).unwrap());

        assert!(parse_date("next tuesday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(15000.0).to_string(), "15000");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(
            Value::List(vec!["VIP".into(), "Technical".into()]).to_string(),
            "VIP, Technical"
        );
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_contact_status_parse() {
        assert_eq!(ContactStatus::parse("customer"), Some(ContactStatus::Customer));
        assert_eq!(ContactStatus::parse(" Partner "), Some(ContactStatus::Partner));
        assert_eq!(ContactStatus::parse("prospect"), None);
        assert_eq!(ContactStatus::default(), ContactStatus::Lead);
    }

    #[test]
    fn test_draft_normalized() {
        let draft = ContactDraft {
            first_name: "  Emily ".into(),
            tags: vec!["New".into(), " New".into(), "".into(), "Marketing".into()],
            ..Default::default()
        }
        .normalized();

        assert_eq!(draft.first_name, "Emily");
        assert_eq!(draft.tags, vec!["New".to_string(), "Marketing".to_string()]);
    }

    #[test]
    fn test_contact_tags() {
        let mut contact = sample_contact();
        assert!(!contact.add_tag("VIP"));
        assert!(contact.add_tag("Technical"));
        assert_eq!(contact.tags.len(), 2);

        assert!(contact.remove_tag("VIP"));
        assert!(!contact.remove_tag("VIP"));
        assert_eq!(contact.tags, vec!["Technical".to_string()]);
    }

    #[test]
    fn test_contact_record() {
        let contact = sample_contact();
        let record = contact.to_record();

        assert_eq!(record.get("name"), &Value::from("John Smith"));
        assert_eq!(record.get("status"), &Value::from("Customer"));
        assert_eq!(record.get("createdAt"), &Value::from("2023-01-15T10:30:00Z"));
        assert!(record.get("lastActivity").is_null());
        assert_eq!(record.get("tags"), &Value::List(vec!["VIP".to_string()]));
    }

    #[test]
    fn test_contact_apply_keeps_identity() {
        let mut contact = sample_contact();
        let id = contact.id.clone();
        let created = contact.created_at;
        let now = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap();

        contact.apply(
            ContactDraft::new("Johnny", "Smith", "johnny@example.com", "Acme Inc."),
            now,
        );

        assert_eq!(contact.id, id);
        assert_eq!(contact.created_at, created);
        assert_eq!(contact.first_name, "Johnny");
        assert_eq!(contact.modified_at, Some(now));
    }
}
