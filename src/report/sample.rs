//! Built-in sample rows
//!
//! Deals and tasks have no store of their own, so reports over them run
//! against these rows. Contacts fall back to the sample set when the
//! contact store is empty.

use crate::store::{Record, Value};

fn list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| s.to_string()).collect())
}

#[allow(clippy::too_many_arguments)]
fn contact(
    id: &str,
    first: &str,
    last: &str,
    email: &str,
    phone: &str,
    company: &str,
    title: &str,
    status: &str,
    tags: &[&str],
    created_at: &str,
    last_activity: &str,
) -> Record {
    Record::new()
        .with("id", id)
        .with("firstName", first)
        .with("lastName", last)
        .with("name", format!("{} {}", first, last))
        .with("email", email)
        .with("phone", phone)
        .with("company", company)
        .with("title", title)
        .with("status", status)
        .with("tags", list(tags))
        .with("createdAt", created_at)
        .with("lastActivity", last_activity)
}

pub fn sample_contacts() -> Vec<Record> {
    vec![
        contact("1", "John", "Smith", "john@example.com", "(555) 123-4567", "Acme Inc.", "CEO", "Customer", &["VIP"], "2023-01-15T10:30:00Z", "2023-09-10T14:25:00Z"),
        contact("2", "Emily", "Johnson", "emily@example.com", "(555) 987-6543", "XYZ Corp", "Marketing Director", "Lead", &["Marketing", "New"], "2023-03-22T09:15:00Z", "2023-09-05T11:30:00Z"),
        contact("3", "Michael", "Brown", "michael@example.com", "(555) 456-7890", "Global Ltd", "Sales Manager", "Partner", &["Sales"], "2023-02-10T15:45:00Z", "2023-09-12T16:20:00Z"),
        contact("4", "Sarah", "Davis", "sarah@example.com", "(555) 234-5678", "Tech Solutions", "CTO", "Customer", &["VIP", "Technical"], "2023-04-05T11:00:00Z", "2023-09-08T09:15:00Z"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn deal(
    id: &str,
    name: &str,
    amount: f64,
    stage: &str,
    priority: &str,
    probability: f64,
    close_date: &str,
    created_at: &str,
    last_updated: &str,
) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("amount", amount)
        .with("stage", stage)
        .with("priority", priority)
        .with("probability", probability)
        .with("contactId", id)
        .with("companyId", id)
        .with("closeDate", close_date)
        .with("createdAt", created_at)
        .with("lastUpdated", last_updated)
}

pub fn sample_deals() -> Vec<Record> {
    vec![
        deal("1", "Enterprise Software License", 15000.0, "Proposal", "High", 70.0, "2023-10-15T00:00:00Z", "2023-06-10T08:30:00Z", "2023-09-05T14:20:00Z"),
        deal("2", "Consulting Services Package", 8500.0, "Negotiation", "Medium", 60.0, "2023-09-30T00:00:00Z", "2023-05-22T10:15:00Z", "2023-09-10T11:45:00Z"),
        deal("3", "Hardware Upgrade", 12000.0, "Qualification", "Medium", 40.0, "2023-11-15T00:00:00Z", "2023-07-05T09:00:00Z", "2023-09-01T16:30:00Z"),
        deal("4", "Annual Maintenance Contract", 5000.0, "Closed Won", "Low", 100.0, "2023-08-30T00:00:00Z", "2023-04-15T14:20:00Z", "2023-08-30T10:00:00Z"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: &str,
    title: &str,
    description: &str,
    status: &str,
    priority: &str,
    assigned_to: &str,
    related_to: &str,
    due_date: &str,
    completed_at: Option<&str>,
    created_at: &str,
) -> Record {
    Record::new()
        .with("id", id)
        .with("title", title)
        .with("description", description)
        .with("status", status)
        .with("priority", priority)
        .with("assignedTo", assigned_to)
        .with("relatedTo", related_to)
        .with("dueDate", due_date)
        .with("completedAt", completed_at)
        .with("createdAt", created_at)
}

pub fn sample_tasks() -> Vec<Record> {
    vec![
        task("1", "Follow up with client", "Call to discuss proposal details", "Not Started", "High", "John Doe", "Deal #1", "2023-09-20T00:00:00Z", None, "2023-09-10T09:00:00Z"),
        task("2", "Prepare presentation", "Create slides for client meeting", "In Progress", "Medium", "Emily Johnson", "Deal #2", "2023-09-18T00:00:00Z", None, "2023-09-05T11:30:00Z"),
        task("3", "Send invoice", "Generate and email invoice to client", "Completed", "Medium", "Sarah Davis", "Deal #4", "2023-09-10T00:00:00Z", Some("2023-09-09T15:00:00Z"), "2023-09-01T10:15:00Z"),
        task("4", "Schedule demo", "Set up product demonstration", "Not Started", "High", "Michael Brown", "Deal #3", "2023-09-25T00:00:00Z", None, "2023-09-12T14:00:00Z"),
    ]
}

/// Sample rows for an entity; unknown entities have none
pub fn sample_rows(entity: &str) -> Vec<Record> {
    match entity {
        "contacts" => sample_contacts(),
        "deals" => sample_deals(),
        "tasks" => sample_tasks(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_sample_rows_cover_schema() {
        for entity in schema::entities() {
            let rows = sample_rows(entity.id);
            assert_eq!(rows.len(), 4, "{} rows", entity.id);
            for field in entity.fields {
                assert!(
                    rows[0].keys().any(|k| k == field.id),
                    "{} missing {}",
                    entity.id,
                    field.id
                );
            }
        }
        assert!(sample_rows("companies").is_empty());
    }

    #[test]
    fn test_task_completed_at_nulls() {
        let tasks = sample_tasks();
        assert!(tasks[0].get("completedAt").is_null());
        assert_eq!(tasks[2].get("completedAt"), &Value::from("2023-09-09T15:00:00Z"));
    }
}
