//! Contact management
//!
//! Validated CRUD over the contact collection, list queries with search,
//! filters and sorting, tag edits and bulk CSV import.

use crate::contacts::csv_import::{parse_contacts_csv, RowError};
use crate::contacts::error::{ContactError, ContactResult};
use crate::contacts::validation::validate_contact;
use crate::report::evaluator::{
    apply_filters, filter_by_date_range, filter_by_text, sort_by_field, DateRangePreset,
    EvalContext, SortDirection,
};
use crate::report::parse_filter_expression;
use crate::store::{Contact, ContactDraft, ContactStatus, Store, StoreError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Fields covered by the free-text search
pub const SEARCH_FIELDS: &[&str] = &["firstName", "lastName", "email", "phone", "company", "title"];

/// Options for listing contacts
///
/// `status` and `company` accept `all` (or nothing) to disable the filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub company: Option<String>,
    pub date_range: Option<String>,
    /// Sort field, `lastName` when unset; `name` sorts by full name
    pub sort: Option<String>,
    pub direction: Option<String>,
    /// Filter expression, e.g. `tags contains 'VIP'`
    pub filter: Option<String>,
}

impl ContactQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: ContactStatus) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn date_range(mut self, preset: &str) -> Self {
        self.date_range = Some(preset.to_string());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(field.into());
        self.direction = Some(match direction {
            SortDirection::Asc => "asc".to_string(),
            SortDirection::Desc => "desc".to_string(),
        });
        self
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter = Some(expression.into());
        self
    }
}

fn active(option: &Option<String>) -> Option<&str> {
    option
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Outcome of a CSV import
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

/// Contact operations
#[derive(Debug, Clone)]
pub struct ContactService {
    store: Arc<Store>,
}

impl ContactService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn check(draft: ContactDraft) -> ContactResult<ContactDraft> {
        let draft = draft.normalized();
        let errors = validate_contact(&draft);
        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(ContactError::Invalid(errors))
        }
    }

    fn not_found(id: &str, err: StoreError) -> ContactError {
        match err {
            StoreError::NotFound(_) => ContactError::NotFound(id.to_string()),
            other => ContactError::Store(other),
        }
    }

    /// Validate and store a new contact
    pub async fn create(&self, draft: ContactDraft) -> ContactResult<Contact> {
        let draft = Self::check(draft)?;
        let contact = self
            .store
            .contacts()
            .insert(Contact::from_draft(draft, Utc::now()))
            .await?;

        tracing::info!("Created contact {} ({})", contact.id, contact.full_name());
        Ok(contact)
    }

    pub async fn get(&self, id: &str) -> ContactResult<Contact> {
        self.store
            .contacts()
            .get(id)
            .await
            .ok_or_else(|| ContactError::NotFound(id.to_string()))
    }

    /// Validate and overwrite a contact's editable fields
    pub async fn update(&self, id: &str, draft: ContactDraft) -> ContactResult<Contact> {
        let draft = Self::check(draft)?;
        let now = Utc::now();

        let contact = self
            .store
            .contacts()
            .update(id, |c| c.apply(draft, now))
            .await
            .map_err(|e| Self::not_found(id, e))?;

        tracing::info!("Updated contact {}", id);
        Ok(contact)
    }

    pub async fn delete(&self, id: &str) -> ContactResult<Contact> {
        let removed = self
            .store
            .contacts()
            .remove(id)
            .await
            .map_err(|e| Self::not_found(id, e))?;

        tracing::info!("Deleted contact {}", id);
        Ok(removed)
    }

    /// List contacts matching a query
    pub async fn list(&self, query: &ContactQuery) -> ContactResult<Vec<Contact>> {
        self.list_at(query, &EvalContext::default()).await
    }

    pub async fn list_at(
        &self,
        query: &ContactQuery,
        ctx: &EvalContext,
    ) -> ContactResult<Vec<Contact>> {
        let status = match active(&query.status) {
            Some(s) => Some(
                ContactStatus::parse(s)
                    .ok_or_else(|| ContactError::Query(format!("unknown status '{}'", s)))?,
            ),
            None => None,
        };

        let preset = match query.date_range.as_deref() {
            Some(s) => DateRangePreset::from_str(s)
                .ok_or_else(|| ContactError::Query(format!("unknown date range '{}'", s)))?,
            None => DateRangePreset::All,
        };

        let direction = match query.direction.as_deref() {
            Some(s) => SortDirection::from_str(s)
                .ok_or_else(|| ContactError::Query(format!("unknown sort direction '{}'", s)))?,
            None => SortDirection::Asc,
        };

        let clauses = match query.filter.as_deref() {
            Some(expr) => {
                parse_filter_expression(expr).map_err(|e| ContactError::Query(e.to_string()))?
            }
            None => Vec::new(),
        };

        let mut contacts = self.store.contacts().all().await;

        if let Some(term) = query.search.as_deref() {
            contacts = filter_by_text(contacts, term, SEARCH_FIELDS);
        }
        if let Some(status) = status {
            contacts.retain(|c| c.status == status);
        }
        if let Some(company) = active(&query.company) {
            contacts.retain(|c| c.company == company);
        }
        contacts = filter_by_date_range(contacts, "createdAt", preset, ctx);
        contacts = apply_filters(contacts, &clauses, ctx);

        let sort = query.sort.as_deref().unwrap_or("lastName");
        sort_by_field(&mut contacts, sort, direction);

        Ok(contacts)
    }

    /// Distinct company names, sorted
    pub async fn companies(&self) -> Vec<String> {
        self.store
            .contacts()
            .all()
            .await
            .into_iter()
            .map(|c| c.company)
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct tags across all contacts, sorted
    pub async fn tags(&self) -> Vec<String> {
        self.store
            .contacts()
            .all()
            .await
            .into_iter()
            .flat_map(|c| c.tags)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Add a tag; adding an existing tag is a no-op
    pub async fn add_tag(&self, id: &str, tag: &str) -> ContactResult<Contact> {
        let now = Utc::now();
        self.store
            .contacts()
            .update(id, |c| {
                if c.add_tag(tag) {
                    c.modified_at = Some(now);
                }
            })
            .await
            .map_err(|e| Self::not_found(id, e))
    }

    pub async fn remove_tag(&self, id: &str, tag: &str) -> ContactResult<Contact> {
        let now = Utc::now();
        self.store
            .contacts()
            .update(id, |c| {
                if c.remove_tag(tag) {
                    c.modified_at = Some(now);
                }
            })
            .await
            .map_err(|e| Self::not_found(id, e))
    }

    /// Import contacts from CSV text; invalid rows are reported, not fatal
    pub async fn import_csv(&self, data: &str) -> ContactResult<ImportSummary> {
        let parsed = parse_contacts_csv(data)?;
        let now = Utc::now();

        let contacts: Vec<Contact> = parsed
            .drafts
            .into_iter()
            .map(|d| Contact::from_draft(d, now))
            .collect();
        let imported = self.store.contacts().insert_many(contacts).await?;

        if !parsed.errors.is_empty() {
            tracing::warn!("CSV import skipped {} rows", parsed.errors.len());
        }
        tracing::info!("Imported {} contacts", imported);

        Ok(ImportSummary {
            imported,
            failed: parsed.errors.len(),
            errors: parsed.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    async fn create_test_service() -> (ContactService, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(Store::open(StoreConfig::new(dir.path())).await.unwrap());
        (ContactService::new(store), dir)
    }

    async fn seed(service: &ContactService) {
        let drafts = vec![
            ContactDraft::new("John", "Smith", "john@example.com", "Acme Inc.")
                .status(ContactStatus::Customer)
                .tag("VIP"),
            ContactDraft::new("Emily", "Johnson", "emily@example.com", "XYZ Corp")
                .title("Marketing Director")
                .tag("Marketing")
                .tag("New"),
            ContactDraft::new("Michael", "Brown", "michael@example.com", "Global Ltd")
                .status(ContactStatus::Partner),
            ContactDraft::new("Sarah", "Davis", "sarah@example.com", "Acme Inc.")
                .status(ContactStatus::Customer)
                .tag("VIP")
                .tag("Technical"),
        ];
        for draft in drafts {
            service.create(draft).await.unwrap();
        }
    }

    fn last_names(contacts: &[Contact]) -> Vec<&str> {
        contacts.iter().map(|c| c.last_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_invalid_contact_is_not_stored() {
        let (service, _dir) = create_test_service().await;

        let err = service
            .create(ContactDraft::new("John", "Smith", "john.example.com", "Acme"))
            .await
            .unwrap_err();

        match err {
            ContactError::Invalid(errors) => {
                assert_eq!(errors["email"], "Invalid email address");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(service.list(&ContactQuery::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_crud() {
        let (service, _dir) = create_test_service().await;
        let created = service
            .create(ContactDraft::new(" Ada ", "Lovelace", "ada@example.com", "Analytical"))
            .await
            .unwrap();
        assert_eq!(created.first_name, "Ada");

        let mut draft = created.to_draft();
        draft.title = "Mathematician".to_string();
        let updated = service.update(&created.id, draft).await.unwrap();
        assert_eq!(updated.title, "Mathematician");
        assert!(updated.modified_at.is_some());

        let mut bad = updated.to_draft();
        bad.company = " ".to_string();
        assert!(matches!(
            service.update(&created.id, bad).await,
            Err(ContactError::Invalid(_))
        ));

        service.delete(&created.id).await.unwrap();
        assert!(matches!(
            service.get(&created.id).await,
            Err(ContactError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_default_sort_and_search() {
        let (service, _dir) = create_test_service().await;
        seed(&service).await;

        let all = service.list(&ContactQuery::new()).await.unwrap();
        assert_eq!(last_names(&all), vec!["Brown", "Davis", "Johnson", "Smith"]);

        let found = service.list(&ContactQuery::new().search("marketing")).await.unwrap();
        assert_eq!(last_names(&found), vec!["Johnson"]);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (service, _dir) = create_test_service().await;
        seed(&service).await;

        let customers = service
            .list(&ContactQuery::new().status(ContactStatus::Customer))
            .await
            .unwrap();
        assert_eq!(last_names(&customers), vec!["Davis", "Smith"]);

        let acme = service
            .list(&ContactQuery::new().company("Acme Inc.").sort("name", SortDirection::Desc))
            .await
            .unwrap();
        assert_eq!(last_names(&acme), vec!["Davis", "Smith"]);

        let vip_tech = service
            .list(&ContactQuery::new().filter("tags contains 'VIP' AND tags contains 'Technical'"))
            .await
            .unwrap();
        assert_eq!(last_names(&vip_tech), vec!["Davis"]);

        let mut all_status = ContactQuery::new();
        all_status.status = Some("all".to_string());
        assert_eq!(service.list(&all_status).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_list_date_range() {
        let (service, _dir) = create_test_service().await;
        seed(&service).await;

        let now = EvalContext::new(Utc::now());
        let recent = service
            .list_at(&ContactQuery::new().date_range("last7days"), &now)
            .await
            .unwrap();
        assert_eq!(recent.len(), 4);

        let later = EvalContext::new(Utc::now() + Duration::days(10));
        let recent = service
            .list_at(&ContactQuery::new().date_range("last7days"), &later)
            .await
            .unwrap();
        assert!(recent.is_empty());

        let past = EvalContext::new(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            service
                .list_at(&ContactQuery::new().date_range("all"), &past)
                .await
                .unwrap()
                .len(),
            4
        );
    }

    #[tokio::test]
    async fn test_list_rejects_bad_query() {
        let (service, _dir) = create_test_service().await;

        let mut query = ContactQuery::new();
        query.status = Some("Prospect".to_string());
        assert!(matches!(service.list(&query).await, Err(ContactError::Query(_))));

        let query = ContactQuery::new().filter("status ~ 'Lead'");
        assert!(matches!(service.list(&query).await, Err(ContactError::Query(_))));
    }

    #[tokio::test]
    async fn test_companies_and_tags() {
        let (service, _dir) = create_test_service().await;
        seed(&service).await;

        assert_eq!(
            service.companies().await,
            vec!["Acme Inc.", "Global Ltd", "XYZ Corp"]
        );
        assert_eq!(
            service.tags().await,
            vec!["Marketing", "New", "Technical", "VIP"]
        );
    }

    #[tokio::test]
    async fn test_tag_edits() {
        let (service, _dir) = create_test_service().await;
        let contact = service
            .create(ContactDraft::new("John", "Smith", "john@example.com", "Acme Inc.").tag("VIP"))
            .await
            .unwrap();

        let updated = service.add_tag(&contact.id, "VIP").await.unwrap();
        assert_eq!(updated.tags, vec!["VIP".to_string()]);
        assert!(updated.modified_at.is_none());

        let updated = service.add_tag(&contact.id, "Technical").await.unwrap();
        assert_eq!(updated.tags.len(), 2);

        let updated = service.remove_tag(&contact.id, "VIP").await.unwrap();
        assert_eq!(updated.tags, vec!["Technical".to_string()]);

        assert!(matches!(
            service.add_tag("missing", "x").await,
            Err(ContactError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_import_csv() {
        let (service, _dir) = create_test_service().await;
        let csv_data = "\
firstName,lastName,email,company
John,Smith,john@example.com,Acme Inc.
Bad,Row,nope,Acme Inc.
Emily,Johnson,emily@example.com,XYZ Corp
";
        let summary = service.import_csv(csv_data).await.unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].line, 3);

        assert_eq!(service.list(&ContactQuery::new()).await.unwrap().len(), 2);
    }
}
