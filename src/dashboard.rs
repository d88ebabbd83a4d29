//! Dashboard Widgets
//!
//! Summary figures shown on the landing page, computed on demand from the
//! contact and report collections.

use crate::report::evaluator::{filter_by_date_range, DateRangePreset, EvalContext};
use crate::store::{Contact, ContactStatus, Store};
use serde::Serialize;
use std::collections::HashMap;

/// How many entries the ranked widgets show
pub const WIDGET_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ContactStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCount {
    pub company: String,
    pub count: usize,
}

/// Dashboard summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_contacts: usize,
    /// One entry per status, including zero counts
    pub by_status: Vec<StatusCount>,
    pub new_last_30_days: usize,
    pub report_count: usize,
    /// Largest companies first; ties by name
    pub top_companies: Vec<CompanyCount>,
    /// Newest first
    pub recent_contacts: Vec<Contact>,
}

impl DashboardSummary {
    /// Compute the summary from a set of contacts
    pub fn compute(contacts: Vec<Contact>, report_count: usize, ctx: &EvalContext) -> Self {
        let by_status = ContactStatus::all()
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: contacts.iter().filter(|c| c.status == *status).count(),
            })
            .collect();

        let mut companies: HashMap<&str, usize> = HashMap::new();
        for contact in contacts.iter().filter(|c| !c.company.is_empty()) {
            *companies.entry(contact.company.as_str()).or_insert(0) += 1;
        }
        let mut top_companies: Vec<CompanyCount> = companies
            .into_iter()
            .map(|(company, count)| CompanyCount {
                company: company.to_string(),
                count,
            })
            .collect();
        top_companies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.company.cmp(&b.company)));
        top_companies.truncate(WIDGET_LIMIT);

        let total_contacts = contacts.len();

        let mut recent_contacts = contacts.clone();
        recent_contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_contacts.truncate(WIDGET_LIMIT);

        let new_last_30_days =
            filter_by_date_range(contacts, "createdAt", DateRangePreset::Last30Days, ctx).len();

        Self {
            total_contacts,
            by_status,
            new_last_30_days,
            report_count,
            top_companies,
            recent_contacts,
        }
    }
}

/// Build the dashboard summary from the store
pub async fn summarize(store: &Store, ctx: &EvalContext) -> DashboardSummary {
    let contacts = store.contacts().all().await;
    let report_count = store.reports().len().await;

    tracing::debug!(contacts = contacts.len(), reports = report_count, "Computing dashboard");
    DashboardSummary::compute(contacts, report_count, ctx)
}
