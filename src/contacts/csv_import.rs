//! CSV Import
//!
//! Reads contacts from CSV text. Columns are matched by header name
//! (case-insensitive, spaces and underscores ignored), so
//! `First Name`, `first_name` and `firstName` all map to the same field.
//! Tags are separated by `;` inside their cell.

use crate::contacts::error::ContactResult;
use crate::contacts::validation::validate_contact;
use crate::store::{ContactDraft, ContactStatus};

/// One row that could not be imported
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Outcome of parsing a CSV document
#[derive(Debug, Default)]
pub struct ParsedImport {
    /// Valid drafts, in file order
    pub drafts: Vec<ContactDraft>,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Column {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    Title,
    Status,
    Tags,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        let key: String = header
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "firstname" | "first" => Some(Self::FirstName),
            "lastname" | "last" | "surname" => Some(Self::LastName),
            "email" | "emailaddress" => Some(Self::Email),
            "phone" | "phonenumber" => Some(Self::Phone),
            "company" | "organization" => Some(Self::Company),
            "title" | "jobtitle" => Some(Self::Title),
            "status" => Some(Self::Status),
            "tags" => Some(Self::Tags),
            _ => None,
        }
    }
}

/// Parse CSV text into validated drafts
///
/// Rows that fail validation are reported with their line number and skipped;
/// they never abort the rest of the file.
pub fn parse_contacts_csv(data: &str) -> ContactResult<ParsedImport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let columns: Vec<Option<Column>> = reader.headers()?.iter().map(Column::from_header).collect();

    let mut parsed = ParsedImport::default();

    for (idx, result) in reader.records().enumerate() {
        // Quoted cells may span lines, so row index and line number can differ
        let fallback = idx + 2;

        let (record, line) = match result {
            Ok(r) => {
                let line = r.position().map(|p| p.line() as usize).unwrap_or(fallback);
                (r, line)
            }
            Err(e) => {
                parsed.errors.push(RowError {
                    line: e.position().map(|p| p.line() as usize).unwrap_or(fallback),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let mut draft = ContactDraft::default();
        let mut status_error = None;

        for (cell, column) in record.iter().zip(columns.iter()) {
            let Some(column) = column else { continue };
            match column {
                Column::FirstName => draft.first_name = cell.to_string(),
                Column::LastName => draft.last_name = cell.to_string(),
                Column::Email => draft.email = cell.to_string(),
                Column::Phone => draft.phone = cell.to_string(),
                Column::Company => draft.company = cell.to_string(),
                Column::Title => draft.title = cell.to_string(),
                Column::Status if cell.is_empty() => {}
                Column::Status => match ContactStatus::parse(cell) {
                    Some(status) => draft.status = status,
                    None => status_error = Some(format!("Unknown status '{}'", cell)),
                },
                Column::Tags => {
                    draft.tags = cell.split(';').map(|t| t.to_string()).collect();
                }
            }
        }

        let draft = draft.normalized();
        let mut problems: Vec<String> = validate_contact(&draft).into_values().collect();
        problems.extend(status_error);

        if problems.is_empty() {
            parsed.drafts.push(draft);
        } else {
            parsed.errors.push(RowError {
                line,
                message: problems.join("; "),
            });
        }
    }

    Ok(parsed)
}
