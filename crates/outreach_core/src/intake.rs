//! Turns imported rows into validated contacts plus a batch report.
//!
//! Invalid rows never abort the batch; they are collected with their errors.

use serde::Serialize;
use tracing::info;

use crate::dedup::{deduplicate, find_duplicates};
use crate::domain::{Contact, DuplicateGroup, RawContactRow};
use crate::validation::validate_email;

/// A row that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RejectedRow {
    /// Zero-based position among the imported data rows.
    pub row: usize,
    pub email: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IntakeReport {
    /// Valid contacts, deduplicated when requested.
    pub contacts: Vec<Contact>,
    pub rejected: Vec<RejectedRow>,
    /// Duplicate groups among the valid contacts, reported either way.
    pub duplicates: Vec<DuplicateGroup>,
    pub total_rows: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub warning_count: usize,
}

/// Validates every row and optionally removes duplicates (most complete wins).
pub fn run_intake(rows: Vec<RawContactRow>, dedupe: bool) -> IntakeReport {
    let total_rows = rows.len();
    let mut valid = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for (row, raw) in rows.into_iter().enumerate() {
        let result = validate_email(&raw.email);
        if result.is_valid {
            valid.push(Contact::from_row(raw, result.warnings));
        } else {
            rejected.push(RejectedRow {
                row,
                email: raw.email,
                errors: result.errors,
            });
        }
    }

    let valid_count = valid.len();
    let warning_count = valid.iter().filter(|c| !c.warnings.is_empty()).count();
    let duplicates = find_duplicates(&valid).duplicates;
    let contacts = if dedupe { deduplicate(&valid) } else { valid };

    info!(
        total_rows,
        valid_count,
        invalid = rejected.len(),
        duplicate_groups = duplicates.len(),
        "Contact intake complete"
    );

    IntakeReport {
        contacts,
        invalid_count: rejected.len(),
        rejected,
        duplicates,
        total_rows,
        valid_count,
        warning_count,
    }
}
