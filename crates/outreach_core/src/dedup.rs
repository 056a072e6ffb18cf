//! Contact deduplication by normalized email.
//!
//! Two policies live here on purpose and must not be merged:
//! [`find_duplicates`] keeps the first-seen contact of each group (reporting),
//! while [`deduplicate`] keeps the most complete one (cleaning).

use std::collections::HashMap;

use crate::domain::{Contact, DuplicateGroup, DuplicateReport};

/// Groups contacts by normalized email, preserving first-appearance order of groups.
fn group_by_email(contacts: &[Contact]) -> Vec<(String, Vec<&Contact>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Contact>)> = Vec::new();

    for contact in contacts {
        let key = contact.dedup_key();
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(contact),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![contact]));
            }
        }
    }

    groups
}

/// Keeps the first-seen contact per email and reports every group of size > 1.
pub fn find_duplicates(contacts: &[Contact]) -> DuplicateReport {
    let mut report = DuplicateReport::default();

    for (email, members) in group_by_email(contacts) {
        report.unique_contacts.push(members[0].clone());
        if members.len() > 1 {
            report.duplicates.push(DuplicateGroup {
                email,
                count: members.len(),
                contacts: members.into_iter().cloned().collect(),
            });
        }
    }

    report
}

/// Keeps, per email, the contact with the highest completeness score.
///
/// Ties go to the earliest contact. Surviving contacts appear in the order
/// their email was first seen.
pub fn deduplicate(contacts: &[Contact]) -> Vec<Contact> {
    group_by_email(contacts)
        .into_iter()
        .map(|(_, members)| {
            let mut best = members[0];
            for candidate in &members[1..] {
                if candidate.completeness_score() > best.completeness_score() {
                    best = candidate;
                }
            }
            best.clone()
        })
        .collect()
}
