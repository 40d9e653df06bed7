//! Input validation for roster names and expense drafts.
//!
//! All checks live here so the history store protects itself no matter how
//! careful the caller was. A failed check never touches any snapshot.

use crate::core::model::{ExpenseRecord, ParticipantStatus};
use crate::errors::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest accepted `total_amount`; keeps every share and sum inside `i64`.
pub const MAX_TOTAL_AMOUNT: i64 = 1_000_000_000_000_000;

/// A participant as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDraft {
    /// Person name
    pub name: String,
    /// Whether the user ticked "paid"
    #[serde(default)]
    pub paid: bool,
    /// Optional explicit settle time
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl ParticipantDraft {
    /// Unpaid participant with no timestamp.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paid: false,
            paid_at: None,
        }
    }
}

/// Expense fields as submitted for an add or an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    /// Day of the expense
    pub date: NaiveDate,
    /// Description
    pub title: String,
    /// Total cost in the smallest currency unit
    pub total_amount: i64,
    /// Who paid
    pub payer: String,
    /// Who took part, payer included
    pub participants: Vec<ParticipantDraft>,
}

impl RecordDraft {
    /// Draft where everyone except the payer still owes.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        title: impl Into<String>,
        total_amount: i64,
        payer: impl Into<String>,
        participants: &[&str],
    ) -> Self {
        Self {
            date,
            title: title.into(),
            total_amount,
            payer: payer.into(),
            participants: participants
                .iter()
                .map(|name| ParticipantDraft::named(*name))
                .collect(),
        }
    }
}

/// Trims a roster name and checks it against the current roster.
pub fn validate_person_name(name: &str, roster: &[String]) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPersonName);
    }
    if roster.iter().any(|p| p == trimmed) {
        return Err(ValidationError::DuplicatePerson {
            name: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Checks a draft for the fields every record needs.
pub fn validate_draft(draft: &RecordDraft) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if !(1..=MAX_TOTAL_AMOUNT).contains(&draft.total_amount) {
        return Err(ValidationError::InvalidAmount {
            amount: draft.total_amount,
        });
    }
    if draft.payer.trim().is_empty() {
        return Err(ValidationError::MissingPayer);
    }
    if draft.participants.is_empty() {
        return Err(ValidationError::NoParticipants);
    }

    let mut seen = HashSet::with_capacity(draft.participants.len());
    for participant in &draft.participants {
        if !seen.insert(participant.name.as_str()) {
            return Err(ValidationError::DuplicateParticipant {
                name: participant.name.clone(),
            });
        }
    }
    if !seen.contains(draft.payer.as_str()) {
        return Err(ValidationError::PayerNotParticipant {
            payer: draft.payer.clone(),
        });
    }
    Ok(())
}

/// Validates a draft and turns it into a full record.
///
/// The payer is always settled. A settled participant keeps the submitted
/// `paid_at` or gets `now`; an unsettled one has it cleared.
pub fn build_record(
    draft: &RecordDraft,
    id: String,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<ExpenseRecord, ValidationError> {
    validate_draft(draft)?;

    let participants = draft
        .participants
        .iter()
        .map(|p| {
            let paid = p.name == draft.payer || p.paid;
            ParticipantStatus {
                name: p.name.clone(),
                paid,
                paid_at: if paid { Some(p.paid_at.unwrap_or(now)) } else { None },
            }
        })
        .collect();

    Ok(ExpenseRecord::new(
        id,
        draft.date,
        created_at,
        draft.title.trim().to_string(),
        draft.total_amount,
        draft.payer.clone(),
        participants,
    ))
}
