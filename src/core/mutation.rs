//! Mutations - the closed set of changes that can be applied to a snapshot.
//!
//! [`apply`] is a pure function: it reads the current snapshot and returns a
//! brand-new one (or nothing, when the change would be a no-op). The input is
//! never modified, which is what keeps earlier history entries intact.

use crate::core::audit::{describe_record, prepend_entry};
use crate::core::model::{ActionKind, Snapshot};
use crate::core::sample::{SampleMode, sample_people, sample_records};
use crate::core::validation::{RecordDraft, build_record, validate_draft, validate_person_name};
use crate::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A requested change to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    /// Append a person to the roster
    AddPerson {
        /// Name to add (trimmed before use)
        name: String,
    },
    /// Remove a person from the roster; records keep the name
    RemovePerson {
        /// Name to remove
        name: String,
    },
    /// Create a new expense record
    AddRecord {
        /// Submitted fields
        draft: RecordDraft,
    },
    /// Replace an existing record, keeping its id and creation time
    UpdateRecord {
        /// Record to replace
        id: String,
        /// New fields
        draft: RecordDraft,
    },
    /// Delete a record
    DeleteRecord {
        /// Record to delete
        id: String,
    },
    /// Flip one participant's paid flag on one record
    TogglePaid {
        /// Record to change
        record_id: String,
        /// Participant to flip
        person: String,
    },
    /// Settle every outstanding share of one person
    MarkAllPaid {
        /// Person whose debts are settled
        person: String,
    },
    /// Replace the roster (and optionally records) with demonstration data
    LoadSampleData {
        /// How much to load
        mode: SampleMode,
    },
    /// Wipe everything
    ClearData,
}

/// Who is applying a mutation, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationContext {
    /// Identity label recorded in the audit log
    pub actor: String,
    /// Timestamp used for `created_at`, `paid_at` and the audit entry
    pub now: DateTime<Utc>,
}

impl MutationContext {
    /// Builds a context for `actor` at `now`.
    #[must_use]
    pub fn new(actor: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            now,
        }
    }
}

/// Applies `mutation` to `current`.
///
/// Returns `Ok(Some(next))` with a fresh snapshot when something changed,
/// `Ok(None)` when the target does not exist or nothing would change, and
/// `Err` when the input is invalid. Every applied change carries exactly one
/// new audit entry.
#[allow(clippy::too_many_lines)]
pub fn apply(
    current: &Snapshot,
    mutation: &Mutation,
    ctx: &MutationContext,
) -> Result<Option<Snapshot>, ValidationError> {
    let mut next = current.clone();

    let (kind, description) = match mutation {
        Mutation::AddPerson { name } => {
            let name = validate_person_name(name, &current.people)?;
            let description = format!("Added {name} to the group");
            next.people.push(name);
            (ActionKind::Add, description)
        }
        Mutation::RemovePerson { name } => {
            let Some(index) = next.people.iter().position(|p| p == name) else {
                return Ok(None);
            };
            next.people.remove(index);
            (ActionKind::Delete, format!("Removed {name} from the group"))
        }
        Mutation::AddRecord { draft } => {
            let record = build_record(draft, Uuid::new_v4().to_string(), ctx.now, ctx.now)?;
            let description = format!("Added expense {}", describe_record(&record));
            next.records.insert(0, record);
            (ActionKind::Add, description)
        }
        Mutation::UpdateRecord { id, draft } => {
            validate_draft(draft)?;
            let Some(slot) = next.records.iter_mut().find(|r| &r.id == id) else {
                return Ok(None);
            };
            let record = build_record(draft, slot.id.clone(), slot.created_at, ctx.now)?;
            let description = format!("Edited expense {}", describe_record(&record));
            *slot = record;
            (ActionKind::Edit, description)
        }
        Mutation::DeleteRecord { id } => {
            let Some(index) = next.records.iter().position(|r| &r.id == id) else {
                return Ok(None);
            };
            let removed = next.records.remove(index);
            let description = format!("Deleted expense {}", describe_record(&removed));
            (ActionKind::Delete, description)
        }
        Mutation::TogglePaid { record_id, person } => {
            let Some(record) = next.records.iter_mut().find(|r| &r.id == record_id) else {
                return Ok(None);
            };
            if &record.payer == person {
                return Err(ValidationError::PayerAlwaysPaid {
                    name: person.clone(),
                });
            }
            let title = record.title.clone();
            let Some(participant) = record.participant_mut(person) else {
                return Ok(None);
            };
            participant.toggle(ctx.now);
            let state = if participant.paid { "paid" } else { "unpaid" };
            (
                ActionKind::StatusUpdate,
                format!("Marked {person} as {state} for \"{title}\""),
            )
        }
        Mutation::MarkAllPaid { person } => {
            let mut settled = 0usize;
            for record in &mut next.records {
                if &record.payer == person {
                    continue;
                }
                if let Some(participant) = record.participant_mut(person)
                    && !participant.paid
                {
                    participant.settle(ctx.now);
                    settled += 1;
                }
            }
            if settled == 0 {
                return Ok(None);
            }
            (
                ActionKind::StatusUpdate,
                format!("Settled all debts of {person} ({settled} records)"),
            )
        }
        Mutation::LoadSampleData { mode } => {
            next.people = sample_people();
            let description = match mode {
                SampleMode::Full => {
                    next.records = sample_records(ctx.now);
                    "Loaded sample roster and records".to_string()
                }
                SampleMode::PeopleOnly => "Loaded sample roster".to_string(),
            };
            (ActionKind::System, description)
        }
        Mutation::ClearData => {
            next = Snapshot::empty();
            (ActionKind::System, "Cleared all data".to_string())
        }
    };

    prepend_entry(&mut next, ctx, kind, description);
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::model::ParticipantStatus;
    use chrono::{Duration, NaiveDate};

    fn ctx() -> MutationContext {
        MutationContext::new("tester", Utc::now())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn with_people(names: &[&str]) -> Snapshot {
        Snapshot {
            people: names.iter().map(ToString::to_string).collect(),
            ..Snapshot::empty()
        }
    }

    fn add_lunch(snapshot: &Snapshot, ctx: &MutationContext) -> Snapshot {
        let draft = RecordDraft::new(day(), "Lunch", 100, "A", &["A", "B"]);
        apply(snapshot, &Mutation::AddRecord { draft }, ctx)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_add_person_appends_and_logs() {
        let next = apply(
            &with_people(&["A"]),
            &Mutation::AddPerson {
                name: " B ".to_string(),
            },
            &ctx(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.people, vec!["A", "B"]);
        assert_eq!(next.audit_log.len(), 1);
        assert_eq!(next.audit_log[0].action_kind, ActionKind::Add);
        assert_eq!(next.audit_log[0].actor, "tester");
    }

    #[test]
    fn test_add_person_duplicate_is_rejected() {
        let result = apply(
            &with_people(&["A"]),
            &Mutation::AddPerson {
                name: "A".to_string(),
            },
            &ctx(),
        );
        assert!(matches!(
            result,
            Err(ValidationError::DuplicatePerson { .. })
        ));
    }

    #[test]
    fn test_remove_person_does_not_cascade() {
        let ctx = ctx();
        let with_record = add_lunch(&with_people(&["A", "B"]), &ctx);
        let next = apply(
            &with_record,
            &Mutation::RemovePerson {
                name: "B".to_string(),
            },
            &ctx,
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.people, vec!["A"]);
        assert!(next.records[0].participant("B").is_some());
    }

    #[test]
    fn test_remove_unknown_person_is_noop() {
        let result = apply(
            &with_people(&["A"]),
            &Mutation::RemovePerson {
                name: "Z".to_string(),
            },
            &ctx(),
        );
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_add_record_prepends() {
        let ctx = ctx();
        let first = add_lunch(&with_people(&["A", "B"]), &ctx);
        let draft = RecordDraft::new(day(), "Dinner", 300, "B", &["A", "B", "C"]);
        let second = apply(&first, &Mutation::AddRecord { draft }, &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(second.records.len(), 2);
        assert_eq!(second.records[0].title, "Dinner");
        assert_eq!(second.records[0].per_person_amount(), 100);
        assert_eq!(second.records[1].title, "Lunch");
    }

    #[test]
    fn test_huge_amounts_are_bounded() {
        use crate::core::ledger::{DateRange, compute_balances};
        use crate::core::validation::MAX_TOTAL_AMOUNT;

        let ctx = ctx();
        let base = with_people(&["A", "B", "C"]);
        let draft = RecordDraft::new(day(), "Banquet", i64::MAX - 1, "A", &["A", "B"]);
        let result = apply(&base, &Mutation::AddRecord { draft }, &ctx);
        assert_eq!(
            result,
            Err(ValidationError::InvalidAmount {
                amount: i64::MAX - 1,
            })
        );

        let draft = RecordDraft::new(day(), "Banquet", MAX_TOTAL_AMOUNT, "A", &["A", "B", "C"]);
        let next = apply(&base, &Mutation::AddRecord { draft }, &ctx)
            .unwrap()
            .unwrap();
        let record = &next.records[0];
        assert!(record.per_person_amount() * 3 >= MAX_TOTAL_AMOUNT);

        let report = compute_balances(&next.people, &next.records, DateRange::new(day(), day()));
        assert_eq!(report.get("A").unwrap().owed, record.per_person_amount() * 2);
        assert_eq!(report.total_net(), 0);
    }

    #[test]
    fn test_invalid_record_leaves_input_untouched() {
        let base = with_people(&["A", "B"]);
        let draft = RecordDraft::new(day(), "", 100, "A", &["A", "B"]);
        let result = apply(&base, &Mutation::AddRecord { draft }, &ctx());
        assert_eq!(result, Err(ValidationError::MissingTitle));
        assert!(base.records.is_empty());
        assert!(base.audit_log.is_empty());
    }

    #[test]
    fn test_update_record_keeps_identity_and_position() {
        let ctx = ctx();
        let one = add_lunch(&with_people(&["A", "B", "C"]), &ctx);
        let draft = RecordDraft::new(day(), "Dinner", 50, "B", &["B", "C"]);
        let two = apply(&one, &Mutation::AddRecord { draft }, &ctx)
            .unwrap()
            .unwrap();
        let original = two.records[1].clone();

        let later = MutationContext::new("tester", ctx.now + Duration::minutes(5));
        let edited = RecordDraft::new(day(), "Lunch", 100, "A", &["C", "B", "A"]);
        let next = apply(
            &two,
            &Mutation::UpdateRecord {
                id: original.id.clone(),
                draft: edited,
            },
            &later,
        )
        .unwrap()
        .unwrap();

        let updated = &next.records[1];
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.per_person_amount(), 34);
        assert_eq!(updated.participants[0].name, "C");
        assert_eq!(next.audit_log[0].action_kind, ActionKind::Edit);
    }

    #[test]
    fn test_update_unknown_record_is_noop() {
        let draft = RecordDraft::new(day(), "Lunch", 100, "A", &["A"]);
        let result = apply(
            &with_people(&["A"]),
            &Mutation::UpdateRecord {
                id: "missing".to_string(),
                draft,
            },
            &ctx(),
        );
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_delete_record() {
        let ctx = ctx();
        let one = add_lunch(&with_people(&["A", "B"]), &ctx);
        let id = one.records[0].id.clone();
        let next = apply(&one, &Mutation::DeleteRecord { id: id.clone() }, &ctx)
            .unwrap()
            .unwrap();
        assert!(next.records.is_empty());
        assert_eq!(
            apply(&next, &Mutation::DeleteRecord { id }, &ctx),
            Ok(None)
        );
    }

    #[test]
    fn test_toggle_paid_round_trip() {
        let ctx = ctx();
        let one = add_lunch(&with_people(&["A", "B"]), &ctx);
        let toggle = Mutation::TogglePaid {
            record_id: one.records[0].id.clone(),
            person: "B".to_string(),
        };
        let paid = apply(&one, &toggle, &ctx).unwrap().unwrap();
        assert_eq!(
            paid.records[0].participant("B"),
            Some(&ParticipantStatus::paid("B", ctx.now))
        );
        let unpaid = apply(&paid, &toggle, &ctx).unwrap().unwrap();
        assert_eq!(
            unpaid.records[0].participant("B"),
            Some(&ParticipantStatus::unpaid("B"))
        );
    }

    #[test]
    fn test_toggle_paid_on_payer_is_rejected() {
        let ctx = ctx();
        let one = add_lunch(&with_people(&["A", "B"]), &ctx);
        let result = apply(
            &one,
            &Mutation::TogglePaid {
                record_id: one.records[0].id.clone(),
                person: "A".to_string(),
            },
            &ctx,
        );
        assert_eq!(
            result,
            Err(ValidationError::PayerAlwaysPaid {
                name: "A".to_string()
            })
        );
    }

    #[test]
    fn test_toggle_paid_unknown_targets_are_noops() {
        let ctx = ctx();
        let one = add_lunch(&with_people(&["A", "B"]), &ctx);
        let unknown_record = Mutation::TogglePaid {
            record_id: "nope".to_string(),
            person: "B".to_string(),
        };
        let unknown_person = Mutation::TogglePaid {
            record_id: one.records[0].id.clone(),
            person: "Z".to_string(),
        };
        assert_eq!(apply(&one, &unknown_record, &ctx), Ok(None));
        assert_eq!(apply(&one, &unknown_person, &ctx), Ok(None));
    }

    #[test]
    fn test_mark_all_paid_only_touches_outstanding_shares() {
        let start = ctx();
        let mut snapshot = with_people(&["A", "B", "C"]);
        for (title, payer) in [("One", "A"), ("Two", "C"), ("Three", "A"), ("Four", "B")] {
            let draft = RecordDraft::new(day(), title, 90, payer, &["A", "B", "C"]);
            snapshot = apply(&snapshot, &Mutation::AddRecord { draft }, &start)
                .unwrap()
                .unwrap();
        }
        // "Three" is already settled by B earlier on
        let three_id = snapshot.records[1].id.clone();
        snapshot = apply(
            &snapshot,
            &Mutation::TogglePaid {
                record_id: three_id,
                person: "B".to_string(),
            },
            &start,
        )
        .unwrap()
        .unwrap();

        let later = MutationContext::new("tester", start.now + Duration::hours(1));
        let next = apply(
            &snapshot,
            &Mutation::MarkAllPaid {
                person: "B".to_string(),
            },
            &later,
        )
        .unwrap()
        .unwrap();

        let paid_at = |s: &Snapshot, title: &str| {
            s.records
                .iter()
                .find(|r| r.title == title)
                .and_then(|r| r.participant("B"))
                .and_then(|p| p.paid_at)
        };
        assert_eq!(paid_at(&next, "One"), Some(later.now));
        assert_eq!(paid_at(&next, "Two"), Some(later.now));
        assert_eq!(paid_at(&next, "Three"), Some(start.now));
        assert_eq!(paid_at(&next, "Four"), Some(start.now));
        assert!(next.audit_log[0].description.contains("2 records"));

        // Nothing left to settle
        assert_eq!(
            apply(
                &next,
                &Mutation::MarkAllPaid {
                    person: "B".to_string()
                },
                &later
            ),
            Ok(None)
        );
    }

    #[test]
    fn test_load_sample_people_only_keeps_records() {
        let ctx = ctx();
        let one = add_lunch(&with_people(&["A", "B"]), &ctx);
        let next = apply(
            &one,
            &Mutation::LoadSampleData {
                mode: SampleMode::PeopleOnly,
            },
            &ctx,
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.people, sample_people());
        assert_eq!(next.records, one.records);
    }

    #[test]
    fn test_load_sample_full_replaces_records() {
        let next = apply(
            &Snapshot::empty(),
            &Mutation::LoadSampleData {
                mode: SampleMode::Full,
            },
            &ctx(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(next.people.len(), 4);
        assert_eq!(next.records.len(), 2);
        assert_eq!(next.audit_log[0].action_kind, ActionKind::System);
    }

    #[test]
    fn test_clear_data_wipes_everything_but_the_wipe_entry() {
        let ctx = ctx();
        let one = add_lunch(&with_people(&["A", "B"]), &ctx);
        let next = apply(&one, &Mutation::ClearData, &ctx).unwrap().unwrap();
        assert!(next.people.is_empty());
        assert!(next.records.is_empty());
        assert_eq!(next.audit_log.len(), 1);
        assert_eq!(next.audit_log[0].description, "Cleared all data");
    }
}
