//! Audit trail entries attached to each applied mutation.

use crate::core::model::{ActionKind, ExpenseRecord, LogEntry, Snapshot};
use crate::core::mutation::MutationContext;
use crate::core::report::format_amount;
use uuid::Uuid;

/// Prepends a new entry to the snapshot's audit log (newest first).
pub fn prepend_entry(
    snapshot: &mut Snapshot,
    ctx: &MutationContext,
    action_kind: ActionKind,
    description: String,
) {
    let entry = LogEntry {
        id: Uuid::new_v4().to_string(),
        timestamp: ctx.now,
        actor: ctx.actor.clone(),
        action_kind,
        description,
    };
    snapshot.audit_log.insert(0, entry);
}

/// One-line summary of a record, e.g. `"Lunch" 100 ₫ paid by A (2 people)`.
#[must_use]
pub fn describe_record(record: &ExpenseRecord) -> String {
    format!(
        "\"{}\" {} paid by {} ({} people)",
        record.title,
        format_amount(record.total_amount),
        record.payer,
        record.participants.len()
    )
}
