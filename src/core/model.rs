//! Domain model - people, expense records, audit entries and whole-ledger snapshots.
//!
//! A [`Snapshot`] is the entire durable state of the ledger. Snapshots are plain
//! values: every change produces a fresh one, nothing is edited in place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment state of one participant inside one expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStatus {
    /// Person name (the name is the key, there is no separate id)
    pub name: String,
    /// Whether this participant has settled their share
    pub paid: bool,
    /// When `paid` last became true; `None` while unpaid
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl ParticipantStatus {
    /// Creates an unpaid participant.
    #[must_use]
    pub fn unpaid(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paid: false,
            paid_at: None,
        }
    }

    /// Creates a participant that settled at `paid_at`.
    #[must_use]
    pub fn paid(name: impl Into<String>, paid_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            paid: true,
            paid_at: Some(paid_at),
        }
    }

    /// Marks the participant paid as of `now`.
    pub(crate) fn settle(&mut self, now: DateTime<Utc>) {
        self.paid = true;
        self.paid_at = Some(now);
    }

    /// Flips the paid flag, stamping or clearing `paid_at` to match.
    pub(crate) fn toggle(&mut self, now: DateTime<Utc>) {
        if self.paid {
            self.paid = false;
            self.paid_at = None;
        } else {
            self.settle(now);
        }
    }
}

/// One shared expense: someone paid `total_amount`, split across `participants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    /// Opaque id, stable for the record's lifetime
    pub id: String,
    /// Day the expense happened
    pub date: NaiveDate,
    /// Creation time, carried over unchanged by edits
    pub created_at: DateTime<Utc>,
    /// Free-text description
    pub title: String,
    /// Total cost in the smallest currency unit
    pub total_amount: i64,
    per_person_amount: i64,
    /// Person who fronted the money
    pub payer: String,
    /// Ordered participant list, always containing the payer
    pub participants: Vec<ParticipantStatus>,
}

impl ExpenseRecord {
    /// Builds a record and derives the per-person share from the participant count.
    #[must_use]
    pub fn new(
        id: String,
        date: NaiveDate,
        created_at: DateTime<Utc>,
        title: String,
        total_amount: i64,
        payer: String,
        participants: Vec<ParticipantStatus>,
    ) -> Self {
        let per_person_amount = per_person_share(total_amount, participants.len());
        Self {
            id,
            date,
            created_at,
            title,
            total_amount,
            per_person_amount,
            payer,
            participants,
        }
    }

    /// Rebuilds a record from stored columns, keeping the stored share as-is.
    pub(crate) const fn from_stored(
        id: String,
        date: NaiveDate,
        created_at: DateTime<Utc>,
        title: String,
        total_amount: i64,
        per_person_amount: i64,
        payer: String,
        participants: Vec<ParticipantStatus>,
    ) -> Self {
        Self {
            id,
            date,
            created_at,
            title,
            total_amount,
            per_person_amount,
            payer,
            participants,
        }
    }

    /// Each participant's share: `ceil(total_amount / participants)`.
    #[must_use]
    pub const fn per_person_amount(&self) -> i64 {
        self.per_person_amount
    }

    /// Looks up a participant by exact name.
    #[must_use]
    pub fn participant(&self, name: &str) -> Option<&ParticipantStatus> {
        self.participants.iter().find(|p| p.name == name)
    }

    pub(crate) fn participant_mut(&mut self, name: &str) -> Option<&mut ParticipantStatus> {
        self.participants.iter_mut().find(|p| p.name == name)
    }

    /// Participants other than the payer who have not settled yet.
    pub fn unpaid_participants(&self) -> impl Iterator<Item = &ParticipantStatus> {
        self.participants
            .iter()
            .filter(move |p| p.name != self.payer && !p.paid)
    }
}

/// Ceiling division of the total across `participant_count` people.
///
/// Rounding up can overcollect by up to `participant_count - 1` units; that
/// remainder is kept, not redistributed. Returns 0 for an empty list.
#[must_use]
pub fn per_person_share(total_amount: i64, participant_count: usize) -> i64 {
    let Ok(count) = i64::try_from(participant_count) else {
        return 0;
    };
    if count == 0 || total_amount <= 0 {
        return 0;
    }
    (total_amount - 1) / count + 1
}

/// Kind of change an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    /// Something was created
    Add,
    /// A record was replaced by an edited version
    Edit,
    /// Something was removed
    Delete,
    /// Paid flags changed
    StatusUpdate,
    /// Bulk maintenance (sample data, wipe)
    System,
}

impl ActionKind {
    /// Stable string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::StatusUpdate => "status-update",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "status-update" => Ok(Self::StatusUpdate),
            "system" => Ok(Self::System),
            other => Err(format!("unknown action kind '{other}'")),
        }
    }
}

/// One line of the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique id of the entry
    pub id: String,
    /// When the change was applied
    pub timestamp: DateTime<Utc>,
    /// Who made the change
    pub actor: String,
    /// What kind of change it was
    pub action_kind: ActionKind,
    /// Human-readable summary
    pub description: String,
}

/// The whole ledger at one point in history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Roster in insertion order
    pub people: Vec<String>,
    /// Records, newest insertion first
    pub records: Vec<ExpenseRecord>,
    /// Audit trail, newest first
    #[serde(default)]
    pub audit_log: Vec<LogEntry>,
}

impl Snapshot {
    /// The empty default snapshot.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            people: Vec::new(),
            records: Vec::new(),
            audit_log: Vec::new(),
        }
    }

    /// Whether `name` is on the roster (exact, case-sensitive match).
    #[must_use]
    pub fn has_person(&self, name: &str) -> bool {
        self.people.iter().any(|p| p == name)
    }

    /// Finds a record by id.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}
