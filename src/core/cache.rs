//! Snapshot cache - persists the current snapshot to the local database.
//!
//! The cache is write-through: every snapshot change replaces the stored copy
//! inside one database transaction. It is read once, when a session opens,
//! so the ledger has something to show before the remote store answers.

use crate::{
    core::model::{ActionKind, ExpenseRecord, LogEntry, ParticipantStatus, Snapshot},
    entities::{self, expense_record, log_entry, participant, person, system_state},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const SNAPSHOT_SAVED_AT_KEY: &str = "snapshot_saved_at";

fn position(index: usize) -> Result<i32> {
    Ok(i32::try_from(index)?)
}

/// Replaces the cached snapshot with `snapshot`.
#[instrument(
    skip(db, snapshot),
    fields(people = snapshot.people.len(), records = snapshot.records.len())
)]
pub async fn save_snapshot(db: &DatabaseConnection, snapshot: &Snapshot) -> Result<()> {
    let txn = db.begin().await?;

    entities::Participant::delete_many().exec(&txn).await?;
    entities::ExpenseRecord::delete_many().exec(&txn).await?;
    entities::Person::delete_many().exec(&txn).await?;
    entities::LogEntry::delete_many().exec(&txn).await?;

    let people = snapshot
        .people
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Ok(person::ActiveModel {
                position: Set(position(i)?),
                name: Set(name.clone()),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>>>()?;
    if !people.is_empty() {
        entities::Person::insert_many(people)
            .exec_without_returning(&txn)
            .await?;
    }

    let mut records = Vec::with_capacity(snapshot.records.len());
    let mut participants = Vec::new();
    for (i, record) in snapshot.records.iter().enumerate() {
        records.push(expense_record::ActiveModel {
            id: Set(record.id.clone()),
            position: Set(position(i)?),
            date: Set(record.date),
            created_at: Set(record.created_at),
            title: Set(record.title.clone()),
            total_amount: Set(record.total_amount),
            per_person_amount: Set(record.per_person_amount()),
            payer: Set(record.payer.clone()),
        });
        for (j, status) in record.participants.iter().enumerate() {
            participants.push(participant::ActiveModel {
                record_id: Set(record.id.clone()),
                position: Set(position(j)?),
                name: Set(status.name.clone()),
                paid: Set(status.paid),
                paid_at: Set(status.paid_at),
                ..Default::default()
            });
        }
    }
    if !records.is_empty() {
        entities::ExpenseRecord::insert_many(records)
            .exec_without_returning(&txn)
            .await?;
    }
    if !participants.is_empty() {
        entities::Participant::insert_many(participants)
            .exec_without_returning(&txn)
            .await?;
    }

    let entries = snapshot
        .audit_log
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Ok(log_entry::ActiveModel {
                id: Set(entry.id.clone()),
                position: Set(position(i)?),
                timestamp: Set(entry.timestamp),
                actor: Set(entry.actor.clone()),
                action_kind: Set(entry.action_kind.as_str().to_string()),
                description: Set(entry.description.clone()),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    if !entries.is_empty() {
        entities::LogEntry::insert_many(entries)
            .exec_without_returning(&txn)
            .await?;
    }

    mark_saved(&txn, Utc::now()).await?;
    txn.commit().await?;

    info!("Cached snapshot written");
    Ok(())
}

async fn mark_saved<C>(db: &C, now: DateTime<Utc>) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = entities::SystemState::find()
        .filter(system_state::Column::Key.eq(SNAPSHOT_SAVED_AT_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(now.to_rfc3339());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(SNAPSHOT_SAVED_AT_KEY.to_string()),
            value: Set(now.to_rfc3339()),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }
    Ok(())
}

/// When the cached snapshot was last written, if ever.
pub async fn last_saved_at(db: &DatabaseConnection) -> Result<Option<DateTime<Utc>>> {
    let state = entities::SystemState::find()
        .filter(system_state::Column::Key.eq(SNAPSHOT_SAVED_AT_KEY))
        .one(db)
        .await?;
    Ok(state.map(|s| s.updated_at))
}

/// Reads the cached snapshot; `None` if nothing was ever saved.
#[instrument(skip(db))]
pub async fn load_snapshot(db: &DatabaseConnection) -> Result<Option<Snapshot>> {
    if last_saved_at(db).await?.is_none() {
        debug!("No cached snapshot yet");
        return Ok(None);
    }

    let people = entities::Person::find()
        .order_by_asc(person::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut shares: HashMap<String, Vec<ParticipantStatus>> = HashMap::new();
    for row in entities::Participant::find()
        .order_by_asc(participant::Column::RecordId)
        .order_by_asc(participant::Column::Position)
        .all(db)
        .await?
    {
        shares.entry(row.record_id).or_default().push(ParticipantStatus {
            name: row.name,
            paid: row.paid,
            paid_at: row.paid_at,
        });
    }

    let records = entities::ExpenseRecord::find()
        .order_by_asc(expense_record::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|r| {
            let participants = shares.remove(&r.id).unwrap_or_default();
            ExpenseRecord::from_stored(
                r.id,
                r.date,
                r.created_at,
                r.title,
                r.total_amount,
                r.per_person_amount,
                r.payer,
                participants,
            )
        })
        .collect();

    let audit_log = entities::LogEntry::find()
        .order_by_asc(log_entry::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|e| {
            let action_kind = e
                .action_kind
                .parse::<ActionKind>()
                .map_err(|message| Error::Cache { message })?;
            Ok(LogEntry {
                id: e.id,
                timestamp: e.timestamp,
                actor: e.actor,
                action_kind,
                description: e.description,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(Snapshot {
        people,
        records,
        audit_log,
    }))
}
