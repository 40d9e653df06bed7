//! Shared test utilities for the lunch ledger.
//!
//! This module provides common helpers for setting up test databases and
//! building snapshots with sensible defaults.

use crate::{
    core::{
        model::Snapshot,
        mutation::{Mutation, MutationContext, apply},
        validation::RecordDraft,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all cache tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// The day every test record is dated on unless stated otherwise.
#[must_use]
pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap_or_default()
}

/// Applies `mutations` in order, skipping no-ops.
///
/// # Panics
/// Panics if any mutation is rejected.
#[must_use]
#[allow(clippy::panic)]
pub fn apply_all(start: &Snapshot, mutations: &[Mutation], ctx: &MutationContext) -> Snapshot {
    mutations.iter().fold(start.clone(), |snapshot, mutation| {
        match apply(&snapshot, mutation, ctx) {
            Ok(Some(next)) => next,
            Ok(None) => snapshot,
            Err(e) => panic!("test mutation {mutation:?} rejected: {e}"),
        }
    })
}

/// Roster `A`, `B`, `C` with one "Lunch" of 100 paid by `A`, split `A`/`B`.
#[must_use]
pub fn snapshot_with_lunch(ctx: &MutationContext) -> Snapshot {
    let mut mutations: Vec<Mutation> = ["A", "B", "C"]
        .iter()
        .map(|name| Mutation::AddPerson {
            name: (*name).to_string(),
        })
        .collect();
    mutations.push(Mutation::AddRecord {
        draft: RecordDraft::new(test_day(), "Lunch", 100, "A", &["A", "B"]),
    });
    apply_all(&Snapshot::empty(), &mutations, ctx)
}
