//! Session wiring - connects the history store to its collaborators.
//!
//! A [`LedgerSession`] owns one client's [`HistoryStore`] and moves every
//! change through the same pipeline:
//!
//! * local change: auth check, apply to history, write through to the cache,
//!   publish to the room
//! * remote push: apply to history, write through to the cache, never publish
//!
//! Cache and publish failures after a local apply are reported in the
//! returned [`DispatchReport`]; the local history is never rolled back.

/// Authentication gate and identities
pub mod auth;
/// Remote snapshot channel and the in-process sync hub
pub mod channel;

use crate::config::database::create_connection;
use crate::config::settings::LedgerConfig;
use crate::core::cache::{load_snapshot, save_snapshot};
use crate::core::history::{DispatchOutcome, HistoryStore, Origin, SnapshotUpdate};
use crate::core::ledger::{BalanceReport, DateRange, compute_balances};
use crate::core::model::Snapshot;
use crate::core::mutation::{Mutation, MutationContext};
use crate::errors::{Error, Result};
use auth::IdentityProvider;
use channel::{ROOM_CAPACITY, SnapshotChannel, SyncHub};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, error, info, instrument, warn};

/// What happened to a change, plus any failures that did not undo it.
#[derive(Debug)]
pub struct DispatchReport {
    /// Whether history moved
    pub outcome: DispatchOutcome,
    /// Cache or publish failures raised after the change was applied
    pub failures: Vec<Error>,
}

impl DispatchReport {
    const fn unchanged() -> Self {
        Self {
            outcome: DispatchOutcome::Unchanged,
            failures: Vec::new(),
        }
    }

    /// Whether history moved.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.outcome == DispatchOutcome::Applied
    }

    /// Whether every follow-up step succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of draining the remote subscription.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Remote snapshots pushed into history
    pub applied: usize,
    /// Echoes and duplicates that were skipped
    pub ignored: usize,
    /// Cache failures while writing remote snapshots through
    pub failures: Vec<Error>,
}

/// One client's view of the shared ledger.
pub struct LedgerSession {
    db: DatabaseConnection,
    history: HistoryStore,
    auth: Arc<dyn IdentityProvider>,
    channel: Option<Arc<dyn SnapshotChannel>>,
    inbox: Option<broadcast::Receiver<Snapshot>>,
    // Our own publishes, in order, until the room hands them back
    pending_echoes: VecDeque<Snapshot>,
}

impl LedgerSession {
    /// Opens a session on an existing cache connection.
    ///
    /// History starts from the cached snapshot, or the empty snapshot when
    /// nothing was cached yet. The channel subscription is taken here so no
    /// push is missed between opening and the first sync.
    #[instrument(skip_all)]
    pub async fn open(
        db: DatabaseConnection,
        auth: Arc<dyn IdentityProvider>,
        channel: Option<Arc<dyn SnapshotChannel>>,
    ) -> Result<Self> {
        let initial = match load_snapshot(&db).await? {
            Some(snapshot) => {
                info!(
                    "Restored cached snapshot ({} people, {} records)",
                    snapshot.people.len(),
                    snapshot.records.len()
                );
                snapshot
            }
            None => {
                debug!("Starting from an empty snapshot");
                Snapshot::empty()
            }
        };
        let inbox = channel.as_ref().map(|c| c.subscribe());

        Ok(Self {
            db,
            history: HistoryStore::with_initial(initial),
            auth,
            channel,
            inbox,
            pending_echoes: VecDeque::new(),
        })
    }

    /// Connects the cache from `config` and joins the hub room for its group.
    #[instrument(skip_all, fields(group_id = %config.group_id))]
    pub async fn connect(
        config: &LedgerConfig,
        auth: Arc<dyn IdentityProvider>,
        hub: &SyncHub,
    ) -> Result<Self> {
        let db = create_connection(config).await?;
        let room: Arc<dyn SnapshotChannel> = hub.room(&config.group_id)?;
        Self::open(db, auth, Some(room)).await
    }

    /// The current snapshot.
    #[must_use]
    pub fn current(&self) -> &Snapshot {
        self.history.current()
    }

    /// Read-only access to the history.
    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Balances of the current snapshot over `range`.
    #[must_use]
    pub fn balances(&self, range: DateRange) -> BalanceReport {
        let snapshot = self.current();
        compute_balances(&snapshot.people, &snapshot.records, range)
    }

    fn context(&self) -> Result<MutationContext> {
        let identity = self
            .auth
            .current_identity()
            .ok_or(Error::Unauthenticated)?;
        Ok(MutationContext::new(identity.label(), Utc::now()))
    }

    /// Applies a local mutation.
    ///
    /// Fails with [`Error::Unauthenticated`] when nobody is signed in and
    /// with [`Error::Validation`] for invalid input; neither touches history.
    #[instrument(skip(self))]
    pub async fn dispatch(&mut self, mutation: Mutation) -> Result<DispatchReport> {
        let ctx = self.context().inspect_err(|_| {
            warn!("Mutation rejected: not signed in");
        })?;

        match self.history.dispatch(&mutation, &ctx)? {
            DispatchOutcome::Applied => {
                info!("Applied mutation as {}", ctx.actor);
                Ok(self.after_change(Origin::Local).await)
            }
            DispatchOutcome::Unchanged => Ok(DispatchReport::unchanged()),
        }
    }

    /// Steps back one snapshot and shares the result.
    pub async fn undo(&mut self) -> Result<DispatchReport> {
        self.context()?;
        if !self.history.can_undo() {
            return Ok(DispatchReport::unchanged());
        }
        self.history.undo();
        Ok(self.after_change(Origin::Local).await)
    }

    /// Steps forward one snapshot and shares the result.
    pub async fn redo(&mut self) -> Result<DispatchReport> {
        self.context()?;
        if !self.history.can_redo() {
            return Ok(DispatchReport::unchanged());
        }
        self.history.redo();
        Ok(self.after_change(Origin::Local).await)
    }

    /// Replaces the current snapshot with one pushed by the remote store.
    ///
    /// A snapshot equal to the current one is ignored. Remote snapshots are
    /// cached but never published again.
    #[instrument(skip_all)]
    pub async fn apply_remote(&mut self, snapshot: Snapshot) -> DispatchReport {
        if &snapshot == self.current() {
            debug!("Remote snapshot matches current state");
            return DispatchReport::unchanged();
        }
        let origin = self.history.replace(SnapshotUpdate::remote(snapshot));
        info!("Applied remote snapshot");
        self.after_change(origin).await
    }

    /// Applies every snapshot waiting on the subscription.
    pub async fn sync_pending(&mut self) -> SyncReport {
        let mut report = SyncReport::default();
        loop {
            let Some(inbox) = self.inbox.as_mut() else {
                break;
            };
            let snapshot = match inbox.try_recv() {
                Ok(snapshot) => snapshot,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} remote snapshots", skipped);
                    continue;
                }
                Err(TryRecvError::Closed) => {
                    warn!("Remote channel closed");
                    self.inbox = None;
                    break;
                }
            };

            // Queued echoes ahead of this one were lost to lag
            if let Some(index) = self.pending_echoes.iter().position(|s| s == &snapshot) {
                self.pending_echoes.drain(..=index);
                if !self.pending_echoes.is_empty() {
                    report.ignored += 1;
                    continue;
                }
                // Our last publish: the room's order still decides the state
            }

            let applied = self.apply_remote(snapshot).await;
            if applied.is_applied() {
                report.applied += 1;
            } else {
                report.ignored += 1;
            }
            report.failures.extend(applied.failures);
        }
        report
    }

    async fn after_change(&mut self, origin: Origin) -> DispatchReport {
        let mut failures = Vec::new();
        let snapshot = self.history.current().clone();

        if let Err(e) = save_snapshot(&self.db, &snapshot).await {
            error!("Failed to write snapshot to cache: {}", e);
            failures.push(e);
        }

        if origin.should_publish()
            && let Some(channel) = &self.channel
        {
            match channel.publish(&snapshot) {
                Ok(()) => {
                    if self.inbox.is_some() {
                        if self.pending_echoes.len() == ROOM_CAPACITY {
                            self.pending_echoes.pop_front();
                        }
                        self.pending_echoes.push_back(snapshot);
                    }
                }
                Err(e) => {
                    warn!("Failed to publish snapshot: {}", e);
                    failures.push(e);
                }
            }
        }

        DispatchReport {
            outcome: DispatchOutcome::Applied,
            failures,
        }
    }
}
