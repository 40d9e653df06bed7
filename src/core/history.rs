//! History store - linear undo/redo over whole-ledger snapshots.
//!
//! The store owns an ordered list of snapshots and a cursor pointing at the
//! current one. Any new state truncates the redo tail, is appended, and
//! becomes current. Stored snapshots are never modified afterwards.

use crate::core::model::Snapshot;
use crate::core::mutation::{Mutation, MutationContext, apply};
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

static EMPTY_SNAPSHOT: Snapshot = Snapshot::empty();

/// Where a replacement snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Produced on this client; must be published
    Local,
    /// Pushed by the remote store; must never be re-published
    Remote,
}

impl Origin {
    /// Whether a change with this origin should be sent to the remote store.
    #[must_use]
    pub const fn should_publish(self) -> bool {
        matches!(self, Self::Local)
    }
}

/// A whole-snapshot replacement tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotUpdate {
    /// Where the snapshot came from
    pub origin: Origin,
    /// The new snapshot
    pub snapshot: Snapshot,
}

impl SnapshotUpdate {
    /// Update produced on this client.
    #[must_use]
    pub const fn local(snapshot: Snapshot) -> Self {
        Self {
            origin: Origin::Local,
            snapshot,
        }
    }

    /// Update pushed by the remote store.
    #[must_use]
    pub const fn remote(snapshot: Snapshot) -> Self {
        Self {
            origin: Origin::Remote,
            snapshot,
        }
    }
}

/// Result of a dispatch that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A new snapshot was pushed and is now current
    Applied,
    /// The target did not exist or nothing changed; history untouched
    Unchanged,
}

/// Linear snapshot history with a cursor.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl HistoryStore {
    /// Creates an uninitialized store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: 0,
        }
    }

    /// Creates a store whose only entry is `initial`.
    #[must_use]
    pub fn with_initial(initial: Snapshot) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
        }
    }

    /// Resets the history to a single snapshot.
    pub fn initialize(&mut self, initial: Snapshot) {
        self.snapshots = vec![initial];
        self.cursor = 0;
    }

    /// Whether at least one snapshot has been stored.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// The snapshot at the cursor, or the empty default before initialization.
    #[must_use]
    pub fn current(&self) -> &Snapshot {
        self.snapshots.get(self.cursor).unwrap_or(&EMPTY_SNAPSHOT)
    }

    /// Index of the current snapshot.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Whether [`undo`](Self::undo) would move the cursor.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`redo`](Self::redo) would move the cursor.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Applies `mutation` to the current snapshot and pushes the result.
    ///
    /// Validation failures are returned as errors and leave the history
    /// untouched; no-ops return [`DispatchOutcome::Unchanged`].
    pub fn dispatch(
        &mut self,
        mutation: &Mutation,
        ctx: &MutationContext,
    ) -> Result<DispatchOutcome> {
        let next = apply(self.current(), mutation, ctx).inspect_err(|e| {
            warn!("Rejected mutation {:?}: {}", mutation, e);
        })?;

        match next {
            Some(snapshot) => {
                self.push(snapshot);
                debug!("Applied mutation, history now {} entries", self.len());
                Ok(DispatchOutcome::Applied)
            }
            None => {
                debug!("Mutation {:?} changed nothing", mutation);
                Ok(DispatchOutcome::Unchanged)
            }
        }
    }

    /// Pushes a whole replacement snapshot, whatever its origin.
    ///
    /// Returns the origin so the caller can decide whether to publish.
    pub fn replace(&mut self, update: SnapshotUpdate) -> Origin {
        let SnapshotUpdate { origin, snapshot } = update;
        self.push(snapshot);
        trace!("Replaced snapshot from {:?} origin", origin);
        origin
    }

    /// Moves the cursor back one step if possible.
    pub fn undo(&mut self) -> &Snapshot {
        if self.can_undo() {
            self.cursor -= 1;
            trace!("Undo, cursor now {}", self.cursor);
        }
        self.current()
    }

    /// Moves the cursor forward one step if possible.
    pub fn redo(&mut self) -> &Snapshot {
        if self.can_redo() {
            self.cursor += 1;
            trace!("Redo, cursor now {}", self.cursor);
        }
        self.current()
    }

    fn push(&mut self, snapshot: Snapshot) {
        if self.snapshots.is_empty() {
            // Keep the implicit empty start reachable by undo
            self.snapshots.push(Snapshot::empty());
            self.cursor = 0;
        }
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
    }
}
