//! Remote snapshot channel - how clients share whole-ledger snapshots.
//!
//! The real backing store is a collaborator behind [`SnapshotChannel`]. The
//! in-process [`SyncHub`] implements it with one `tokio::sync::broadcast`
//! room per group id, which is enough to run several clients side by side.

use crate::core::model::Snapshot;
use crate::errors::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Buffered snapshots per room before slow subscribers start lagging.
pub const ROOM_CAPACITY: usize = 64;

/// Push/publish interface of the remote store.
pub trait SnapshotChannel: Send + Sync {
    /// Sends a snapshot to every subscriber of the room (fire-and-forget).
    fn publish(&self, snapshot: &Snapshot) -> Result<()>;

    /// Receiver of every snapshot published to the room from now on.
    /// Dropping it unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<Snapshot>;
}

/// One shared room.
#[derive(Debug, Clone)]
pub struct RoomChannel {
    group_id: String,
    sender: broadcast::Sender<Snapshot>,
}

impl RoomChannel {
    /// The room's group id.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }
}

impl SnapshotChannel for RoomChannel {
    fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        let receivers = self
            .sender
            .send(snapshot.clone())
            .map_err(|_| Error::Publish {
                message: format!("no subscribers in room '{}'", self.group_id),
            })?;
        trace!("Published snapshot to {} receivers in '{}'", receivers, self.group_id);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.sender.subscribe()
    }
}

/// Registry of rooms keyed by group id.
#[derive(Debug, Default)]
pub struct SyncHub {
    rooms: Mutex<HashMap<String, broadcast::Sender<Snapshot>>>,
}

impl SyncHub {
    /// An empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The room for `group_id`, created on first use.
    pub fn room(&self, group_id: &str) -> Result<Arc<RoomChannel>> {
        let mut rooms = self.rooms.lock().map_err(|_| Error::Publish {
            message: "sync hub lock poisoned".to_string(),
        })?;
        let sender = rooms
            .entry(group_id.to_string())
            .or_insert_with(|| {
                debug!("Opening sync room '{}'", group_id);
                broadcast::channel(ROOM_CAPACITY).0
            })
            .clone();
        Ok(Arc::new(RoomChannel {
            group_id: group_id.to_string(),
            sender,
        }))
    }
}
