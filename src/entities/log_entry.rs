//! Log entry entity - The audit trail.
//!
//! `action_kind` is stored as its kebab-case string (`add`, `edit`, `delete`,
//! `status-update`, `system`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "log_entries")]
pub struct Model {
    /// Entry id (UUID string)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Zero-based place in the log, newest first
    pub position: i32,
    /// When the change happened
    pub timestamp: DateTimeUtc,
    /// Identity label of whoever made the change
    pub actor: String,
    /// Kind of change
    pub action_kind: String,
    /// Human-readable summary
    pub description: String,
}

/// `LogEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
