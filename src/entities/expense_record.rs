//! Expense record entity - One shared expense.
//!
//! Each record has a date, title, total amount, the derived per-person share,
//! and the payer's name. Participants live in their own table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_records")]
pub struct Model {
    /// Opaque record id (UUID string)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Zero-based place in the snapshot's record list
    pub position: i32,
    /// Day the expense happened
    pub date: Date,
    /// When the record was first created
    pub created_at: DateTimeUtc,
    /// Free-text description
    pub title: String,
    /// Total cost in the smallest currency unit
    pub total_amount: i64,
    /// Ceiling share per participant
    pub per_person_amount: i64,
    /// Name of the person who paid
    pub payer: String,
}

/// Defines relationships between `ExpenseRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One record has many participants
    #[sea_orm(has_many = "super::participant::Entity")]
    Participants,
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
