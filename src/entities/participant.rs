//! Participant entity - One person's share of one expense record.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Participant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    /// Row identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// ID of the record this share belongs to
    pub record_id: String,
    /// Zero-based place in the record's participant list
    pub position: i32,
    /// Person name
    pub name: String,
    /// Whether the share has been settled
    pub paid: bool,
    /// When it was settled
    pub paid_at: Option<DateTimeUtc>,
}

/// Defines relationships between Participant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each participant row belongs to one record
    #[sea_orm(
        belongs_to = "super::expense_record::Entity",
        from = "Column::RecordId",
        to = "super::expense_record::Column::Id"
    )]
    ExpenseRecord,
}

impl Related<super::expense_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
