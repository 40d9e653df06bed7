//! Person entity - One roster member.
//!
//! The name is the identity; `position` preserves roster insertion order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Person database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "people")]
pub struct Model {
    /// Row identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Zero-based place in the roster
    pub position: i32,
    /// Display name, unique within the roster
    pub name: String,
}

/// `Person` has no relationships; records reference names as plain strings
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
