//! Entity module - Contains all SeaORM entity definitions for the local snapshot cache.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod expense_record;
pub mod log_entry;
pub mod participant;
pub mod person;
pub mod system_state;

// Re-export specific types to avoid conflicts
pub use expense_record::{
    Column as ExpenseRecordColumn, Entity as ExpenseRecord, Model as ExpenseRecordModel,
};
pub use log_entry::{Column as LogEntryColumn, Entity as LogEntry, Model as LogEntryModel};
pub use participant::{
    Column as ParticipantColumn, Entity as Participant, Model as ParticipantModel,
};
pub use person::{Column as PersonColumn, Entity as Person, Model as PersonModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
