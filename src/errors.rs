//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation problems
//! get their own [`ValidationError`] enum so callers can tell "this field needs
//! fixing" apart from "you must sign in" and from infrastructure failures.

use thiserror::Error;

/// Why a mutation was rejected before it reached the history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Person name was empty after trimming
    #[error("Person name must not be empty")]
    EmptyPersonName,

    /// Person is already on the roster
    #[error("Person '{name}' is already on the roster")]
    DuplicatePerson {
        /// The rejected name
        name: String,
    },

    /// Expense title was empty after trimming
    #[error("Expense title is required")]
    MissingTitle,

    /// Total amount was not positive or exceeded the ledger maximum
    #[error("Invalid amount: {amount}. Amount must be between 1 and 1000000000000000")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// No payer was selected
    #[error("Expense payer is required")]
    MissingPayer,

    /// Participant list was empty
    #[error("At least one participant is required")]
    NoParticipants,

    /// Payer is not among the participants
    #[error("Payer '{payer}' must be one of the participants")]
    PayerNotParticipant {
        /// The payer name
        payer: String,
    },

    /// The same name appears twice in one record
    #[error("Participant '{name}' is listed more than once")]
    DuplicateParticipant {
        /// The repeated name
        name: String,
    },

    /// Attempt to flip the payer's own paid flag
    #[error("'{name}' paid for this expense and is always settled")]
    PayerAlwaysPaid {
        /// The payer name
        name: String,
    },
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A mutation failed validation; nothing was applied
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A mutation was attempted without a signed-in identity
    #[error("You must sign in before changing the ledger")]
    Unauthenticated,

    /// The remote snapshot channel rejected a publish
    #[error("Publish error: {message}")]
    Publish {
        /// Description of the failure
        message: String,
    },

    /// Stored cache rows could not be turned back into a snapshot
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the failure
        message: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Integer did not fit the target column type
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
