//! A personal finance tracker for recording income, expenses, savings and
//! debts.
//!
//! All records live in a single SQLite database owned by a [Store]. Totals
//! and breakdowns are recomputed from the database on every request, and the
//! [debt] module projects how long a debt takes to pay off.

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod currency;
pub mod dashboard;
pub mod db;
pub mod debt;
pub mod expense;
pub mod income;
pub mod label;
pub mod logging;
pub mod money;
pub mod record;
pub mod savings;
pub mod store;
pub mod timezone;

pub use config::Config;
pub use currency::{Currency, format_currency};
pub use dashboard::{Breakdown, Overview, Summary};
pub use db::initialize as initialize_db;
pub use debt::{PayoffError, RepaymentProjection};
pub use label::Label;
pub use money::ValidationError;
pub use record::{NewRecord, Record, RecordId, RecordKind};
pub use store::Store;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided a value that cannot be stored, e.g. a negative
    /// amount or an empty category.
    ///
    /// Nothing is written to the database when this error is returned.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The repayment calculator could not produce a payoff date for the
    /// given terms.
    #[error("cannot compute payoff under these terms: {0}")]
    InvalidInput(#[from] PayoffError),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a record that does not exist.
    #[error("tried to update a {0} that is not in the database")]
    UpdateMissing(RecordKind),

    /// Tried to delete a record that does not exist.
    #[error("tried to delete a {0} that is not in the database")]
    DeleteMissing(RecordKind),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A result could not be written out as JSON.
    #[error("could not serialize the result: {0}")]
    Serialization(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
