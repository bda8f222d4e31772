use thiserror::Error;

/// Every failure the ledger can report.
///
/// The classifier in [`crate::core::classifier`] never produces one of these;
/// only storage, configuration and write-side validation do.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No sale with this id exists for the current farm
    #[error("Sale not found: {id}")]
    SaleNotFound {
        /// Requested sale id
        id: i64,
    },

    /// No partner with this id exists for the current farm
    #[error("Partner not found: {id}")]
    PartnerNotFound {
        /// Requested partner id
        id: i64,
    },

    /// A monetary amount was negative
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Offending amount
        amount: i64,
    },

    /// A quantity was zero or negative
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// Offending quantity
        quantity: i64,
    },

    /// A group settlement named no grade with a positive quantity
    #[error("Nothing to settle for partner {partner_id} on {day}")]
    EmptySettlement {
        /// Partner of the group
        partner_id: i64,
        /// Delivery day of the group
        day: chrono::NaiveDate,
    },

    /// A month selector was not of the form `YYYY-MM`
    #[error("Invalid month: {value}")]
    InvalidMonth {
        /// Offending input
        value: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
