//! Unified error types and result handling.

use thiserror::Error;

/// Every fallible operation in the crate returns this error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No account with this id
    #[error("Account not found: {id}")]
    AccountNotFound {
        /// Requested account id
        id: i64,
    },

    /// No location with this slug
    #[error("Location not found: {slug}")]
    LocationNotFound {
        /// Requested location slug
        slug: String,
    },

    /// Amounts moved through the ledger must be positive
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// A ledger transaction failed its balance check and was rolled back
    #[error(
        "Transaction {transaction_id} was invalid (entries {debit_entry_id} and {credit_entry_id})"
    )]
    UnbalancedTransaction {
        /// The rolled back transaction
        transaction_id: i64,
        /// Entry debiting the source account
        debit_entry_id: i64,
        /// Entry crediting the destination account
        credit_entry_id: i64,
    },

    /// User input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Human readable reason, shown to the user
        message: String,
    },

    /// An inbound webhook payload could not be understood
    #[error("Malformed inbound message: {message}")]
    MalformedMessage {
        /// What was wrong with the payload
        message: String,
    },

    /// The mail API answered with a non-success status
    #[error("Mail API rejected message with status {status}: {body}")]
    MailRejected {
        /// HTTP status returned by the API
        status: u16,
        /// Response body, for the log
        body: String,
    },

    /// Transport failure talking to the mail API
    #[error("Mail API error: {0}")]
    MailApi(#[from] reqwest::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
