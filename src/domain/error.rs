use rust_decimal::Decimal;

use crate::domain::AccountId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Amount should be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Insufficient funds to make transfer")]
    InsufficientFunds,

    #[error("Account pay in limit reached")]
    PayInLimitExceeded,

    #[error("Amount out of range for the account ledger")]
    Overflow,

    #[error("Account {0} not found")]
    NotFound(AccountId),

    #[error("Account {0} was modified by another operation")]
    Conflict(AccountId),

    #[error("Notification failed with: {0}")]
    Notification(String),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
