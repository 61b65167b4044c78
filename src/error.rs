use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("phone already registered")]
    PhoneRegistered,
    #[error("amount must be greater than zero")]
    AmountMustBePositive,
    #[error("account not found")]
    AccountNotFound,
    #[error("account not enough balance")]
    NotEnoughBalance,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("favorite not found")]
    FavoriteNotFound,
    #[error("invalid worker count: {0}")]
    InvalidWorkerCount(i64),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, WalletError>;
