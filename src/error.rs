use crate::domain::account::AccountId;
use crate::domain::loan::LoanId;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Every way an operation on the ledger can be rejected.
///
/// All variants are recoverable by the caller. Nothing in the core retries
/// automatically: blind retry of a money movement is unsafe without
/// idempotency-key deduplication at the caller's edge.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },
    #[error("account {0} not found")]
    AccountNotFound(AccountId),
    #[error("account {0} is inactive")]
    AccountInactive(AccountId),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("loan {0} not found")]
    LoanNotFound(LoanId),
    #[error("loan {0} is not active")]
    LoanNotActive(LoanId),
    #[error("loan {0} is not pending approval")]
    LoanNotPending(LoanId),
    #[error("loan {0} is already fully paid")]
    LoanAlreadyRepaid(LoanId),
    #[error("cannot transfer to the same account")]
    SelfTransferNotAllowed,
    #[error("timed out waiting for lock on account {0}")]
    ConcurrencyConflict(AccountId),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("operation failed: {0}")]
    Internal(String),
}
