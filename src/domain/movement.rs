use crate::domain::account::{AccountId, Amount, Balance};
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a movement record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MovementId(pub u64);

impl fmt::Display for MovementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of money movement. A closed sum type: new kinds are a
/// compile-time decision, never a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementKind {
    Deposit,
    Withdrawal,
    Transfer { counterparty: AccountId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementStatus {
    Pending,
    Completed,
    Failed,
}

/// A single deposit, withdrawal, or transfer attempt and its terminal outcome.
///
/// Status only ever moves Pending -> Completed or Pending -> Failed; a
/// terminal movement is immutable and never deleted (audit trail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub account: AccountId,
    pub kind: MovementKind,
    pub amount: Amount,
    pub status: MovementStatus,
    /// Opaque unique token generated at creation, letting a caller recognize
    /// a retried request as one it already issued.
    pub reference: String,
    pub description: String,
    /// The rejecting reason, kept for audit when the movement failed.
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    pub fn new(
        id: MovementId,
        account: AccountId,
        kind: MovementKind,
        amount: Amount,
        reference: String,
        description: String,
    ) -> Self {
        Self {
            id,
            account,
            kind,
            amount,
            status: MovementStatus::Pending,
            reference,
            description,
            failure: None,
            created_at: Utc::now(),
        }
    }

    /// Transitions Pending -> Completed. A no-op on a terminal record.
    pub fn complete(&mut self) {
        if self.status == MovementStatus::Pending {
            self.status = MovementStatus::Completed;
        }
    }

    /// Transitions Pending -> Failed, keeping the rejecting reason.
    pub fn fail(&mut self, cause: &LedgerError) {
        if self.status == MovementStatus::Pending {
            self.status = MovementStatus::Failed;
            self.failure = Some(cause.to_string());
        }
    }

    /// Whether this movement shows up in the given account's history, either
    /// as the owning account or as the transfer counterparty.
    pub fn involves(&self, account: AccountId) -> bool {
        self.account == account
            || matches!(self.kind, MovementKind::Transfer { counterparty } if counterparty == account)
    }
}

/// Outcome of a settled movement: the terminal record plus the owning
/// account's resulting balance.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementResult {
    pub movement: Movement,
    pub balance: Balance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn movement(kind: MovementKind) -> Movement {
        Movement::new(
            MovementId(1),
            AccountId(1),
            kind,
            Amount::new(dec!(10.0)).unwrap(),
            "ref-1".into(),
            "test".into(),
        )
    }

    #[test]
    fn test_status_transitions_are_one_way() {
        let mut m = movement(MovementKind::Deposit);
        assert_eq!(m.status, MovementStatus::Pending);

        m.complete();
        assert_eq!(m.status, MovementStatus::Completed);

        // A terminal movement never moves backward.
        m.fail(&LedgerError::SelfTransferNotAllowed);
        assert_eq!(m.status, MovementStatus::Completed);
        assert!(m.failure.is_none());
    }

    #[test]
    fn test_failed_movement_keeps_cause() {
        let mut m = movement(MovementKind::Withdrawal);
        m.fail(&LedgerError::InsufficientFunds {
            available: dec!(1.0),
            required: dec!(10.0),
        });
        assert_eq!(m.status, MovementStatus::Failed);
        assert!(m.failure.as_deref().unwrap().contains("insufficient funds"));

        m.complete();
        assert_eq!(m.status, MovementStatus::Failed);
    }

    #[test]
    fn test_transfer_involves_both_parties() {
        let m = movement(MovementKind::Transfer {
            counterparty: AccountId(2),
        });
        assert!(m.involves(AccountId(1)));
        assert!(m.involves(AccountId(2)));
        assert!(!m.involves(AccountId(3)));
    }
}
