use super::account::AccountId;
use super::loan::{Loan, LoanId, LoanPayment, PaymentId};
use super::movement::{Movement, MovementId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Append-mostly storage for movement records. Movements need no
/// cross-operation locking beyond the atomic unit they are created in.
#[async_trait]
pub trait MovementStore: Send + Sync {
    async fn store(&self, movement: Movement) -> Result<()>;
    async fn get(&self, id: MovementId) -> Result<Option<Movement>>;
    /// Lookup by idempotency reference, the reconciliation path for callers
    /// whose request timed out with the outcome unknown.
    async fn get_by_reference(&self, reference: &str) -> Result<Option<Movement>>;
    /// Combined history for one account across every movement kind,
    /// newest first.
    async fn for_account(&self, account: AccountId) -> Result<Vec<Movement>>;
    async fn next_id(&self) -> Result<MovementId>;
}

/// Storage for loans and their append-only payment records.
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn store_loan(&self, loan: Loan) -> Result<()>;
    async fn get_loan(&self, id: LoanId) -> Result<Option<Loan>>;
    async fn loans_for_account(&self, account: AccountId) -> Result<Vec<Loan>>;
    async fn store_payment(&self, payment: LoanPayment) -> Result<()>;
    async fn payments(&self, loan: LoanId) -> Result<Vec<LoanPayment>>;
    async fn next_loan_id(&self) -> Result<LoanId>;
    async fn next_payment_id(&self) -> Result<PaymentId>;
}

/// Source of collision-resistant idempotency references.
pub trait ReferenceSource: Send + Sync {
    fn next_reference(&self) -> String;
}

/// An event emitted after a successful commit.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: &'static str,
    /// `None` broadcasts to all listeners.
    pub target: Option<AccountId>,
    pub payload: serde_json::Value,
}

/// Fire-and-forget notification delivery, invoked only after a commit.
/// The core never blocks on delivery succeeding.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: NotificationEvent);
}

pub type MovementStoreRef = Arc<dyn MovementStore>;
pub type LoanStoreRef = Arc<dyn LoanStore>;
pub type ReferenceSourceRef = Arc<dyn ReferenceSource>;
pub type NotificationSinkRef = Arc<dyn NotificationSink>;
