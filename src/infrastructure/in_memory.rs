use crate::domain::account::AccountId;
use crate::domain::loan::{Loan, LoanId, LoanPayment, PaymentId};
use crate::domain::movement::{Movement, MovementId};
use crate::domain::ports::{LoanStore, MovementStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory movement store.
///
/// Uses `Arc<RwLock<HashMap<..>>>` for shared concurrent access; record
/// identifiers come from an atomic counter, standing in for a database
/// autoincrement.
#[derive(Default, Clone)]
pub struct InMemoryMovementStore {
    movements: Arc<RwLock<HashMap<MovementId, Movement>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovementStore for InMemoryMovementStore {
    async fn store(&self, movement: Movement) -> Result<()> {
        let mut movements = self.movements.write().await;
        movements.insert(movement.id, movement);
        Ok(())
    }

    async fn get(&self, id: MovementId) -> Result<Option<Movement>> {
        let movements = self.movements.read().await;
        Ok(movements.get(&id).cloned())
    }

    async fn get_by_reference(&self, reference: &str) -> Result<Option<Movement>> {
        let movements = self.movements.read().await;
        Ok(movements.values().find(|m| m.reference == reference).cloned())
    }

    async fn for_account(&self, account: AccountId) -> Result<Vec<Movement>> {
        let movements = self.movements.read().await;
        let mut out: Vec<Movement> = movements
            .values()
            .filter(|m| m.involves(account))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    async fn next_id(&self) -> Result<MovementId> {
        Ok(MovementId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1))
    }
}

/// A thread-safe in-memory store for loans and their payment history.
#[derive(Default, Clone)]
pub struct InMemoryLoanStore {
    loans: Arc<RwLock<HashMap<LoanId, Loan>>>,
    payments: Arc<RwLock<HashMap<LoanId, Vec<LoanPayment>>>>,
    next_loan_id: Arc<AtomicU64>,
    next_payment_id: Arc<AtomicU64>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn store_loan(&self, loan: Loan) -> Result<()> {
        let mut loans = self.loans.write().await;
        loans.insert(loan.id, loan);
        Ok(())
    }

    async fn get_loan(&self, id: LoanId) -> Result<Option<Loan>> {
        let loans = self.loans.read().await;
        Ok(loans.get(&id).cloned())
    }

    async fn loans_for_account(&self, account: AccountId) -> Result<Vec<Loan>> {
        let loans = self.loans.read().await;
        let mut out: Vec<Loan> = loans
            .values()
            .filter(|l| l.account == account)
            .cloned()
            .collect();
        out.sort_by_key(|l| l.id);
        Ok(out)
    }

    async fn store_payment(&self, payment: LoanPayment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.entry(payment.loan).or_default().push(payment);
        Ok(())
    }

    async fn payments(&self, loan: LoanId) -> Result<Vec<LoanPayment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&loan).cloned().unwrap_or_default())
    }

    async fn next_loan_id(&self) -> Result<LoanId> {
        Ok(LoanId(self.next_loan_id.fetch_add(1, Ordering::Relaxed) + 1))
    }

    async fn next_payment_id(&self) -> Result<PaymentId> {
        Ok(PaymentId(
            self.next_payment_id.fetch_add(1, Ordering::Relaxed) + 1,
        ))
    }
}
