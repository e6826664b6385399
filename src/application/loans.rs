use crate::application::accounts::AccountStore;
use crate::domain::account::{AccountId, Amount, Balance};
use crate::domain::loan::{Loan, LoanId, LoanPayment, LoanStatus};
use crate::domain::ports::{LoanStore, LoanStoreRef};
use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Owns loan principal, rate, duration, and status, and the amortization
/// performed once at creation.
pub struct LoanBook {
    accounts: AccountStore,
    store: LoanStoreRef,
}

impl LoanBook {
    pub fn new(accounts: AccountStore, store: LoanStoreRef) -> Self {
        Self { accounts, store }
    }

    /// Opens a loan application in Pending status with its installment
    /// already computed and persisted.
    pub async fn create_loan(
        &self,
        account: AccountId,
        principal: Amount,
        annual_rate_percent: Decimal,
        duration_months: u32,
        due_date: NaiveDate,
    ) -> Result<Loan> {
        {
            let guard = self.accounts.lock(account).await?;
            if !guard.active {
                return Err(LedgerError::AccountInactive(account));
            }
        }
        let id = self.store.next_loan_id().await?;
        let loan = Loan::new(
            id,
            account,
            principal,
            annual_rate_percent,
            duration_months,
            due_date,
        )?;
        self.store.store_loan(loan.clone()).await?;
        Ok(loan)
    }

    pub async fn approve(&self, id: LoanId) -> Result<Loan> {
        let mut loan = self.loan(id).await?;
        loan.approve()?;
        self.store.store_loan(loan.clone()).await?;
        Ok(loan)
    }

    pub async fn reject(&self, id: LoanId) -> Result<Loan> {
        let mut loan = self.loan(id).await?;
        loan.reject()?;
        self.store.store_loan(loan.clone()).await?;
        Ok(loan)
    }

    pub async fn loan(&self, id: LoanId) -> Result<Loan> {
        self.store
            .get_loan(id)
            .await?
            .ok_or(LedgerError::LoanNotFound(id))
    }

    pub async fn payments(&self, id: LoanId) -> Result<Vec<LoanPayment>> {
        self.store.payments(id).await
    }

    pub async fn loans_for_account(&self, account: AccountId) -> Result<Vec<Loan>> {
        self.store.loans_for_account(account).await
    }
}

/// What a settled payment did: the immutable record plus the state it left
/// the loan and account in.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub payment: LoanPayment,
    pub account: AccountId,
    /// Amount actually applied; a requested overpayment is silently capped
    /// and the cap reported back here.
    pub applied: Decimal,
    pub late_fee: Decimal,
    pub new_due_date: NaiveDate,
    pub loan_status: LoanStatus,
    pub balance: Balance,
}

/// Applies a loan payment as one atomic unit: late fee, overpayment cap,
/// balance check, debit, payment record, due-date roll, payoff transition.
///
/// Concurrent payments against the same loan serialize on the owning
/// account's lock; the loan and its payment history are re-read only after
/// that lock is held.
pub struct PaymentProcessor {
    accounts: AccountStore,
    store: LoanStoreRef,
    late_fee_per_day: Decimal,
}

impl PaymentProcessor {
    pub fn new(accounts: AccountStore, store: LoanStoreRef, late_fee_per_day: Decimal) -> Self {
        Self {
            accounts,
            store,
            late_fee_per_day,
        }
    }

    pub async fn apply_payment(
        &self,
        loan_id: LoanId,
        requested: Amount,
        today: NaiveDate,
    ) -> Result<PaymentOutcome> {
        let owning_account = self
            .store
            .get_loan(loan_id)
            .await?
            .ok_or(LedgerError::LoanNotFound(loan_id))?
            .account;

        let mut guard = self.accounts.lock(owning_account).await?;
        if !guard.active {
            return Err(LedgerError::AccountInactive(owning_account));
        }

        // Fresh reads now that the account lock serializes us against any
        // concurrent payment on this loan.
        let mut loan = self
            .store
            .get_loan(loan_id)
            .await?
            .ok_or(LedgerError::LoanNotFound(loan_id))?;
        match loan.status {
            LoanStatus::Active => {}
            LoanStatus::Repaid => return Err(LedgerError::LoanAlreadyRepaid(loan_id)),
            LoanStatus::Pending | LoanStatus::Rejected => {
                return Err(LedgerError::LoanNotActive(loan_id));
            }
        }

        let late_days = (today - loan.due_date).num_days().max(0);
        let late_fee = Decimal::from(late_days) * self.late_fee_per_day;

        let prior: Decimal = self
            .store
            .payments(loan_id)
            .await?
            .iter()
            .map(LoanPayment::total)
            .sum();
        let remaining = loan.total_due() - prior;
        if remaining <= Decimal::ZERO {
            return Err(LedgerError::LoanAlreadyRepaid(loan_id));
        }

        // Never accept an overpayment: cap at what is still owed after the
        // late fee has claimed its share.
        let applied = requested.value().min(remaining - late_fee);
        if applied <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "late fee {late_fee} exceeds the remaining balance {remaining}"
            )));
        }

        // Roll the due date before touching money: a refused roll rejects
        // the payment while balance and payment history are still intact.
        loan.advance_due_date()?;

        // Check-and-debit under the held lock; a rejection here has touched
        // no state at all.
        let required = applied + late_fee;
        let balance = guard.apply_delta(-required)?;

        let payment = LoanPayment {
            id: self.store.next_payment_id().await?,
            loan: loan_id,
            amount: applied,
            late_fee,
            paid_on: today,
        };
        if let Err(cause) = self.store.store_payment(payment.clone()).await {
            guard.balance += Balance::new(required);
            return Err(cause);
        }

        if prior + applied + late_fee >= loan.total_due() {
            loan.status = LoanStatus::Repaid;
        }
        self.store.store_loan(loan.clone()).await?;

        Ok(PaymentOutcome {
            payment,
            account: owning_account,
            applied,
            late_fee,
            new_due_date: loan.due_date,
            loan_status: loan.status,
            balance,
        })
    }
}
