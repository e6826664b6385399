use crate::application::accounts::AccountStore;
use crate::application::loans::{LoanBook, PaymentOutcome, PaymentProcessor};
use crate::application::movements::MovementLedger;
use crate::application::transfer::TransferProcessor;
use crate::domain::account::{Account, AccountId, Amount, Balance};
use crate::domain::loan::{Loan, LoanId, LoanPayment};
use crate::domain::movement::{Movement, MovementResult};
use crate::domain::ports::{
    LoanStoreRef, MovementStoreRef, NotificationEvent, NotificationSink, NotificationSinkRef,
    ReferenceSourceRef,
};
use crate::error::Result;
use crate::infrastructure::in_memory::{InMemoryLoanStore, InMemoryMovementStore};
use crate::infrastructure::notify::NullSink;
use crate::infrastructure::references::UuidReferenceSource;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Process-scoped policy knobs, injected at construction instead of living
/// in ambient globals.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Upper bound on waiting for an account lock before the operation
    /// fails with `ConcurrencyConflict`.
    pub lock_timeout: Duration,
    /// Flat fee charged per day a loan payment arrives past its due date.
    pub late_fee_per_day: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            late_fee_per_day: dec!(5.00),
        }
    }
}

/// The entry point callers (a routing layer, a CLI) drive the core through.
///
/// Wires the account store, movement ledger, transfer processor, loan book,
/// and payment processor together, and fires notification events after each
/// successful commit without ever blocking on their delivery.
pub struct LedgerEngine {
    accounts: AccountStore,
    movements: MovementLedger,
    transfers: TransferProcessor,
    loans: LoanBook,
    payments: PaymentProcessor,
    sink: NotificationSinkRef,
}

impl LedgerEngine {
    pub fn new(
        config: LedgerConfig,
        movement_store: MovementStoreRef,
        loan_store: LoanStoreRef,
        references: ReferenceSourceRef,
        sink: NotificationSinkRef,
    ) -> Self {
        let accounts = AccountStore::new(config.lock_timeout);
        Self {
            movements: MovementLedger::new(
                accounts.clone(),
                movement_store.clone(),
                references.clone(),
            ),
            transfers: TransferProcessor::new(accounts.clone(), movement_store, references),
            loans: LoanBook::new(accounts.clone(), loan_store.clone()),
            payments: PaymentProcessor::new(
                accounts.clone(),
                loan_store,
                config.late_fee_per_day,
            ),
            accounts,
            sink,
        }
    }

    /// An engine backed entirely by in-memory stores, with notifications
    /// discarded. What the demo CLI and most tests run on.
    pub fn in_memory(config: LedgerConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryMovementStore::new()),
            Arc::new(InMemoryLoanStore::new()),
            Arc::new(UuidReferenceSource),
            Arc::new(NullSink),
        )
    }

    pub async fn open_account(&self, opening_balance: Decimal) -> Result<AccountId> {
        let id = self.accounts.open(Balance::new(opening_balance)).await?;
        info!(account = %id, balance = %opening_balance, "account opened");
        Ok(id)
    }

    pub async fn set_active(&self, account: AccountId, active: bool) -> Result<()> {
        self.accounts.set_active(account, active).await?;
        info!(account = %account, active, "account active flag changed");
        Ok(())
    }

    pub async fn balance(&self, account: AccountId) -> Result<Balance> {
        self.accounts.balance(account).await
    }

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.accounts.snapshot().await
    }

    pub async fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<MovementResult> {
        let amount = Amount::new(amount)?;
        match self.movements.deposit(account, amount, description).await {
            Ok(result) => {
                info!(
                    account = %account,
                    amount = %amount.value(),
                    reference = %result.movement.reference,
                    "deposit completed"
                );
                self.sink.notify(NotificationEvent {
                    kind: "deposit_completed",
                    target: Some(account),
                    payload: json!({
                        "movement_id": result.movement.id.0,
                        "amount": amount.value().to_string(),
                        "balance": result.balance.to_string(),
                        "reference": result.movement.reference,
                    }),
                });
                Ok(result)
            }
            Err(cause) => {
                warn!(account = %account, amount = %amount.value(), %cause, "deposit rejected");
                Err(cause)
            }
        }
    }

    pub async fn withdraw(
        &self,
        account: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<MovementResult> {
        let amount = Amount::new(amount)?;
        match self.movements.withdraw(account, amount, description).await {
            Ok(result) => {
                info!(
                    account = %account,
                    amount = %amount.value(),
                    reference = %result.movement.reference,
                    "withdrawal completed"
                );
                self.sink.notify(NotificationEvent {
                    kind: "withdrawal_completed",
                    target: Some(account),
                    payload: json!({
                        "movement_id": result.movement.id.0,
                        "amount": amount.value().to_string(),
                        "balance": result.balance.to_string(),
                        "reference": result.movement.reference,
                    }),
                });
                Ok(result)
            }
            Err(cause) => {
                warn!(account = %account, amount = %amount.value(), %cause, "withdrawal rejected");
                Err(cause)
            }
        }
    }

    pub async fn transfer(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<MovementResult> {
        let amount = Amount::new(amount)?;
        match self
            .transfers
            .transfer(sender, receiver, amount, description)
            .await
        {
            Ok(result) => {
                info!(
                    sender = %sender,
                    receiver = %receiver,
                    amount = %amount.value(),
                    reference = %result.movement.reference,
                    "transfer completed"
                );
                self.sink.notify(NotificationEvent {
                    kind: "money_sent",
                    target: Some(sender),
                    payload: json!({
                        "movement_id": result.movement.id.0,
                        "amount": amount.value().to_string(),
                        "receiver": receiver.0,
                        "balance": result.balance.to_string(),
                        "reference": result.movement.reference,
                    }),
                });
                self.sink.notify(NotificationEvent {
                    kind: "money_received",
                    target: Some(receiver),
                    payload: json!({
                        "movement_id": result.movement.id.0,
                        "amount": amount.value().to_string(),
                        "sender": sender.0,
                        "reference": result.movement.reference,
                    }),
                });
                Ok(result)
            }
            Err(cause) => {
                warn!(sender = %sender, receiver = %receiver, %cause, "transfer rejected");
                Err(cause)
            }
        }
    }

    pub async fn create_loan(
        &self,
        account: AccountId,
        principal: Decimal,
        annual_rate_percent: Decimal,
        duration_months: u32,
        due_date: NaiveDate,
    ) -> Result<Loan> {
        let principal = Amount::new(principal)?;
        let loan = self
            .loans
            .create_loan(
                account,
                principal,
                annual_rate_percent,
                duration_months,
                due_date,
            )
            .await?;
        info!(
            loan = %loan.id,
            account = %account,
            installment = %loan.installment,
            "loan application submitted"
        );
        Ok(loan)
    }

    pub async fn approve_loan(&self, id: LoanId) -> Result<Loan> {
        let loan = self.loans.approve(id).await?;
        info!(loan = %id, "loan approved");
        Ok(loan)
    }

    pub async fn reject_loan(&self, id: LoanId) -> Result<Loan> {
        let loan = self.loans.reject(id).await?;
        info!(loan = %id, "loan rejected");
        Ok(loan)
    }

    /// Applies a loan payment dated today.
    pub async fn apply_loan_payment(
        &self,
        loan: LoanId,
        amount: Decimal,
    ) -> Result<PaymentOutcome> {
        self.apply_loan_payment_on(loan, amount, Utc::now().date_naive())
            .await
    }

    /// Applies a loan payment with an explicit payment date.
    pub async fn apply_loan_payment_on(
        &self,
        loan: LoanId,
        amount: Decimal,
        today: NaiveDate,
    ) -> Result<PaymentOutcome> {
        let amount = Amount::new(amount)?;
        match self.payments.apply_payment(loan, amount, today).await {
            Ok(outcome) => {
                info!(
                    loan = %loan,
                    applied = %outcome.applied,
                    late_fee = %outcome.late_fee,
                    status = ?outcome.loan_status,
                    "loan payment recorded"
                );
                self.sink.notify(NotificationEvent {
                    kind: "loan_payment_recorded",
                    target: Some(outcome.account),
                    payload: json!({
                        "loan_id": loan.0,
                        "applied": outcome.applied.to_string(),
                        "late_fee": outcome.late_fee.to_string(),
                        "balance": outcome.balance.to_string(),
                        "loan_status": format!("{:?}", outcome.loan_status),
                    }),
                });
                Ok(outcome)
            }
            Err(cause) => {
                warn!(loan = %loan, amount = %amount.value(), %cause, "loan payment rejected");
                Err(cause)
            }
        }
    }

    pub async fn loan(&self, id: LoanId) -> Result<Loan> {
        self.loans.loan(id).await
    }

    pub async fn loan_payments(&self, id: LoanId) -> Result<Vec<LoanPayment>> {
        self.loans.payments(id).await
    }

    pub async fn loans_for_account(&self, account: AccountId) -> Result<Vec<Loan>> {
        self.loans.loans_for_account(account).await
    }

    pub async fn history(&self, account: AccountId) -> Result<Vec<Movement>> {
        self.movements.history(account).await
    }

    pub async fn movement_by_reference(&self, reference: &str) -> Result<Option<Movement>> {
        self.movements.movement_by_reference(reference).await
    }
}
