use crate::application::accounts::AccountStore;
use crate::domain::account::{AccountId, Amount, Balance};
use crate::domain::movement::{Movement, MovementId, MovementKind, MovementResult};
use crate::domain::ports::{MovementStore, MovementStoreRef, ReferenceSource, ReferenceSourceRef};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;

/// Records deposit and withdrawal attempts and settles them against the
/// account store, one atomic unit per movement.
///
/// Also owns the read side of the combined movement history: a single record
/// type queried per account, instead of per-kind tables merged after the fact.
pub struct MovementLedger {
    accounts: AccountStore,
    store: MovementStoreRef,
    references: ReferenceSourceRef,
}

impl MovementLedger {
    pub fn new(
        accounts: AccountStore,
        store: MovementStoreRef,
        references: ReferenceSourceRef,
    ) -> Self {
        Self {
            accounts,
            store,
            references,
        }
    }

    pub async fn deposit(
        &self,
        account: AccountId,
        amount: Amount,
        description: &str,
    ) -> Result<MovementResult> {
        self.settle(account, MovementKind::Deposit, amount, description)
            .await
    }

    pub async fn withdraw(
        &self,
        account: AccountId,
        amount: Amount,
        description: &str,
    ) -> Result<MovementResult> {
        self.settle(account, MovementKind::Withdrawal, amount, description)
            .await
    }

    /// Creates the Pending record, applies the signed delta under the
    /// account lock, and transitions the record to its terminal status.
    /// On rejection the record is marked Failed with the cause preserved and
    /// the original error is propagated.
    async fn settle(
        &self,
        account: AccountId,
        kind: MovementKind,
        amount: Amount,
        description: &str,
    ) -> Result<MovementResult> {
        let delta = match kind {
            MovementKind::Deposit => amount.value(),
            MovementKind::Withdrawal => -amount.value(),
            MovementKind::Transfer { .. } => {
                return Err(LedgerError::Internal(
                    "transfers settle through the transfer processor".into(),
                ));
            }
        };

        let id = self.store.next_id().await?;
        let mut movement = Movement::new(
            id,
            account,
            kind,
            amount,
            self.references.next_reference(),
            description.to_string(),
        );
        self.store.store(movement.clone()).await?;

        match self.apply(account, delta).await {
            Ok(balance) => {
                movement.complete();
                self.store.store(movement.clone()).await?;
                Ok(MovementResult { movement, balance })
            }
            Err(cause) => {
                movement.fail(&cause);
                self.store.store(movement).await?;
                Err(cause)
            }
        }
    }

    async fn apply(&self, account: AccountId, delta: Decimal) -> Result<Balance> {
        let mut guard = self.accounts.lock(account).await?;
        guard.apply_delta(delta)
    }

    pub async fn movement(&self, id: MovementId) -> Result<Option<Movement>> {
        self.store.get(id).await
    }

    /// Reconciliation path for a caller whose request timed out: the outcome
    /// recorded under a reference never changes once terminal.
    pub async fn movement_by_reference(&self, reference: &str) -> Result<Option<Movement>> {
        self.store.get_by_reference(reference).await
    }

    /// Combined history across deposits, withdrawals, and transfers in which
    /// the account appears on either side, newest first.
    pub async fn history(&self, account: AccountId) -> Result<Vec<Movement>> {
        self.store.for_account(account).await
    }
}
