use crate::application::accounts::AccountStore;
use crate::domain::account::{AccountId, Amount, Balance};
use crate::domain::movement::{Movement, MovementKind, MovementResult};
use crate::domain::ports::{MovementStore, MovementStoreRef, ReferenceSource, ReferenceSourceRef};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;

/// Coordinates two-account balance changes for transfer movements.
///
/// Locks are always acquired in ascending account-id order regardless of
/// sender/receiver role, so two transfers moving money in opposite directions
/// between the same pair of accounts cannot deadlock.
pub struct TransferProcessor {
    accounts: AccountStore,
    store: MovementStoreRef,
    references: ReferenceSourceRef,
}

impl TransferProcessor {
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

    /// Moves `amount` from `sender` to `receiver` as one atomic unit.
    ///
    /// Self-transfers are rejected before any lock is taken or record
    /// created. Every other rejection (unknown account, inactive account,
    /// insufficient funds) leaves a movement recorded as Failed with the
    /// rejecting reason. On success the returned balance is the sender's.
    pub async fn transfer(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        description: &str,
    ) -> Result<MovementResult> {
        if sender == receiver {
            return Err(LedgerError::SelfTransferNotAllowed);
        }

        let id = self.store.next_id().await?;
        let mut movement = Movement::new(
            id,
            sender,
            MovementKind::Transfer {
                counterparty: receiver,
            },
            amount,
            self.references.next_reference(),
            description.to_string(),
        );
        self.store.store(movement.clone()).await?;

        match self.settle(sender, receiver, amount.value()).await {
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

    /// Debits the sender and credits the receiver with both guards held.
    /// The credit cannot fail once the receiver's active flag has been
    /// checked, but if it ever does the debit is undone while the locks are
    /// still held, so no half-applied transfer is observable.
    async fn settle(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Decimal,
    ) -> Result<Balance> {
        let (mut from, mut to) = self.accounts.lock_pair(sender, receiver).await?;

        if !to.active {
            return Err(LedgerError::AccountInactive(receiver));
        }

        let sender_balance = from.apply_delta(-amount)?;
        if let Err(cause) = to.apply_delta(amount) {
            from.balance += Balance::new(amount);
            return Err(cause);
        }
        Ok(sender_balance)
    }
}
