use crate::domain::account::{Account, AccountId, Balance};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// The sole owner of account balances and active flags.
///
/// Every account sits behind its own `tokio::sync::Mutex`; that row-level
/// lock is the only blocking point in the core. Operations on disjoint
/// accounts never contend, operations on the same account serialize, and
/// `lock_pair` always acquires in ascending id order so opposite-direction
/// transfers between the same pair cannot deadlock.
#[derive(Clone)]
pub struct AccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, Arc<Mutex<Account>>>>>,
    next_id: Arc<AtomicU64>,
    lock_timeout: Duration,
}

impl AccountStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            lock_timeout,
        }
    }

    /// Opens a new account with the given opening balance and returns its id.
    pub async fn open(&self, opening_balance: Balance) -> Result<AccountId> {
        if opening_balance.value() < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "opening balance must not be negative, got {opening_balance}"
            )));
        }
        let id = AccountId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut accounts = self.accounts.write().await;
        accounts.insert(id, Arc::new(Mutex::new(Account::new(id, opening_balance))));
        Ok(id)
    }

    /// Acquires the exclusive lock on one account, bounded by the configured
    /// timeout. The caller holds the guard for the whole check-then-mutate
    /// sequence of its atomic unit.
    pub async fn lock(&self, id: AccountId) -> Result<OwnedMutexGuard<Account>> {
        let cell = {
            let accounts = self.accounts.read().await;
            accounts
                .get(&id)
                .cloned()
                .ok_or(LedgerError::AccountNotFound(id))?
        };
        tokio::time::timeout(self.lock_timeout, cell.lock_owned())
            .await
            .map_err(|_| LedgerError::ConcurrencyConflict(id))
    }

    /// Locks two distinct accounts, acquiring in ascending id order
    /// regardless of which is sender or receiver, and returns the guards in
    /// the order they were asked for.
    pub async fn lock_pair(
        &self,
        first: AccountId,
        second: AccountId,
    ) -> Result<(OwnedMutexGuard<Account>, OwnedMutexGuard<Account>)> {
        debug_assert_ne!(first, second, "lock_pair requires distinct accounts");
        if first < second {
            let a = self.lock(first).await?;
            let b = self.lock(second).await?;
            Ok((a, b))
        } else {
            let b = self.lock(second).await?;
            let a = self.lock(first).await?;
            Ok((a, b))
        }
    }

    /// Applies a signed delta to an account under its exclusive lock.
    ///
    /// No implicit retry: the caller decides whether to retry or fail the
    /// whole movement.
    pub async fn apply_delta(&self, id: AccountId, delta: Decimal) -> Result<Balance> {
        let mut guard = self.lock(id).await?;
        guard.apply_delta(delta)
    }

    pub async fn balance(&self, id: AccountId) -> Result<Balance> {
        Ok(self.lock(id).await?.balance)
    }

    /// Flips the active flag. Inactive accounts reject every movement and
    /// payment until reactivated.
    pub async fn set_active(&self, id: AccountId, active: bool) -> Result<()> {
        let mut guard = self.lock(id).await?;
        guard.active = active;
        Ok(())
    }

    /// A point-in-time copy of every account, ordered by id.
    ///
    /// Each row is read through the bounded `lock()` path, so a stuck guard
    /// holder fails the snapshot with `ConcurrencyConflict` instead of
    /// stalling it.
    pub async fn snapshot(&self) -> Result<Vec<Account>> {
        let ids: Vec<AccountId> = {
            let accounts = self.accounts.read().await;
            accounts.keys().copied().collect()
        };
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.lock(id).await?.clone());
        }
        out.sort_by_key(|a| a.id);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn store() -> AccountStore {
        AccountStore::new(Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_open_and_apply_delta() {
        let store = store();
        let id = store.open(Balance::new(dec!(100.00))).await.unwrap();

        let balance = store.apply_delta(id, dec!(-30.25)).await.unwrap();
        assert_eq!(balance, Balance::new(dec!(69.75)));
        assert_eq!(store.balance(id).await.unwrap(), Balance::new(dec!(69.75)));
    }

    #[tokio::test]
    async fn test_negative_opening_balance_rejected() {
        let store = store();
        assert!(matches!(
            store.open(Balance::new(dec!(-1))).await,
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let store = store();
        assert!(matches!(
            store.apply_delta(AccountId(42), dec!(1)).await,
            Err(LedgerError::AccountNotFound(AccountId(42)))
        ));
    }

    #[tokio::test]
    async fn test_inactive_account_rejects_deltas() {
        let store = store();
        let id = store.open(Balance::new(dec!(10))).await.unwrap();
        store.set_active(id, false).await.unwrap();

        assert!(matches!(
            store.apply_delta(id, dec!(1)).await,
            Err(LedgerError::AccountInactive(_))
        ));

        store.set_active(id, true).await.unwrap();
        store.apply_delta(id, dec!(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_overdraw_leaves_balance_unchanged() {
        let store = store();
        let id = store.open(Balance::new(dec!(10))).await.unwrap();

        let result = store.apply_delta(id, dec!(-11)).await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(store.balance(id).await.unwrap(), Balance::new(dec!(10)));
    }

    #[tokio::test]
    async fn test_lock_pair_acquires_in_id_order() {
        let store = store();
        let a = store.open(Balance::ZERO).await.unwrap();
        let b = store.open(Balance::ZERO).await.unwrap();

        // Guards come back in the requested order even when acquisition
        // order differs.
        let (ga, gb) = store.lock_pair(b, a).await.unwrap();
        assert_eq!(ga.id, b);
        assert_eq!(gb.id, a);
    }

    #[tokio::test]
    async fn test_snapshot_respects_the_lock_timeout() {
        let store = AccountStore::new(Duration::from_millis(20));
        let id = store.open(Balance::ZERO).await.unwrap();

        let _held = store.lock(id).await.unwrap();
        assert!(matches!(
            store.snapshot().await,
            Err(LedgerError::ConcurrencyConflict(_))
        ));
    }

    #[tokio::test]
    async fn test_lock_timeout_is_a_concurrency_conflict() {
        let store = AccountStore::new(Duration::from_millis(20));
        let id = store.open(Balance::ZERO).await.unwrap();

        let _held = store.lock(id).await.unwrap();
        assert!(matches!(
            store.lock(id).await,
            Err(LedgerError::ConcurrencyConflict(_))
        ));
    }
}
