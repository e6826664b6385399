use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Unique identifier of an account, assigned at account opening.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a monetary value with fixed-point decimal precision.
///
/// This is a wrapper around `rust_decimal::Decimal` so that money never goes
/// through binary floats anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount for movements and payments.
///
/// Constructing one from a zero or negative value fails with `InvalidAmount`,
/// before any record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// The state of a customer account.
///
/// Balance changes only through `AccountStore`, which holds the exclusive
/// per-account lock for the duration of every check-then-mutate sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Balance,
    pub active: bool,
}

impl Account {
    pub fn new(id: AccountId, opening_balance: Balance) -> Self {
        Self {
            id,
            balance: opening_balance,
            active: true,
        }
    }

    /// Applies a signed delta to the balance.
    ///
    /// Rejects deltas on an inactive account and negative deltas that would
    /// drive the balance below zero; on rejection the balance is unchanged.
    pub fn apply_delta(&mut self, delta: Decimal) -> Result<Balance, LedgerError> {
        if !self.active {
            return Err(LedgerError::AccountInactive(self.id));
        }
        if delta < Decimal::ZERO && self.balance.value() + delta < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds {
                available: self.balance.value(),
                required: -delta,
            });
        }
        self.balance += Balance::new(delta);
        Ok(self.balance)
    }
}
