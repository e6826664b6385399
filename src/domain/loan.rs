use crate::domain::account::{AccountId, Amount};
use crate::error::LedgerError;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PaymentId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Pending,
    Active,
    Rejected,
    Repaid,
}

/// Computes the fixed monthly installment with the standard annuity formula:
/// `P * r * (1+r)^n / ((1+r)^n - 1)` where `r` is the monthly rate.
///
/// The result is rounded to 4 decimal places, matching the precision the
/// installment is persisted with. Computed once at loan creation and never
/// recomputed, so schedules stay stable even if rate tables change.
pub fn monthly_installment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    duration_months: u32,
) -> Result<Decimal, LedgerError> {
    if duration_months == 0 {
        return Err(LedgerError::InvalidAmount(
            "loan duration must be at least one month".into(),
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "interest rate must not be negative, got {annual_rate_percent}"
        )));
    }

    let monthly_rate = annual_rate_percent / Decimal::from(100) / Decimal::from(12);
    if monthly_rate.is_zero() {
        return Ok((principal / Decimal::from(duration_months)).round_dp(4));
    }

    let overflow = || {
        LedgerError::InvalidAmount(format!(
            "loan terms out of range: {duration_months} months at {annual_rate_percent}%"
        ))
    };

    let base = Decimal::ONE + monthly_rate;
    let mut compounded = Decimal::ONE;
    for _ in 0..duration_months {
        compounded = compounded.checked_mul(base).ok_or_else(overflow)?;
    }

    let numerator = principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(compounded))
        .ok_or_else(overflow)?;
    let installment = numerator / (compounded - Decimal::ONE);
    Ok(installment.round_dp(4))
}

/// A loan with its amortization terms.
///
/// The installment is a pure function of (principal, rate, duration),
/// persisted at creation. The due date rolls forward one calendar month on
/// each accepted payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub account: AccountId,
    pub principal: Amount,
    pub annual_rate_percent: Decimal,
    pub duration_months: u32,
    pub installment: Decimal,
    pub due_date: NaiveDate,
    pub status: LoanStatus,
}

impl Loan {
    pub fn new(
        id: LoanId,
        account: AccountId,
        principal: Amount,
        annual_rate_percent: Decimal,
        duration_months: u32,
        due_date: NaiveDate,
    ) -> Result<Self, LedgerError> {
        let installment =
            monthly_installment(principal.value(), annual_rate_percent, duration_months)?;
        Ok(Self {
            id,
            account,
            principal,
            annual_rate_percent,
            duration_months,
            installment,
            due_date,
            status: LoanStatus::Pending,
        })
    }

    /// Principal plus total interest over the loan's life.
    pub fn total_due(&self) -> Decimal {
        self.installment * Decimal::from(self.duration_months)
    }

    pub fn approve(&mut self) -> Result<(), LedgerError> {
        if self.status != LoanStatus::Pending {
            return Err(LedgerError::LoanNotPending(self.id));
        }
        self.status = LoanStatus::Active;
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), LedgerError> {
        if self.status != LoanStatus::Pending {
            return Err(LedgerError::LoanNotPending(self.id));
        }
        self.status = LoanStatus::Rejected;
        Ok(())
    }

    pub fn advance_due_date(&mut self) -> Result<(), LedgerError> {
        self.due_date = self
            .due_date
            .checked_add_months(Months::new(1))
            .ok_or_else(|| LedgerError::Internal("due date out of range".into()))?;
        Ok(())
    }
}

/// An accepted loan payment, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPayment {
    pub id: PaymentId,
    pub loan: LoanId,
    /// The amount actually applied, which may be less than requested when
    /// the request would overpay the loan.
    pub amount: Decimal,
    pub late_fee: Decimal,
    pub paid_on: NaiveDate,
}

impl LoanPayment {
    /// Amount plus late fee, the total debited from the account.
    pub fn total(&self) -> Decimal {
        self.amount + self.late_fee
    }
}
