mod common;

use bankledger::domain::account::Balance;
use bankledger::domain::loan::LoanStatus;
use bankledger::error::LedgerError;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_installment_is_stable_across_reads() {
    let engine = common::engine();
    let account = engine.open_account(dec!(0)).await.unwrap();

    let loan = engine
        .create_loan(account, dec!(12000), dec!(12), 12, date(2026, 10, 1))
        .await
        .unwrap();
    assert_eq!(loan.installment, dec!(1066.1855));

    for _ in 0..5 {
        let read = engine.loan(loan.id).await.unwrap();
        assert_eq!(read.installment, dec!(1066.1855));
    }
}

#[tokio::test]
async fn test_rejected_loan_never_accepts_payments() {
    let engine = common::engine();
    let account = engine.open_account(dec!(1000)).await.unwrap();

    let loan = engine
        .create_loan(account, dec!(500), dec!(10), 6, date(2026, 10, 1))
        .await
        .unwrap();
    engine.reject_loan(loan.id).await.unwrap();

    let err = engine
        .apply_loan_payment_on(loan.id, dec!(50), date(2026, 9, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::LoanNotActive(_)));

    // And a rejected loan cannot be approved afterwards.
    assert!(matches!(
        engine.approve_loan(loan.id).await,
        Err(LedgerError::LoanNotPending(_))
    ));
}

#[tokio::test]
async fn test_overpayment_capped_and_reported() {
    let engine = common::engine();
    let account = engine.open_account(dec!(5000)).await.unwrap();

    // 0% over 10 months: total due is exactly the 1000 principal.
    let loan = engine
        .create_loan(account, dec!(1000), dec!(0), 10, date(2026, 10, 1))
        .await
        .unwrap();
    engine.approve_loan(loan.id).await.unwrap();

    engine
        .apply_loan_payment_on(loan.id, dec!(900), date(2026, 9, 1))
        .await
        .unwrap();

    // Remaining 100.00, requesting 150.00: exactly 100.00 applies.
    let outcome = engine
        .apply_loan_payment_on(loan.id, dec!(150), date(2026, 9, 1))
        .await
        .unwrap();
    assert_eq!(outcome.applied, dec!(100.00));
    assert_eq!(outcome.loan_status, LoanStatus::Repaid);
    assert_eq!(
        engine.balance(account).await.unwrap(),
        Balance::new(dec!(4000.00))
    );
}

#[tokio::test]
async fn test_late_fee_is_included_in_required_balance() {
    let engine = common::engine();
    // Exactly enough for the payment but not the fee.
    let account = engine.open_account(dec!(100.00)).await.unwrap();

    let loan = engine
        .create_loan(account, dec!(1000), dec!(0), 10, date(2026, 9, 1))
        .await
        .unwrap();
    engine.approve_loan(loan.id).await.unwrap();

    // Two days late at the default 5.00/day: requires 110.00.
    let err = engine
        .apply_loan_payment_on(loan.id, dec!(100), date(2026, 9, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    assert_eq!(
        engine.balance(account).await.unwrap(),
        Balance::new(dec!(100.00))
    );
    assert!(engine.loan_payments(loan.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_due_date_rolls_forward_per_payment() {
    let engine = common::engine();
    let account = engine.open_account(dec!(5000)).await.unwrap();

    let loan = engine
        .create_loan(account, dec!(1200), dec!(0), 12, date(2026, 8, 31))
        .await
        .unwrap();
    engine.approve_loan(loan.id).await.unwrap();

    let first = engine
        .apply_loan_payment_on(loan.id, dec!(100), date(2026, 8, 20))
        .await
        .unwrap();
    assert_eq!(first.new_due_date, date(2026, 9, 30));

    let second = engine
        .apply_loan_payment_on(loan.id, dec!(100), date(2026, 9, 20))
        .await
        .unwrap();
    assert_eq!(second.new_due_date, date(2026, 10, 30));
}

#[tokio::test]
async fn test_interest_bearing_loan_pays_off_to_total_due() {
    let engine = common::engine();
    let account = engine.open_account(dec!(20000)).await.unwrap();

    let loan = engine
        .create_loan(account, dec!(12000), dec!(12), 12, date(2026, 10, 1))
        .await
        .unwrap();
    engine.approve_loan(loan.id).await.unwrap();

    // Pay the fixed installment every month, on time.
    let mut due = date(2026, 10, 1);
    for _ in 0..12 {
        let outcome = engine
            .apply_loan_payment_on(loan.id, dec!(1066.1855), due)
            .await
            .unwrap();
        assert_eq!(outcome.late_fee, dec!(0));
        due = outcome.new_due_date;
    }

    let settled = engine.loan(loan.id).await.unwrap();
    assert_eq!(settled.status, LoanStatus::Repaid);

    // Total debited equals installment x 12 exactly.
    assert_eq!(
        engine.balance(account).await.unwrap(),
        Balance::new(dec!(20000) - dec!(1066.1855) * dec!(12))
    );
}

#[tokio::test]
async fn test_loans_listed_per_account() {
    let engine = common::engine();
    let account = engine.open_account(dec!(0)).await.unwrap();
    let other = engine.open_account(dec!(0)).await.unwrap();

    engine
        .create_loan(account, dec!(1000), dec!(10), 6, date(2026, 10, 1))
        .await
        .unwrap();
    engine
        .create_loan(account, dec!(2000), dec!(10), 6, date(2026, 10, 1))
        .await
        .unwrap();

    assert_eq!(engine.loans_for_account(account).await.unwrap().len(), 2);
    assert!(engine.loans_for_account(other).await.unwrap().is_empty());
}
