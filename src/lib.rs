//! A banking ledger and loan-settlement core.
//!
//! Moves money between accounts (deposits, withdrawals, transfers) and
//! applies loan payments while keeping balances, movement records, and loan
//! state mutually consistent under concurrent requests. Transport, auth,
//! and notification delivery live outside; this crate exposes the
//! [`application::engine::LedgerEngine`] facade and the ports it consumes
//! its collaborators through.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
