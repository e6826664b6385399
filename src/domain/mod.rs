//! Domain model: accounts, movements, loans, and the ports the core
//! consumes its collaborators through.

pub mod account;
pub mod loan;
pub mod movement;
pub mod ports;
