//! Application layer: the five components that move money and the facade
//! that wires them together.

pub mod accounts;
pub mod engine;
pub mod loans;
pub mod movements;
pub mod transfer;
