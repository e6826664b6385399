//! Transport adapters. The core itself owns no wire format; this is the
//! CSV replay interface the demo binary drives it through.

pub mod csv;
