//! Concrete adapters for the domain ports: in-memory stores, the UUID
//! reference source, and notification sinks.

pub mod in_memory;
pub mod notify;
pub mod references;
