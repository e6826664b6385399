use bankledger::application::engine::{LedgerConfig, LedgerEngine};
use bankledger::infrastructure::in_memory::{InMemoryLoanStore, InMemoryMovementStore};
use bankledger::infrastructure::notify::RecordingSink;
use bankledger::infrastructure::references::UuidReferenceSource;
use std::sync::Arc;

pub fn engine() -> LedgerEngine {
    LedgerEngine::in_memory(LedgerConfig::default())
}

#[allow(dead_code)]
pub fn engine_with_sink() -> (LedgerEngine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let engine = LedgerEngine::new(
        LedgerConfig::default(),
        Arc::new(InMemoryMovementStore::new()),
        Arc::new(InMemoryLoanStore::new()),
        Arc::new(UuidReferenceSource),
        sink.clone(),
    );
    (engine, sink)
}
