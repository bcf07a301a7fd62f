#![allow(dead_code)]

use escrow_engine::application::engine::EscrowEngine;
use escrow_engine::config::EngineConfig;
use escrow_engine::domain::call::{CallContext, NewPayment};
use escrow_engine::domain::payment::{BatchId, PaymentId, Principal};
use escrow_engine::infrastructure::in_memory::InMemoryLedger;
use escrow_engine::infrastructure::settlement::RecordingSettlement;
use std::io::Error;
use std::path::Path;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";
pub const MALLORY: &str = "mallory";
pub const ARBITER: &str = "arbiter";

pub const HEADER: [&str; 11] = [
    "caller", "op", "id", "recipient", "amount", "currency", "network", "batch", "reason",
    "refund", "members",
];

pub fn engine() -> (EscrowEngine, RecordingSettlement) {
    let settlement = RecordingSettlement::new();
    let engine = EscrowEngine::new(
        EngineConfig::new(ARBITER),
        Box::new(InMemoryLedger::new()),
        Box::new(settlement.clone()),
    );
    (engine, settlement)
}

pub fn ctx(caller: &str) -> CallContext {
    CallContext::new(caller, 1)
}

pub fn payment(id: &str, amount: u64, batch: Option<&str>) -> NewPayment {
    NewPayment {
        id: PaymentId::from(id),
        recipient: Principal::from(BOB),
        amount,
        currency: "STX".to_string(),
        network: "stacks".to_string(),
        batch_id: batch.map(BatchId::from),
    }
}

/// Creates, processes and completes `id` as ALICE.
pub async fn completed(engine: &EscrowEngine, id: &str) {
    let alice = ctx(ALICE);
    let pid = PaymentId::from(id);
    engine.create_payment(&alice, payment(id, 1000, None)).await.unwrap();
    engine.process_payment(&alice, &pid).await.unwrap();
    engine.complete_payment(&alice, &pid).await.unwrap();
}

/// Writes a call log; each row is padded to the full header width.
pub fn write_calls(path: &Path, rows: &[&[&str]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(HEADER)?;
    for row in rows {
        let mut record: Vec<&str> = row.to_vec();
        record.resize(HEADER.len(), "");
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
