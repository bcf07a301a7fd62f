//! Application layer containing the escrow orchestration.
//!
//! `EscrowEngine` is the public entry point and the only component that
//! commits state. The registries read the ledger, run validation, and stage
//! transitioned records for the engine to commit.

pub mod batches;
pub mod engine;
pub mod payments;
