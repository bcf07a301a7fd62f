//! Domain layer: escrow records, the rules that govern their transitions,
//! and the ports through which the engine reaches storage and settlement.

pub mod batch;
pub mod call;
pub mod dispute;
pub mod payment;
pub mod ports;
pub mod validation;
