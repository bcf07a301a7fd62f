//! Escrow-style payment lifecycle engine.
//!
//! Payments move `CREATED -> PROCESSING -> COMPLETED`, may be disputed by the
//! recipient once completed, and are then resolved by a fixed arbiter into
//! either REFUNDED or back to COMPLETED. Batches group payments, process them
//! together atomically, and report COMPLETED once every member is resolved.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
