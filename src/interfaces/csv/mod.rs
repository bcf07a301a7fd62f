//! CSV adapters used by the replay binary.

pub mod call_reader;
pub mod payment_writer;
