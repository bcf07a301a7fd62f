//! Engine configuration fixed at construction time.

use crate::domain::payment::Principal;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 64;

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The only identity allowed to resolve disputes.
    pub arbiter: Principal,
    /// Upper bound on members per batch.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl EngineConfig {
    pub fn new(arbiter: impl Into<Principal>) -> Self {
        Self {
            arbiter: arbiter.into(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Loads a JSON document such as `{"arbiter": "SP3...", "max_batch_size": 16}`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
