use crate::domain::ports::{Settlement, SettlementInstruction};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Settlement adapter that records every instruction in dispatch order.
///
/// Stands in for the asset-custody layer; clones share the same journal.
#[derive(Default, Clone)]
pub struct RecordingSettlement {
    journal: Arc<RwLock<Vec<SettlementInstruction>>>,
}

impl RecordingSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn instructions(&self) -> Vec<SettlementInstruction> {
        self.journal.read().await.clone()
    }
}

#[async_trait]
impl Settlement for RecordingSettlement {
    async fn dispatch(&self, instruction: SettlementInstruction) -> Result<()> {
        info!(payment_id = %instruction.payment_id(), ?instruction, "settlement dispatched");
        self.journal.write().await.push(instruction);
        Ok(())
    }
}
