use crate::domain::batch::Batch;
use crate::domain::payment::{BatchId, Payment, PaymentId};
use crate::domain::ports::{LedgerStore, SettlementInstruction, WriteSet};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    payments: BTreeMap<PaymentId, Payment>,
    batches: HashMap<BatchId, Batch>,
    settlements: BTreeMap<String, SettlementInstruction>,
}

/// A thread-safe in-memory ledger.
///
/// All tables sit behind one `RwLock`, so a commit is applied under a single
/// write guard and readers never observe half of a [`WriteSet`].
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn payment(&self, id: &PaymentId) -> Result<Option<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables.payments.get(id).cloned())
    }

    async fn batch(&self, id: &BatchId) -> Result<Option<Batch>> {
        let tables = self.tables.read().await;
        Ok(tables.batches.get(id).cloned())
    }

    async fn pending_settlements(&self) -> Result<Vec<SettlementInstruction>> {
        let tables = self.tables.read().await;
        Ok(tables.settlements.values().cloned().collect())
    }

    async fn payments(&self) -> Result<Vec<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables.payments.values().cloned().collect())
    }

    async fn commit(&self, writes: WriteSet) -> Result<()> {
        let mut tables = self.tables.write().await;
        for payment in writes.payments {
            tables.payments.insert(payment.id.clone(), payment);
        }
        for batch in writes.batches {
            tables.batches.insert(batch.id.clone(), batch);
        }
        for instruction in writes.settlements {
            tables.settlements.insert(instruction.key(), instruction);
        }
        for key in &writes.settled {
            tables.settlements.remove(key);
        }
        Ok(())
    }
}
