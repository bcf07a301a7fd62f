use super::batch::Batch;
use super::payment::{Amount, BatchId, Payment, PaymentId, Principal};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Records staged by one call, applied together or not at all.
///
/// `settlements` enqueues instructions in the outbox alongside the state
/// change that produced them; `settled` holds outbox keys to clear once the
/// collaborator has accepted them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WriteSet {
    pub payments: Vec<Payment>,
    pub batches: Vec<Batch>,
    pub settlements: Vec<SettlementInstruction>,
    pub settled: Vec<String>,
}

impl WriteSet {
    pub fn payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn batch(mut self, batch: Batch) -> Self {
        self.batches.push(batch);
        self
    }

    pub fn settlement(mut self, instruction: SettlementInstruction) -> Self {
        self.settlements.push(instruction);
        self
    }

    pub fn settled(mut self, instruction: &SettlementInstruction) -> Self {
        self.settled.push(instruction.key());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
            && self.batches.is_empty()
            && self.settlements.is_empty()
            && self.settled.is_empty()
    }
}

/// Keyed storage for payments and batches, plus the settlement outbox.
///
/// `commit` applies every part of a [`WriteSet`] atomically. Payments and
/// batches are never removed; outbox entries leave only through `settled`.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn payment(&self, id: &PaymentId) -> Result<Option<Payment>>;
    async fn batch(&self, id: &BatchId) -> Result<Option<Batch>>;
    /// Outbox entries not yet accepted by the settlement collaborator,
    /// ordered by key.
    async fn pending_settlements(&self) -> Result<Vec<SettlementInstruction>>;
    /// All payments, ordered by id.
    async fn payments(&self) -> Result<Vec<Payment>>;
    async fn commit(&self, writes: WriteSet) -> Result<()>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;

/// Value movement the engine has decided on. The mechanics belong to the
/// [`Settlement`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SettlementInstruction {
    /// Funds go to the recipient on completion.
    Release {
        payment_id: PaymentId,
        to: Principal,
        amount: Amount,
    },
    /// Funds return to the sender after an upheld dispute.
    Refund {
        payment_id: PaymentId,
        to: Principal,
        amount: Amount,
    },
}

impl SettlementInstruction {
    pub fn payment_id(&self) -> &PaymentId {
        match self {
            Self::Release { payment_id, .. } | Self::Refund { payment_id, .. } => payment_id,
        }
    }

    /// Outbox key. A payment is released at most once and refunded at most
    /// once, so the pair is unique.
    pub fn key(&self) -> String {
        let kind = match self {
            Self::Release { .. } => "release",
            Self::Refund { .. } => "refund",
        };
        format!("{}/{}", self.payment_id(), kind)
    }
}

/// The value-transfer primitive.
///
/// Delivery is at least once: an instruction accepted here whose outbox entry
/// could not be cleared is offered again, carrying the same [`key`].
///
/// [`key`]: SettlementInstruction::key
#[async_trait]
pub trait Settlement: Send + Sync {
    async fn dispatch(&self, instruction: SettlementInstruction) -> Result<()>;
}

pub type SettlementBox = Box<dyn Settlement>;
