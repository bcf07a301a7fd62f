use super::batches::BatchRegistry;
use super::payments::PaymentRegistry;
use crate::config::EngineConfig;
use crate::domain::batch::{BatchState, BatchView};
use crate::domain::call::{Call, CallContext, NewPayment};
use crate::domain::dispute::Ruling;
use crate::domain::payment::{BatchId, Payment, PaymentId, PaymentState, Principal};
use crate::domain::ports::{LedgerStoreBox, SettlementBox, SettlementInstruction, WriteSet};
use crate::error::{EscrowError, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// The public entry surface of the escrow.
///
/// Each mutating call runs as one indivisible step: it takes the sequencer,
/// re-reads whatever it needs from the ledger, validates, and commits a single
/// [`WriteSet`]. A failed call leaves the ledger untouched.
///
/// Settlement instructions are committed to the ledger's outbox together with
/// the transition that produced them and dispatched afterwards. An instruction
/// the collaborator rejects stays pending until [`flush_settlements`].
///
/// [`flush_settlements`]: EscrowEngine::flush_settlements
pub struct EscrowEngine {
    config: EngineConfig,
    store: LedgerStoreBox,
    settlement: SettlementBox,
    sequencer: Mutex<()>,
}

impl EscrowEngine {
    /// Creates a new `EscrowEngine`.
    ///
    /// # Arguments
    ///
    /// * `config` - Fixed deployment settings, including the arbiter.
    /// * `store` - The ledger holding payments and batches.
    /// * `settlement` - The value-transfer primitive.
    pub fn new(config: EngineConfig, store: LedgerStoreBox, settlement: SettlementBox) -> Self {
        Self {
            config,
            store,
            settlement,
            sequencer: Mutex::new(()),
        }
    }

    pub fn arbiter(&self) -> &Principal {
        &self.config.arbiter
    }

    fn payment_registry(&self) -> PaymentRegistry<'_> {
        PaymentRegistry::new(self.store.as_ref())
    }

    fn batch_registry(&self) -> BatchRegistry<'_> {
        BatchRegistry::new(self.store.as_ref(), self.config.max_batch_size)
    }

    fn observe<T>(op: &'static str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(op, code = e.code(), error = e.name(), "call rejected: {}", e);
        }
        result
    }

    async fn commit_and_settle(
        &self,
        instruction: Option<SettlementInstruction>,
        writes: WriteSet,
    ) -> Result<()> {
        let Some(instruction) = instruction else {
            return self.store.commit(writes).await;
        };
        self.store
            .commit(writes.settlement(instruction.clone()))
            .await?;
        if let Err(e) = self.settle(&instruction).await {
            warn!(
                payment_id = %instruction.payment_id(),
                code = e.code(),
                error = e.name(),
                "settlement left pending: {}",
                e
            );
        }
        Ok(())
    }

    /// Hands one outbox entry to the collaborator and clears it on acceptance.
    async fn settle(&self, instruction: &SettlementInstruction) -> Result<()> {
        debug!(
            payment_id = %instruction.payment_id(),
            key = %instruction.key(),
            "dispatching settlement"
        );
        self.settlement
            .dispatch(instruction.clone())
            .await
            .map_err(|e| match e {
                EscrowError::Settlement(_) => e,
                other => EscrowError::Settlement(other.to_string()),
            })?;
        self.store
            .commit(WriteSet::default().settled(instruction))
            .await
    }

    /// Re-dispatches every pending outbox entry in key order, stopping at the
    /// first rejection. Returns how many entries were cleared.
    pub async fn flush_settlements(&self) -> Result<usize> {
        let result: Result<usize> = async {
            let _turn = self.sequencer.lock().await;
            let mut cleared = 0;
            for instruction in self.store.pending_settlements().await? {
                self.settle(&instruction).await?;
                cleared += 1;
            }
            if cleared > 0 {
                info!(cleared, "settlement outbox flushed");
            }
            Ok(cleared)
        }
        .await;
        Self::observe("flush_settlements", result)
    }

    /// Runs any mutating call on behalf of `ctx.caller`.
    pub async fn execute(&self, ctx: &CallContext, call: Call) -> Result<()> {
        match call {
            Call::CreatePayment(new) => self.create_payment(ctx, new).await,
            Call::ProcessPayment { id } => self.process_payment(ctx, &id).await,
            Call::CompletePayment { id } => self.complete_payment(ctx, &id).await,
            Call::DisputePayment { id, reason } => self.dispute_payment(ctx, &id, reason).await,
            Call::ResolveDispute { id, refund } => self.resolve_dispute(ctx, &id, refund).await,
            Call::CreateBatch { id, members } => {
                self.create_payment_batch(ctx, id, members).await
            }
            Call::ProcessBatch { id } => self.process_batch(ctx, &id).await,
        }
    }

    pub async fn create_payment(&self, ctx: &CallContext, new: NewPayment) -> Result<()> {
        let result: Result<()> = async {
            let _turn = self.sequencer.lock().await;
            let payment = self.payment_registry().create(ctx, new).await?;
            self.store
                .commit(WriteSet::default().payment(payment.clone()))
                .await?;
            info!(
                payment_id = %payment.id,
                sender = %payment.sender,
                recipient = %payment.recipient,
                amount = payment.amount.value(),
                height = ctx.height,
                "payment created"
            );
            Ok(())
        }
        .await;
        Self::observe("create_payment", result)
    }

    pub async fn process_payment(&self, ctx: &CallContext, id: &PaymentId) -> Result<()> {
        let result: Result<()> = async {
            let _turn = self.sequencer.lock().await;
            let payment = self.payment_registry().process(&ctx.caller, id).await?;
            self.store.commit(WriteSet::default().payment(payment)).await?;
            info!(
                payment_id = %id,
                from = %PaymentState::Created,
                to = %PaymentState::Processing,
                "payment transitioned"
            );
            Ok(())
        }
        .await;
        Self::observe("process_payment", result)
    }

    pub async fn complete_payment(&self, ctx: &CallContext, id: &PaymentId) -> Result<()> {
        let result: Result<()> = async {
            let _turn = self.sequencer.lock().await;
            let (payment, release) = self.payment_registry().complete(&ctx.caller, id).await?;
            self.commit_and_settle(Some(release), WriteSet::default().payment(payment))
                .await?;
            info!(
                payment_id = %id,
                from = %PaymentState::Processing,
                to = %PaymentState::Completed,
                "payment transitioned"
            );
            Ok(())
        }
        .await;
        Self::observe("complete_payment", result)
    }

    pub async fn dispute_payment(
        &self,
        ctx: &CallContext,
        id: &PaymentId,
        reason: String,
    ) -> Result<()> {
        let result: Result<()> = async {
            let _turn = self.sequencer.lock().await;
            let payment = self
                .payment_registry()
                .dispute(&ctx.caller, id, reason)
                .await?;
            self.store.commit(WriteSet::default().payment(payment)).await?;
            info!(
                payment_id = %id,
                from = %PaymentState::Completed,
                to = %PaymentState::Disputed,
                "payment transitioned"
            );
            Ok(())
        }
        .await;
        Self::observe("dispute_payment", result)
    }

    /// Arbiter-only. `refund` upholds the dispute; otherwise it is dismissed.
    pub async fn resolve_dispute(
        &self,
        ctx: &CallContext,
        id: &PaymentId,
        refund: bool,
    ) -> Result<()> {
        let result: Result<()> = async {
            let _turn = self.sequencer.lock().await;
            let (payment, instruction) = self
                .payment_registry()
                .resolve(&ctx.caller, self.arbiter(), id, Ruling::from(refund))
                .await?;
            let to = payment.state;
            self.commit_and_settle(instruction, WriteSet::default().payment(payment))
                .await?;
            info!(
                payment_id = %id,
                from = %PaymentState::Disputed,
                to = %to,
                "dispute resolved"
            );
            Ok(())
        }
        .await;
        Self::observe("resolve_dispute", result)
    }

    pub async fn create_payment_batch(
        &self,
        ctx: &CallContext,
        id: BatchId,
        members: Vec<PaymentId>,
    ) -> Result<()> {
        let result: Result<()> = async {
            let _turn = self.sequencer.lock().await;
            let batch = self.batch_registry().create(id, members).await?;
            let (batch_id, members) = (batch.id.clone(), batch.member_ids.len());
            self.store.commit(WriteSet::default().batch(batch)).await?;
            info!(batch_id = %batch_id, members, caller = %ctx.caller, "batch created");
            Ok(())
        }
        .await;
        Self::observe("create_payment_batch", result)
    }

    /// Moves the batch and all of its members to PROCESSING, or nothing at all.
    pub async fn process_batch(&self, ctx: &CallContext, id: &BatchId) -> Result<()> {
        let result: Result<()> = async {
            let _turn = self.sequencer.lock().await;
            let writes = self.batch_registry().process(&ctx.caller, id).await?;
            let members = writes.payments.len();
            self.store.commit(writes).await?;
            info!(
                batch_id = %id,
                members,
                to = %BatchState::Processing,
                "batch transitioned"
            );
            Ok(())
        }
        .await;
        Self::observe("process_batch", result)
    }

    pub async fn get_payment_state(&self, id: &PaymentId) -> Result<PaymentState> {
        debug!(payment_id = %id, "reading payment state");
        self.payment_registry().state(id).await
    }

    pub async fn get_payment(&self, id: &PaymentId) -> Result<Payment> {
        self.payment_registry().find(id).await
    }

    /// Batch state recomputed from its members.
    ///
    /// The batch and its members are read under the sequencer, so the result
    /// reflects a single point between calls.
    pub async fn get_batch_state(&self, id: &BatchId) -> Result<BatchState> {
        debug!(batch_id = %id, "reading batch state");
        let _turn = self.sequencer.lock().await;
        self.batch_registry().state(id).await
    }

    pub async fn get_batch(&self, id: &BatchId) -> Result<BatchView> {
        let _turn = self.sequencer.lock().await;
        self.batch_registry().view(id).await
    }

    /// All payments ordered by id.
    pub async fn payments(&self) -> Result<Vec<Payment>> {
        self.store.payments().await
    }

    /// Settlement instructions committed but not yet accepted.
    pub async fn pending_settlements(&self) -> Result<Vec<SettlementInstruction>> {
        self.store.pending_settlements().await
    }
}
