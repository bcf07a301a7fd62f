use super::payments::PaymentRegistry;
use crate::domain::batch::{Batch, BatchState, BatchView, aggregate_state};
use crate::domain::payment::{BatchId, PaymentId, PaymentState, Principal};
use crate::domain::ports::{LedgerStore, WriteSet};
use crate::domain::validation;
use crate::error::Result;

/// Creation, fan-out processing and aggregate reads for batches.
pub struct BatchRegistry<'a> {
    store: &'a dyn LedgerStore,
    max_batch_size: usize,
}

impl<'a> BatchRegistry<'a> {
    pub fn new(store: &'a dyn LedgerStore, max_batch_size: usize) -> Self {
        Self {
            store,
            max_batch_size,
        }
    }

    fn payments(&self) -> PaymentRegistry<'a> {
        PaymentRegistry::new(self.store)
    }

    pub async fn find(&self, id: &BatchId) -> Result<Batch> {
        let batch = self.store.batch(id).await?;
        validation::require_found("batch", id.as_str(), batch)
    }

    /// Builds a CREATED batch after checking every member exists and was
    /// created for this batch.
    ///
    /// A payment carries one immutable batch tag and batch ids are unique, so
    /// no payment can be listed by two batches.
    pub async fn create(&self, id: BatchId, members: Vec<PaymentId>) -> Result<Batch> {
        validation::require_batch_id(&id)?;
        validation::require_member_list(&members, self.max_batch_size)?;

        let existing = self.store.batch(&id).await?;
        validation::require_absent("batch", id.as_str(), existing)?;

        let payments = self.payments();
        for member in &members {
            let payment = payments.find(member).await?;
            validation::require_tagged_to(&payment, &id)?;
        }

        Ok(Batch::new(id, members))
    }

    /// Stages `CREATED -> PROCESSING` for the batch and every member.
    ///
    /// All members are loaded and transitioned in memory first; any failure
    /// aborts with nothing staged. Each member transition is authorised as if
    /// the caller had invoked `process_payment` on it.
    pub async fn process(&self, caller: &Principal, id: &BatchId) -> Result<WriteSet> {
        let mut batch = self.find(id).await?;
        batch.begin_processing()?;

        let payments = self.payments();
        let mut writes = WriteSet::default();
        for member in &batch.member_ids {
            let payment = payments.find(member).await?;
            writes = writes.payment(PaymentRegistry::process_record(caller, payment)?);
        }

        Ok(writes.batch(batch))
    }

    async fn member_states(&self, batch: &Batch) -> Result<Vec<PaymentState>> {
        let payments = self.payments();
        let mut states = Vec::with_capacity(batch.member_ids.len());
        for member in &batch.member_ids {
            states.push(payments.state(member).await?);
        }
        Ok(states)
    }

    /// Reported state, recomputed from the members on every call.
    pub async fn state(&self, id: &BatchId) -> Result<BatchState> {
        Ok(self.view(id).await?.state)
    }

    pub async fn view(&self, id: &BatchId) -> Result<BatchView> {
        let batch = self.find(id).await?;
        let states = self.member_states(&batch).await?;
        Ok(BatchView {
            state: aggregate_state(batch.state, states),
            recorded_state: batch.state,
            id: batch.id,
            member_ids: batch.member_ids,
        })
    }
}
