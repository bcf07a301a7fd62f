use crate::domain::call::{CallContext, NewPayment};
use crate::domain::dispute::{DisputeResolver, Ruling};
use crate::domain::payment::{Payment, PaymentId, PaymentState, Principal};
use crate::domain::ports::{LedgerStore, SettlementInstruction};
use crate::domain::validation;
use crate::error::Result;

/// Lookup and transition rules for individual payments.
///
/// Every method re-reads the ledger and returns the transitioned record
/// without writing it.
pub struct PaymentRegistry<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> PaymentRegistry<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    pub async fn find(&self, id: &PaymentId) -> Result<Payment> {
        let payment = self.store.payment(id).await?;
        validation::require_found("payment", id.as_str(), payment)
    }

    pub async fn state(&self, id: &PaymentId) -> Result<PaymentState> {
        Ok(self.find(id).await?.state)
    }

    /// Builds a new CREATED payment with the caller as sender.
    ///
    /// Input checks run before the ledger is consulted for id collisions.
    pub async fn create(&self, ctx: &CallContext, new: NewPayment) -> Result<Payment> {
        validation::require_payment_id(&new.id)?;
        validation::require_principal(&ctx.caller)?;
        validation::require_principal(&new.recipient)?;
        validation::require_tag("currency", &new.currency)?;
        validation::require_tag("network", &new.network)?;
        if let Some(batch_id) = &new.batch_id {
            validation::require_batch_id(batch_id)?;
        }
        let amount = validation::require_amount(new.amount)?;
        validation::require_distinct_parties(&ctx.caller, &new.recipient)?;

        let existing = self.store.payment(&new.id).await?;
        validation::require_absent("payment", new.id.as_str(), existing)?;

        Ok(Payment {
            id: new.id,
            sender: ctx.caller.clone(),
            recipient: new.recipient,
            amount,
            currency: new.currency,
            network: new.network,
            batch_id: new.batch_id,
            state: PaymentState::Created,
            dispute_reason: None,
            created_at: ctx.height,
        })
    }

    pub async fn process(&self, caller: &Principal, id: &PaymentId) -> Result<Payment> {
        let payment = self.find(id).await?;
        Self::process_record(caller, payment)
    }

    /// Sender-authorised `CREATED -> PROCESSING` on an already loaded record.
    pub fn process_record(caller: &Principal, mut payment: Payment) -> Result<Payment> {
        validation::require_role(caller, &payment.sender)?;
        payment.process()?;
        Ok(payment)
    }

    /// Completes the payment and yields the release to the recipient.
    pub async fn complete(
        &self,
        caller: &Principal,
        id: &PaymentId,
    ) -> Result<(Payment, SettlementInstruction)> {
        let mut payment = self.find(id).await?;
        validation::require_role(caller, &payment.sender)?;
        payment.complete()?;
        let release = SettlementInstruction::Release {
            payment_id: payment.id.clone(),
            to: payment.recipient.clone(),
            amount: payment.amount,
        };
        Ok((payment, release))
    }

    /// Recipient-authorised `COMPLETED -> DISPUTED`. The reason is checked
    /// only once the caller is known to be the recipient.
    pub async fn dispute(
        &self,
        caller: &Principal,
        id: &PaymentId,
        reason: String,
    ) -> Result<Payment> {
        let mut payment = self.find(id).await?;
        validation::require_role(caller, &payment.recipient)?;
        validation::require_reason(&reason)?;
        payment.dispute(reason)?;
        Ok(payment)
    }

    pub async fn resolve(
        &self,
        caller: &Principal,
        arbiter: &Principal,
        id: &PaymentId,
        ruling: Ruling,
    ) -> Result<(Payment, Option<SettlementInstruction>)> {
        let mut payment = self.find(id).await?;
        validation::require_role(caller, arbiter)?;
        let instruction = DisputeResolver::resolve(&mut payment, ruling)?;
        Ok((payment, instruction))
    }
}
