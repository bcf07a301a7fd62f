use super::payment::{BatchId, PaymentId, Principal};
use crate::error::{EscrowError, Result};
use serde::Deserialize;

/// Who is calling, and at which position in the total order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
    /// Logical sequence marker from the ordering layer.
    pub height: u64,
}

impl CallContext {
    pub fn new(caller: impl Into<Principal>, height: u64) -> Self {
        Self {
            caller: caller.into(),
            height,
        }
    }
}

/// Arguments of `create_payment`. The caller becomes the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub id: PaymentId,
    pub recipient: Principal,
    pub amount: u64,
    pub currency: String,
    pub network: String,
    pub batch_id: Option<BatchId>,
}

/// A mutating engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreatePayment(NewPayment),
    ProcessPayment { id: PaymentId },
    CompletePayment { id: PaymentId },
    DisputePayment { id: PaymentId, reason: String },
    ResolveDispute { id: PaymentId, refund: bool },
    CreateBatch { id: BatchId, members: Vec<PaymentId> },
    ProcessBatch { id: BatchId },
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Create,
    Process,
    Complete,
    Dispute,
    Resolve,
    Batch,
    ProcessBatch,
}

/// One row of a replayed call log.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CallRecord {
    pub caller: String,
    pub op: Op,
    pub id: String,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub refund: Option<bool>,
    /// `;`-separated payment ids.
    #[serde(default)]
    pub members: Option<String>,
}

/// A call paired with its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub caller: Principal,
    pub call: Call,
}

fn required<T>(op: &str, field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| EscrowError::Input(format!("{op} requires {field}")))
}

impl TryFrom<CallRecord> for Invocation {
    type Error = EscrowError;

    fn try_from(record: CallRecord) -> Result<Self> {
        let call = match record.op {
            Op::Create => Call::CreatePayment(NewPayment {
                id: PaymentId::new(record.id),
                recipient: Principal::new(required("create", "recipient", record.recipient)?),
                amount: required("create", "amount", record.amount)?,
                currency: required("create", "currency", record.currency)?,
                network: required("create", "network", record.network)?,
                batch_id: record.batch.map(BatchId::new),
            }),
            Op::Process => Call::ProcessPayment {
                id: PaymentId::new(record.id),
            },
            Op::Complete => Call::CompletePayment {
                id: PaymentId::new(record.id),
            },
            Op::Dispute => Call::DisputePayment {
                id: PaymentId::new(record.id),
                reason: required("dispute", "reason", record.reason)?,
            },
            Op::Resolve => Call::ResolveDispute {
                id: PaymentId::new(record.id),
                refund: required("resolve", "refund", record.refund)?,
            },
            Op::Batch => Call::CreateBatch {
                id: BatchId::new(record.id),
                members: record
                    .members
                    .unwrap_or_default()
                    .split(';')
                    .map(str::trim)
                    .filter(|member| !member.is_empty())
                    .map(PaymentId::from)
                    .collect(),
            },
            Op::ProcessBatch => Call::ProcessBatch {
                id: BatchId::new(record.id),
            },
        };
        Ok(Self {
            caller: Principal::new(record.caller),
            call,
        })
    }
}
