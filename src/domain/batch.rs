use super::payment::{BatchId, PaymentId, PaymentState};
use crate::error::{EscrowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recorded state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    Created,
    Processing,
    Completed,
}

impl BatchState {
    pub fn code(self) -> u8 {
        match self {
            Self::Created => 1,
            Self::Processing => 2,
            Self::Completed => 3,
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "CREATED",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

/// A named, fixed group of payments.
///
/// Members are held by id only; the batch never owns or mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub member_ids: Vec<PaymentId>,
    /// Last explicit transition. Completion is never recorded here.
    pub state: BatchState,
}

impl Batch {
    pub fn new(id: BatchId, member_ids: Vec<PaymentId>) -> Self {
        Self {
            id,
            member_ids,
            state: BatchState::Created,
        }
    }

    /// Moves `CREATED -> PROCESSING`.
    pub fn begin_processing(&mut self) -> Result<()> {
        if self.state != BatchState::Created {
            return Err(EscrowError::InvalidState {
                id: self.id.to_string(),
                found: self.state.to_string(),
            });
        }
        self.state = BatchState::Processing;
        Ok(())
    }
}

/// Computes the state a batch reports from its recorded state and the current
/// states of its members.
///
/// A batch is COMPLETED once every member is COMPLETED or REFUNDED; until then
/// it reports its recorded state.
pub fn aggregate_state<I>(recorded: BatchState, members: I) -> BatchState
where
    I: IntoIterator<Item = PaymentState>,
{
    let mut members = members.into_iter().peekable();
    if members.peek().is_none() {
        return recorded;
    }
    if members.all(PaymentState::is_resolved) {
        BatchState::Completed
    } else {
        recorded
    }
}

/// Read model returned by batch lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchView {
    pub id: BatchId,
    pub member_ids: Vec<PaymentId>,
    pub recorded_state: BatchState,
    pub state: BatchState,
}
