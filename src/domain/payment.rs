use crate::error::{EscrowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of a calling party. Compared by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-assigned payment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PaymentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-assigned batch identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BatchId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A strictly positive payment amount in the asset's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(EscrowError::InvalidAmount)
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = EscrowError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Lifecycle state of a payment.
///
/// ```text
/// CREATED -> PROCESSING -> COMPLETED -> DISPUTED -> REFUNDED
///                               ^            |
///                               +------------+ (dismissed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Created,
    Processing,
    Completed,
    Disputed,
    Refunded,
}

impl PaymentState {
    /// Numeric discriminant exposed to callers.
    pub fn code(self) -> u8 {
        match self {
            Self::Created => 1,
            Self::Processing => 2,
            Self::Completed => 3,
            Self::Disputed => 4,
            Self::Refunded => 5,
        }
    }

    /// True once no transition remains pending for the payment's funds.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Completed | Self::Refunded)
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "CREATED",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Disputed => "DISPUTED",
            Self::Refunded => "REFUNDED",
        };
        f.write_str(name)
    }
}

/// A single escrowed payment.
///
/// Field order is the column order of the replay output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Party funding the payment; the creating caller.
    pub sender: Principal,
    pub recipient: Principal,
    pub amount: Amount,
    /// Asset tag, stored and returned verbatim.
    pub currency: String,
    /// Settlement rail tag, stored and returned verbatim.
    pub network: String,
    pub batch_id: Option<BatchId>,
    pub state: PaymentState,
    /// Set when the recipient disputes; kept for audit after resolution.
    pub dispute_reason: Option<String>,
    /// Height of the call that created the payment.
    pub created_at: u64,
}

impl Payment {
    /// Moves `CREATED -> PROCESSING`.
    pub fn process(&mut self) -> Result<()> {
        self.advance(PaymentState::Created, PaymentState::Processing)
    }

    /// Moves `PROCESSING -> COMPLETED`.
    pub fn complete(&mut self) -> Result<()> {
        self.advance(PaymentState::Processing, PaymentState::Completed)
    }

    /// Moves `COMPLETED -> DISPUTED` and records the reason.
    pub fn dispute(&mut self, reason: String) -> Result<()> {
        self.advance(PaymentState::Completed, PaymentState::Disputed)?;
        self.dispute_reason = Some(reason);
        Ok(())
    }

    pub(crate) fn advance(&mut self, from: PaymentState, to: PaymentState) -> Result<()> {
        if self.state != from {
            return Err(self.invalid_state());
        }
        self.state = to;
        Ok(())
    }

    pub(crate) fn invalid_state(&self) -> EscrowError {
        EscrowError::InvalidState {
            id: self.id.to_string(),
            found: self.state.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_payment(id: &str) -> Payment {
        Payment {
            id: PaymentId::from(id),
            sender: Principal::from("alice"),
            recipient: Principal::from("bob"),
            amount: Amount::new(1000).unwrap(),
            currency: "STX".to_string(),
            network: "stacks".to_string(),
            batch_id: None,
            state: PaymentState::Created,
            dispute_reason: None,
            created_at: 1,
        }
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(1).is_ok());
        assert!(matches!(Amount::new(0), Err(EscrowError::InvalidAmount)));
    }

    #[test]
    fn test_amount_rejects_zero_on_deserialize() {
        let result: std::result::Result<Amount, _> = serde_json::from_str("0");
        assert!(result.is_err());
        let amount: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(amount.value(), 42);
    }

    #[test]
    fn test_forward_lifecycle() {
        let mut payment = sample_payment("p-1");
        payment.process().unwrap();
        assert_eq!(payment.state, PaymentState::Processing);
        payment.complete().unwrap();
        assert_eq!(payment.state, PaymentState::Completed);
        payment.dispute("not delivered".to_string()).unwrap();
        assert_eq!(payment.state, PaymentState::Disputed);
        assert_eq!(payment.dispute_reason.as_deref(), Some("not delivered"));
    }

    #[test]
    fn test_complete_before_process_is_rejected() {
        let mut payment = sample_payment("p-1");
        let err = payment.complete().unwrap_err();
        assert_eq!(err.name(), "ERR_INVALID_STATE");
        assert_eq!(payment.state, PaymentState::Created);
    }

    #[test]
    fn test_replayed_transition_is_rejected() {
        let mut payment = sample_payment("p-1");
        payment.process().unwrap();
        assert!(matches!(
            payment.process(),
            Err(EscrowError::InvalidState { .. })
        ));
        assert_eq!(payment.state, PaymentState::Processing);
    }

    #[test]
    fn test_dispute_requires_completion() {
        let mut payment = sample_payment("p-1");
        payment.process().unwrap();
        assert!(payment.dispute("early".to_string()).is_err());
        assert_eq!(payment.dispute_reason, None);
    }

    #[test]
    fn test_state_serializes_screaming_case() {
        let json = serde_json::to_string(&PaymentState::Refunded).unwrap();
        assert_eq!(json, "\"REFUNDED\"");
        assert_eq!(PaymentState::Created.code(), 1);
        assert_eq!(PaymentState::Refunded.code(), 5);
    }
}
