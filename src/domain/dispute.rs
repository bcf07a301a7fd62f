use super::payment::{Payment, PaymentState};
use super::ports::SettlementInstruction;
use crate::error::Result;

/// The arbiter's binary decision on a disputed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ruling {
    /// Dispute upheld: funds return to the sender.
    Refund,
    /// Dispute dismissed: funds stay with the recipient.
    Dismiss,
}

impl From<bool> for Ruling {
    fn from(refund: bool) -> Self {
        if refund { Self::Refund } else { Self::Dismiss }
    }
}

/// Turns an arbiter ruling into the payment's resolved state.
pub struct DisputeResolver;

impl DisputeResolver {
    /// Resolves `payment` in place and returns the transfer to perform, if any.
    ///
    /// Only a DISPUTED payment can be resolved. A refund ends in REFUNDED with a
    /// refund to the sender; a dismissal returns it to COMPLETED with no transfer
    /// since the funds were released on completion. `dispute_reason` is kept.
    pub fn resolve(payment: &mut Payment, ruling: Ruling) -> Result<Option<SettlementInstruction>> {
        match ruling {
            Ruling::Refund => {
                payment.advance(PaymentState::Disputed, PaymentState::Refunded)?;
                Ok(Some(SettlementInstruction::Refund {
                    payment_id: payment.id.clone(),
                    to: payment.sender.clone(),
                    amount: payment.amount,
                }))
            }
            Ruling::Dismiss => {
                payment.advance(PaymentState::Disputed, PaymentState::Completed)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::tests::sample_payment;
    use crate::error::EscrowError;

    fn disputed() -> Payment {
        let mut payment = sample_payment("p-1");
        payment.state = PaymentState::Disputed;
        payment.dispute_reason = Some("damaged".to_string());
        payment
    }

    #[test]
    fn test_refund_returns_funds_to_sender() {
        let mut payment = disputed();
        let instruction = DisputeResolver::resolve(&mut payment, Ruling::Refund).unwrap();

        assert_eq!(payment.state, PaymentState::Refunded);
        match instruction {
            Some(SettlementInstruction::Refund { to, amount, .. }) => {
                assert_eq!(to, payment.sender);
                assert_eq!(amount, payment.amount);
            }
            other => panic!("expected refund, got {:?}", other),
        }
        assert_eq!(payment.dispute_reason.as_deref(), Some("damaged"));
    }

    #[test]
    fn test_dismissal_restores_completed() {
        let mut payment = disputed();
        let instruction = DisputeResolver::resolve(&mut payment, Ruling::Dismiss).unwrap();
        assert_eq!(payment.state, PaymentState::Completed);
        assert!(instruction.is_none());
    }

    #[test]
    fn test_second_resolution_is_rejected() {
        let mut payment = disputed();
        DisputeResolver::resolve(&mut payment, Ruling::Refund).unwrap();
        let err = DisputeResolver::resolve(&mut payment, Ruling::Dismiss).unwrap_err();
        assert!(matches!(err, EscrowError::InvalidState { .. }));
        assert_eq!(payment.state, PaymentState::Refunded);
    }

    #[test]
    fn test_ruling_from_flag() {
        assert_eq!(Ruling::from(true), Ruling::Refund);
        assert_eq!(Ruling::from(false), Ruling::Dismiss);
    }
}
