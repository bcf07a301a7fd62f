//! Pure checks run before any state is touched. Each maps to one error code.

use super::payment::{Amount, BatchId, Payment, PaymentId, Principal};
use crate::error::{EscrowError, Result};
use std::collections::HashSet;

pub const MAX_ID_LEN: usize = 64;
pub const MAX_TAG_LEN: usize = 32;
pub const MAX_REASON_LEN: usize = 256;
pub const MAX_PRINCIPAL_LEN: usize = 128;

fn require_ascii(kind: &str, value: &str, max_len: usize) -> Result<()> {
    if value.is_empty() || value.len() > max_len {
        return Err(EscrowError::InvalidIdentifier(format!(
            "{kind} must be 1..={max_len} characters"
        )));
    }
    if !value.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(EscrowError::InvalidIdentifier(format!(
            "{kind} must be printable ascii without spaces"
        )));
    }
    Ok(())
}

pub fn require_payment_id(id: &PaymentId) -> Result<()> {
    require_ascii("payment id", id.as_str(), MAX_ID_LEN)
}

pub fn require_batch_id(id: &BatchId) -> Result<()> {
    require_ascii("batch id", id.as_str(), MAX_ID_LEN)
}

/// Currency and network tags.
pub fn require_tag(kind: &str, tag: &str) -> Result<()> {
    require_ascii(kind, tag, MAX_TAG_LEN)
}

pub fn require_principal(principal: &Principal) -> Result<()> {
    let value = principal.as_str();
    if value.is_empty() || value.len() > MAX_PRINCIPAL_LEN {
        return Err(EscrowError::InvalidIdentifier(format!(
            "principal must be 1..={MAX_PRINCIPAL_LEN} bytes"
        )));
    }
    Ok(())
}

pub fn require_reason(reason: &str) -> Result<()> {
    let len = reason.chars().count();
    if len == 0 || len > MAX_REASON_LEN {
        return Err(EscrowError::InvalidIdentifier(format!(
            "dispute reason must be 1..={MAX_REASON_LEN} characters"
        )));
    }
    Ok(())
}

pub fn require_amount(amount: u64) -> Result<Amount> {
    Amount::new(amount)
}

pub fn require_distinct_parties(sender: &Principal, recipient: &Principal) -> Result<()> {
    if sender == recipient {
        Err(EscrowError::SelfPayment)
    } else {
        Ok(())
    }
}

pub fn require_role(caller: &Principal, expected: &Principal) -> Result<()> {
    if caller == expected {
        Ok(())
    } else {
        Err(EscrowError::Unauthorized)
    }
}

pub fn require_found<T>(kind: &'static str, id: &str, record: Option<T>) -> Result<T> {
    record.ok_or_else(|| EscrowError::NotFound {
        kind,
        id: id.to_string(),
    })
}

pub fn require_absent<T>(kind: &'static str, id: &str, record: Option<T>) -> Result<()> {
    match record {
        Some(_) => Err(EscrowError::AlreadyExists {
            kind,
            id: id.to_string(),
        }),
        None => Ok(()),
    }
}

/// Shape of a member list: non-empty, bounded, no repeats, well-formed ids.
pub fn require_member_list(members: &[PaymentId], max_members: usize) -> Result<()> {
    if members.is_empty() {
        return Err(EscrowError::EmptyBatch);
    }
    if members.len() > max_members {
        return Err(EscrowError::InvalidIdentifier(format!(
            "batch lists {} members, limit is {max_members}",
            members.len()
        )));
    }
    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        require_payment_id(member)?;
        if !seen.insert(member) {
            return Err(EscrowError::BatchMemberMismatch(format!(
                "{member} is listed more than once"
            )));
        }
    }
    Ok(())
}

/// The payment must have been created for `batch_id`.
pub fn require_tagged_to(payment: &Payment, batch_id: &BatchId) -> Result<()> {
    if payment.batch_id.as_ref() == Some(batch_id) {
        Ok(())
    } else {
        Err(EscrowError::BatchMemberMismatch(format!(
            "{} is not tagged to batch {batch_id}",
            payment.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::tests::sample_payment;

    #[test]
    fn test_identifier_bounds() {
        assert!(require_payment_id(&PaymentId::from("payment-1")).is_ok());
        assert!(require_payment_id(&PaymentId::from("")).is_err());
        assert!(require_payment_id(&PaymentId::new("x".repeat(MAX_ID_LEN + 1))).is_err());
        assert!(require_payment_id(&PaymentId::from("has space")).is_err());
        assert!(require_tag("currency", "STX").is_ok());
        assert!(require_tag("currency", &"A".repeat(MAX_TAG_LEN + 1)).is_err());
    }

    #[test]
    fn test_amount_and_parties() {
        assert!(matches!(require_amount(0), Err(EscrowError::InvalidAmount)));
        assert_eq!(require_amount(5).unwrap().value(), 5);

        let alice = Principal::from("alice");
        let bob = Principal::from("bob");
        assert!(require_distinct_parties(&alice, &bob).is_ok());
        assert!(matches!(
            require_distinct_parties(&alice, &alice),
            Err(EscrowError::SelfPayment)
        ));
    }

    #[test]
    fn test_role_match() {
        let alice = Principal::from("alice");
        assert!(require_role(&alice, &alice).is_ok());
        assert!(matches!(
            require_role(&Principal::from("mallory"), &alice),
            Err(EscrowError::Unauthorized)
        ));
    }

    #[test]
    fn test_member_list_shape() {
        assert!(matches!(
            require_member_list(&[], 8),
            Err(EscrowError::EmptyBatch)
        ));

        let dup = [PaymentId::from("p-1"), PaymentId::from("p-1")];
        assert!(matches!(
            require_member_list(&dup, 8),
            Err(EscrowError::BatchMemberMismatch(_))
        ));

        let many: Vec<PaymentId> = (0..3).map(|i| PaymentId::new(format!("p-{i}"))).collect();
        assert!(require_member_list(&many, 3).is_ok());
        assert!(matches!(
            require_member_list(&many, 2),
            Err(EscrowError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_batch_tagging() {
        let mut payment = sample_payment("p-1");
        let batch = BatchId::from("b-1");
        assert!(require_tagged_to(&payment, &batch).is_err());

        payment.batch_id = Some(batch.clone());
        assert!(require_tagged_to(&payment, &batch).is_ok());
        assert!(require_tagged_to(&payment, &BatchId::from("b-2")).is_err());
    }
}
