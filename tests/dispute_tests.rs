mod common;

use common::*;
use escrow_engine::domain::payment::{PaymentId, PaymentState, Principal};
use escrow_engine::domain::ports::SettlementInstruction;
use escrow_engine::error::EscrowError;

#[tokio::test]
async fn test_dispute_then_refund() {
    let (engine, settlement) = engine();
    let id = PaymentId::from("p-1");
    completed(&engine, "p-1").await;

    engine
        .dispute_payment(&ctx(BOB), &id, "goods never arrived".to_string())
        .await
        .unwrap();
    assert_eq!(engine.get_payment_state(&id).await.unwrap(), PaymentState::Disputed);

    engine.resolve_dispute(&ctx(ARBITER), &id, true).await.unwrap();
    let record = engine.get_payment(&id).await.unwrap();
    assert_eq!(record.state, PaymentState::Refunded);
    assert_eq!(record.dispute_reason.as_deref(), Some("goods never arrived"));

    let journal = settlement.instructions().await;
    assert_eq!(journal.len(), 2);
    assert!(matches!(
        &journal[1],
        SettlementInstruction::Refund { to, .. } if to == &Principal::from(ALICE)
    ));
}

#[tokio::test]
async fn test_dispute_then_dismiss() {
    let (engine, settlement) = engine();
    let id = PaymentId::from("p-1");
    completed(&engine, "p-1").await;

    engine
        .dispute_payment(&ctx(BOB), &id, "wrong colour".to_string())
        .await
        .unwrap();
    engine.resolve_dispute(&ctx(ARBITER), &id, false).await.unwrap();

    assert_eq!(engine.get_payment_state(&id).await.unwrap(), PaymentState::Completed);
    // Dismissal moves no funds.
    assert_eq!(settlement.instructions().await.len(), 1);
}

#[tokio::test]
async fn test_unauthorized_dispute_and_resolution() {
    let (engine, _) = engine();
    let id = PaymentId::from("p-1");
    completed(&engine, "p-1").await;

    for caller in [ALICE, MALLORY, ARBITER] {
        let err = engine
            .dispute_payment(&ctx(caller), &id, "mine".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::Unauthorized));
    }
    assert_eq!(engine.get_payment_state(&id).await.unwrap(), PaymentState::Completed);

    engine
        .dispute_payment(&ctx(BOB), &id, "late".to_string())
        .await
        .unwrap();
    for caller in [ALICE, BOB, MALLORY] {
        let err = engine.resolve_dispute(&ctx(caller), &id, true).await.unwrap_err();
        assert!(matches!(err, EscrowError::Unauthorized));
    }
    assert_eq!(engine.get_payment_state(&id).await.unwrap(), PaymentState::Disputed);
}

#[tokio::test]
async fn test_dispute_requires_completed_payment() {
    let (engine, _) = engine();
    let alice = ctx(ALICE);
    let id = PaymentId::from("p-1");

    engine.create_payment(&alice, payment("p-1", 1000, None)).await.unwrap();
    let err = engine
        .dispute_payment(&ctx(BOB), &id, "early".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, EscrowError::InvalidState { .. }));

    engine.process_payment(&alice, &id).await.unwrap();
    let err = engine
        .dispute_payment(&ctx(BOB), &id, "early".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, EscrowError::InvalidState { .. }));
}

#[tokio::test]
async fn test_resolution_is_final() {
    let (engine, settlement) = engine();
    let id = PaymentId::from("p-1");
    completed(&engine, "p-1").await;

    engine
        .dispute_payment(&ctx(BOB), &id, "broken".to_string())
        .await
        .unwrap();
    engine.resolve_dispute(&ctx(ARBITER), &id, true).await.unwrap();

    let err = engine.resolve_dispute(&ctx(ARBITER), &id, false).await.unwrap_err();
    assert_eq!(err.name(), "ERR_INVALID_STATE");
    let err = engine
        .dispute_payment(&ctx(BOB), &id, "again".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.name(), "ERR_INVALID_STATE");

    assert_eq!(engine.get_payment_state(&id).await.unwrap(), PaymentState::Refunded);
    assert_eq!(settlement.instructions().await.len(), 2);
}

#[tokio::test]
async fn test_resolve_without_dispute() {
    let (engine, _) = engine();
    let id = PaymentId::from("p-1");
    completed(&engine, "p-1").await;

    let err = engine.resolve_dispute(&ctx(ARBITER), &id, true).await.unwrap_err();
    assert!(matches!(err, EscrowError::InvalidState { .. }));
}

#[tokio::test]
async fn test_empty_reason_is_rejected() {
    let (engine, _) = engine();
    let id = PaymentId::from("p-1");
    completed(&engine, "p-1").await;

    let err = engine
        .dispute_payment(&ctx(BOB), &id, String::new())
        .await
        .unwrap_err();
    assert_eq!(err.name(), "ERR_INVALID_IDENTIFIER");
    assert_eq!(engine.get_payment_state(&id).await.unwrap(), PaymentState::Completed);
}

#[tokio::test]
async fn test_stranger_with_empty_reason_is_unauthorized() {
    let (engine, _) = engine();
    let id = PaymentId::from("p-1");
    completed(&engine, "p-1").await;

    let err = engine
        .dispute_payment(&ctx(MALLORY), &id, String::new())
        .await
        .unwrap_err();
    assert_eq!(err.name(), "ERR_UNAUTHORIZED");

    let err = engine
        .dispute_payment(&ctx(BOB), &PaymentId::from("ghost"), String::new())
        .await
        .unwrap_err();
    assert_eq!(err.name(), "ERR_NOT_FOUND");
}
