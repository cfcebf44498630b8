use chrono::Duration;

use reclaim_reset::domain::repository::ResetRecordStore;
use reclaim_reset::domain::types::{ResetRecord, ResetToken};
use reclaim_reset::error::ResetError;
use reclaim_reset::infra::memory::MemoryResetStore;
use reclaim_reset::usecase::request_challenge::{RequestChallengeInput, RequestChallengeUseCase};

use crate::helpers::{EMAIL, ManualClock, MockAccountDirectory, MockDelivery, epoch};

fn usecase(
    store: &MemoryResetStore,
    delivery: &MockDelivery,
) -> RequestChallengeUseCase<MemoryResetStore, MockAccountDirectory, MockDelivery, ManualClock> {
    RequestChallengeUseCase {
        records: store.clone(),
        accounts: MockAccountDirectory::with(&[EMAIL]),
        delivery: delivery.clone(),
        clock: ManualClock::at(epoch()),
    }
}

fn input(identifier: &str) -> RequestChallengeInput {
    RequestChallengeInput {
        identifier: identifier.to_owned(),
    }
}

#[tokio::test]
async fn should_store_and_deliver_challenge_for_known_identifier() {
    let store = MemoryResetStore::new();
    let delivery = MockDelivery::default();

    let out = usecase(&store, &delivery).execute(input(EMAIL)).await.unwrap();

    assert_eq!(out.code.len(), 6);
    assert!(out.code.bytes().all(|b| b.is_ascii_digit()));
    match store.get(EMAIL).await.unwrap() {
        Some(ResetRecord::Challenge(c)) => {
            assert_eq!(c.code, out.code);
            assert_eq!(c.attempts, 0);
            assert_eq!(c.created_at, epoch());
            assert_eq!(c.expires_at(), epoch() + Duration::minutes(5));
        }
        other => panic!("expected challenge, got {other:?}"),
    }
    assert_eq!(delivery.sent(), vec![(EMAIL.to_owned(), out.code)]);
}

#[tokio::test]
async fn should_treat_unknown_identifier_like_known_one() {
    let store = MemoryResetStore::new();
    let delivery = MockDelivery::default();

    let out = usecase(&store, &delivery)
        .execute(input("nobody@x.com"))
        .await
        .unwrap();

    // Same outcome shape and stored state, but nothing leaves the process.
    assert_eq!(out.code.len(), 6);
    assert!(matches!(
        store.get("nobody@x.com").await.unwrap(),
        Some(ResetRecord::Challenge(_))
    ));
    assert!(delivery.sent().is_empty());
}

#[tokio::test]
async fn should_replace_previous_challenge() {
    let store = MemoryResetStore::new();
    let delivery = MockDelivery::default();
    let uc = usecase(&store, &delivery);

    uc.execute(input(EMAIL)).await.unwrap();
    let second = uc.execute(input(EMAIL)).await.unwrap();

    match store.get(EMAIL).await.unwrap() {
        Some(ResetRecord::Challenge(c)) => assert_eq!(c.code, second.code),
        other => panic!("expected challenge, got {other:?}"),
    }
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn should_supersede_outstanding_token() {
    let store = MemoryResetStore::new();
    let delivery = MockDelivery::default();
    store
        .put(&ResetRecord::Token(ResetToken {
            identifier: EMAIL.into(),
            secret: "outstanding".into(),
            issued_at: epoch(),
        }))
        .await
        .unwrap();

    usecase(&store, &delivery).execute(input(EMAIL)).await.unwrap();

    assert!(matches!(
        store.get(EMAIL).await.unwrap(),
        Some(ResetRecord::Challenge(_))
    ));
}

#[tokio::test]
async fn should_reject_malformed_identifier_without_touching_store() {
    let store = MemoryResetStore::new();
    let delivery = MockDelivery::default();
    let uc = usecase(&store, &delivery);

    let too_long = "a".repeat(300);
    for bad in ["", "a b@x.com", too_long.as_str()] {
        let err = uc.execute(input(bad)).await.unwrap_err();
        assert!(matches!(err, ResetError::Validation(_)), "{bad:?}: {err:?}");
    }
    assert!(store.is_empty());
    assert!(delivery.sent().is_empty());
}
