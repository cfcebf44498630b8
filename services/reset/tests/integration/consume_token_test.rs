use chrono::Duration;

use reclaim_reset::domain::repository::ResetRecordStore;
use reclaim_reset::domain::token_store::TokenStore;
use reclaim_reset::domain::types::ResetRecord;
use reclaim_reset::error::{ResetError, TokenRejection};
use reclaim_reset::infra::memory::MemoryResetStore;
use reclaim_reset::usecase::consume_token::{ConsumeTokenInput, ConsumeTokenUseCase};

use crate::helpers::{CredentialMode, EMAIL, ManualClock, MockCredentialStore, NEW_PASSWORD, epoch};

async fn issued() -> (MemoryResetStore, String) {
    let store = MemoryResetStore::new();
    let token = TokenStore::new(&store).issue(EMAIL, epoch()).await.unwrap();
    (store, token)
}

fn usecase(
    store: &MemoryResetStore,
    credentials: &MockCredentialStore,
    clock: &ManualClock,
) -> ConsumeTokenUseCase<MemoryResetStore, MockCredentialStore, ManualClock> {
    ConsumeTokenUseCase {
        records: store.clone(),
        credentials: credentials.clone(),
        clock: clock.clone(),
    }
}

fn input(token: &str, password: &str, confirmation: &str) -> ConsumeTokenInput {
    ConsumeTokenInput {
        identifier: EMAIL.to_owned(),
        token: token.to_owned(),
        new_credential: password.to_owned(),
        new_credential_confirmation: confirmation.to_owned(),
    }
}

fn rejection(err: ResetError) -> TokenRejection {
    match err {
        ResetError::Unauthorized(reason) => reason,
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn should_update_credential_exactly_once() {
    let (store, token) = issued().await;
    let credentials = MockCredentialStore::accepting();
    let clock = ManualClock::at(epoch());
    let uc = usecase(&store, &credentials, &clock);

    uc.execute(input(&token, NEW_PASSWORD, NEW_PASSWORD))
        .await
        .unwrap();
    assert_eq!(
        credentials.writes.lock().unwrap().as_slice(),
        &[(EMAIL.to_owned(), NEW_PASSWORD.to_owned())]
    );
    assert!(store.get(EMAIL).await.unwrap().is_none());

    let again = uc
        .execute(input(&token, NEW_PASSWORD, NEW_PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(rejection(again), TokenRejection::NotFound);
    assert_eq!(credentials.write_count(), 1);
}

#[tokio::test]
async fn should_reject_wrong_token() {
    let (store, _) = issued().await;
    let credentials = MockCredentialStore::accepting();
    let clock = ManualClock::at(epoch());

    let err = usecase(&store, &credentials, &clock)
        .execute(input("not-the-token", NEW_PASSWORD, NEW_PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(rejection(err), TokenRejection::Mismatch);
    assert_eq!(credentials.write_count(), 0);
    assert!(matches!(
        store.get(EMAIL).await.unwrap(),
        Some(ResetRecord::Token(_))
    ));
}

#[tokio::test]
async fn should_reject_and_remove_expired_token() {
    let (store, token) = issued().await;
    let credentials = MockCredentialStore::accepting();
    let clock = ManualClock::at(epoch());
    clock.advance(Duration::seconds(601));

    let err = usecase(&store, &credentials, &clock)
        .execute(input(&token, NEW_PASSWORD, NEW_PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(rejection(err), TokenRejection::Expired);
    assert!(store.get(EMAIL).await.unwrap().is_none());
    assert_eq!(credentials.write_count(), 0);
}

#[tokio::test]
async fn should_reject_missing_bearer() {
    let (store, _) = issued().await;
    let credentials = MockCredentialStore::accepting();
    let clock = ManualClock::at(epoch());

    let err = usecase(&store, &credentials, &clock)
        .execute(input("", NEW_PASSWORD, NEW_PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(rejection(err), TokenRejection::Missing);
}

#[tokio::test]
async fn should_validate_credential_before_touching_store() {
    let (store, token) = issued().await;
    let credentials = MockCredentialStore::accepting();
    let clock = ManualClock::at(epoch());
    let uc = usecase(&store, &credentials, &clock);

    for (password, confirmation) in [("longenough1", "longenough2"), ("short", "short"), ("", "")] {
        let err = uc
            .execute(input(&token, password, confirmation))
            .await
            .unwrap_err();
        assert!(matches!(err, ResetError::Validation(_)), "{err:?}");
    }

    // The token survives every rejected attempt.
    assert!(
        uc.execute(input(&token, NEW_PASSWORD, NEW_PASSWORD))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn should_restore_token_when_credential_store_fails() {
    let (store, token) = issued().await;
    let clock = ManualClock::at(epoch());

    let failing = MockCredentialStore::new(CredentialMode::Fail);
    let err = usecase(&store, &failing, &clock)
        .execute(input(&token, NEW_PASSWORD, NEW_PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, ResetError::DownstreamFailure(_)));

    // Retry with the same token once the collaborator recovers.
    let credentials = MockCredentialStore::accepting();
    usecase(&store, &credentials, &clock)
        .execute(input(&token, NEW_PASSWORD, NEW_PASSWORD))
        .await
        .unwrap();
    assert_eq!(credentials.write_count(), 1);
}

#[tokio::test]
async fn should_consume_token_when_account_vanished() {
    let (store, token) = issued().await;
    let credentials = MockCredentialStore::new(CredentialMode::UnknownAccount);
    let clock = ManualClock::at(epoch());

    let err = usecase(&store, &credentials, &clock)
        .execute(input(&token, NEW_PASSWORD, NEW_PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(rejection(err), TokenRejection::UnknownAccount);
    assert!(store.get(EMAIL).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_consumption_succeeds_once() {
    let (store, token) = issued().await;
    let credentials = MockCredentialStore::accepting();
    let clock = ManualClock::at(epoch());

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let uc = usecase(&store, &credentials, &clock);
            let req = input(&token, NEW_PASSWORD, NEW_PASSWORD);
            tokio::spawn(async move { uc.execute(req).await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => ok += 1,
            Err(ResetError::Unauthorized(_)) => {}
            Err(e) => panic!("unexpected error {e:?}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(credentials.write_count(), 1);
}
