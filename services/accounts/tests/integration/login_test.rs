use chrono::Duration;

use inkpost_accounts::domain::repository::CredentialRepository;
use inkpost_accounts::error::AccountsServiceError;
use inkpost_accounts::usecase::auth::LoginBlock;
use inkpost_accounts::usecase::credential::UnlockAccountUseCase;
use inkpost_core::clock::Clock;
use inkpost_testing::clock::ManualClock;

use crate::helpers::{MemoryStore, can_login_usecase, login_usecase, signup};

#[tokio::test]
async fn should_lock_after_five_failures_until_window_passes() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    let login = login_usecase(&store);

    for _ in 0..5 {
        let err = login
            .execute("alice@example.com", "wrong-password", clock.now())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountsServiceError::InvalidCredentials));
    }

    let credential = store.credential(account.id());
    assert_eq!(credential.failed_login_attempts, 5);
    assert_eq!(credential.locked_until, Some(clock.now() + Duration::minutes(30)));

    // Correct password is still rejected, indistinguishably, while locked.
    let err = login
        .execute("alice@example.com", "secret1", clock.now())
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsServiceError::InvalidCredentials));
    assert!(
        !can_login_usecase(&store)
            .execute(account.id(), clock.now())
            .await
            .unwrap()
    );

    clock.advance(Duration::minutes(31));
    let user_id = login
        .execute("alice@example.com", "secret1", clock.now())
        .await
        .unwrap();
    assert_eq!(user_id, account.id());

    let credential = store.credential(account.id());
    assert_eq!(credential.failed_login_attempts, 0);
    assert_eq!(credential.locked_until, None);
}

#[tokio::test]
async fn should_not_count_attempts_made_while_locked() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    let login = login_usecase(&store);

    for _ in 0..8 {
        let _ = login
            .execute("alice@example.com", "wrong-password", clock.now())
            .await;
    }

    assert_eq!(store.credential(account.id()).failed_login_attempts, 5);
}

#[tokio::test]
async fn should_reset_failures_and_stamp_last_login_on_success() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    let login = login_usecase(&store);

    for _ in 0..3 {
        let _ = login
            .execute("alice@example.com", "wrong-password", clock.now())
            .await;
    }
    assert_eq!(store.credential(account.id()).failed_login_attempts, 3);

    clock.advance(Duration::seconds(10));
    login
        .execute("alice@example.com", "secret1", clock.now())
        .await
        .unwrap();

    let credential = store.credential(account.id());
    assert_eq!(credential.failed_login_attempts, 0);
    assert_eq!(credential.last_login_at, Some(clock.now()));
}

#[tokio::test]
async fn should_reject_unknown_email_like_a_wrong_password() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    signup(&store, "alice@example.com", "secret1", "alice", now).await;
    let login = login_usecase(&store);

    let unknown = login
        .execute("nobody@example.com", "secret1", now)
        .await
        .unwrap_err();
    let wrong = login
        .execute("alice@example.com", "secret2", now)
        .await
        .unwrap_err();

    assert_eq!(unknown.kind(), wrong.kind());
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn should_match_email_case_sensitively_on_login() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    signup(&store, "alice@example.com", "secret1", "alice", now).await;

    let err = login_usecase(&store)
        .execute("ALICE@example.com", "secret1", now)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsServiceError::InvalidCredentials));
}

#[tokio::test]
async fn should_unlock_account_immediately() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    let login = login_usecase(&store);

    for _ in 0..5 {
        let _ = login
            .execute("alice@example.com", "wrong-password", clock.now())
            .await;
    }
    assert!(store.is_locked(account.id(), clock.now()).await.unwrap());

    UnlockAccountUseCase {
        credentials: store.clone(),
    }
    .execute(account.id(), clock.now())
    .await
    .unwrap();

    let credential = store.credential(account.id());
    assert_eq!(credential.failed_login_attempts, 0);
    assert_eq!(credential.locked_until, None);
    login
        .execute("alice@example.com", "secret1", clock.now())
        .await
        .unwrap();
}

#[tokio::test]
async fn should_fail_unlock_for_unknown_user() {
    let store = MemoryStore::new();
    let err = UnlockAccountUseCase {
        credentials: store.clone(),
    }
    .execute(uuid::Uuid::now_v7(), ManualClock::fixed().now())
    .await
    .unwrap_err();
    assert!(matches!(err, AccountsServiceError::UserNotFound));
}

#[tokio::test]
async fn should_report_lock_as_the_reason_login_is_refused() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    let login = login_usecase(&store);
    let can_login = can_login_usecase(&store);

    assert_eq!(can_login.blocked_by(account.id(), clock.now()).await.unwrap(), None);

    for _ in 0..5 {
        let _ = login
            .execute("alice@example.com", "wrong-password", clock.now())
            .await;
    }
    assert_eq!(
        can_login.blocked_by(account.id(), clock.now()).await.unwrap(),
        Some(LoginBlock::Locked)
    );

    clock.advance(Duration::minutes(30));
    assert_eq!(can_login.blocked_by(account.id(), clock.now()).await.unwrap(), None);
}
