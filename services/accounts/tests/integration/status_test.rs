use chrono::Duration;
use uuid::Uuid;

use inkpost_accounts::domain::repository::StatusLedger;
use inkpost_accounts::error::AccountsServiceError;
use inkpost_accounts::usecase::auth::LoginBlock;
use inkpost_accounts::usecase::status::{
    ChangeStatusInput, ChangeStatusUseCase, GetCurrentStatusUseCase, GetStatusHistoryUseCase,
};
use inkpost_core::clock::Clock;
use inkpost_domain::user::UserStatus;
use inkpost_testing::clock::ManualClock;

use crate::helpers::{MemoryStore, can_login_usecase, login_usecase, signup};

fn change_status(store: &MemoryStore) -> ChangeStatusUseCase<MemoryStore, MemoryStore> {
    ChangeStatusUseCase {
        accounts: store.clone(),
        ledger: store.clone(),
    }
}

fn input(status: UserStatus, reason: &str, actor: Option<Uuid>) -> ChangeStatusInput {
    ChangeStatusInput {
        status,
        reason: Some(reason.to_owned()),
        actor,
    }
}

#[tokio::test]
async fn should_reject_login_for_suspended_user() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;

    clock.advance(Duration::minutes(1));
    change_status(&store)
        .execute(
            account.id(),
            input(UserStatus::Suspended, "spam", Some(account.id())),
            clock.now(),
        )
        .await
        .unwrap();

    let err = login_usecase(&store)
        .execute("alice@example.com", "secret1", clock.now())
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsServiceError::AccountNotActive));
    assert!(
        !can_login_usecase(&store)
            .execute(account.id(), clock.now())
            .await
            .unwrap()
    );

    let current = GetCurrentStatusUseCase {
        accounts: store.clone(),
        ledger: store.clone(),
    }
    .execute(account.id())
    .await
    .unwrap()
    .unwrap();
    assert_eq!(current.status, UserStatus::Suspended);
    assert_eq!(current.reason.as_deref(), Some("spam"));
    assert_eq!(current.changed_by_user_id, Some(account.id()));

    let history = GetStatusHistoryUseCase {
        accounts: store.clone(),
        ledger: store.clone(),
    }
    .execute(account.id())
    .await
    .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, UserStatus::Suspended);
    assert_eq!(history[1].status, UserStatus::Active);
}

#[tokio::test]
async fn should_reset_failure_counter_even_when_not_active() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    let login = login_usecase(&store);

    let _ = login
        .execute("alice@example.com", "wrong-password", clock.now())
        .await;
    change_status(&store)
        .execute(
            account.id(),
            input(UserStatus::Deleted, "closed", None),
            clock.now(),
        )
        .await
        .unwrap();

    let err = login
        .execute("alice@example.com", "secret1", clock.now())
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsServiceError::AccountNotActive));

    let credential = store.credential(account.id());
    assert_eq!(credential.failed_login_attempts, 0);
    assert_eq!(credential.last_login_at, Some(clock.now()));
}

#[tokio::test]
async fn should_append_without_touching_earlier_records() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    let before = store.history(account.id()).await.unwrap();

    for status in [UserStatus::Suspended, UserStatus::Suspended, UserStatus::Active] {
        clock.advance(Duration::seconds(1));
        change_status(&store)
            .execute(account.id(), input(status, "review", None), clock.now())
            .await
            .unwrap();
    }

    let after = store.history(account.id()).await.unwrap();
    assert_eq!(after.len(), before.len() + 3);
    assert_eq!(after.last(), before.last());
    assert!(after.windows(2).all(|w| w[0].id > w[1].id));
    assert_eq!(after[0].status, UserStatus::Active);
    assert_eq!(after[1].status, UserStatus::Suspended);
    assert_eq!(after[2].status, UserStatus::Suspended);

    assert!(
        can_login_usecase(&store)
            .execute(account.id(), clock.now())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn should_take_latest_append_as_current_even_with_equal_timestamps() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    let account = signup(&store, "alice@example.com", "secret1", "alice", now).await;

    change_status(&store)
        .execute(account.id(), input(UserStatus::Suspended, "a", None), now)
        .await
        .unwrap();
    change_status(&store)
        .execute(account.id(), input(UserStatus::Active, "b", None), now)
        .await
        .unwrap();

    let current = store.current(account.id()).await.unwrap().unwrap();
    assert_eq!(current.status, UserStatus::Active);
    assert_eq!(current.reason.as_deref(), Some("b"));
}

#[tokio::test]
async fn should_store_blank_reason_as_none() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    let account = signup(&store, "alice@example.com", "secret1", "alice", now).await;

    let record = change_status(&store)
        .execute(account.id(), input(UserStatus::Suspended, "   ", None), now)
        .await
        .unwrap();
    assert_eq!(record.reason, None);
}

#[tokio::test]
async fn should_fail_status_operations_for_unknown_user() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    let missing = Uuid::now_v7();

    let err = change_status(&store)
        .execute(missing, input(UserStatus::Suspended, "spam", None), now)
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsServiceError::UserNotFound));

    let err = GetStatusHistoryUseCase {
        accounts: store.clone(),
        ledger: store.clone(),
    }
    .execute(missing)
    .await
    .unwrap_err();
    assert!(matches!(err, AccountsServiceError::UserNotFound));
    assert_eq!(store.status_count(), 0);
}

#[tokio::test]
async fn should_append_initial_active_record() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    let user_id = Uuid::now_v7();

    let record = store.append_initial(user_id, now, None).await.unwrap();

    assert_eq!(record.status, UserStatus::Active);
    assert_eq!(record.reason.as_deref(), Some("Initial status"));
    assert_eq!(store.current(user_id).await.unwrap(), Some(record));
}

#[tokio::test]
async fn should_report_inactive_status_before_lock() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    let login = login_usecase(&store);

    change_status(&store)
        .execute(
            account.id(),
            input(UserStatus::Suspended, "spam", None),
            clock.now(),
        )
        .await
        .unwrap();
    let can_login = can_login_usecase(&store);
    assert_eq!(
        can_login.blocked_by(account.id(), clock.now()).await.unwrap(),
        Some(LoginBlock::NotActive)
    );

    for _ in 0..5 {
        let _ = login
            .execute("alice@example.com", "wrong-password", clock.now())
            .await;
    }
    assert!(store.credential(account.id()).locked_until.is_some());
    assert_eq!(
        can_login.blocked_by(account.id(), clock.now()).await.unwrap(),
        Some(LoginBlock::NotActive)
    );
}
