use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use inkpost_accounts::domain::repository::{AccountRepository, CredentialRepository, StatusLedger};
use inkpost_accounts::domain::types::{ProfileChanges, UserFilter};
use inkpost_accounts::error::AccountsServiceError;
use inkpost_accounts::usecase::credential::UpdateEmailUseCase;
use inkpost_accounts::usecase::status::{ChangeStatusInput, ChangeStatusUseCase};
use inkpost_accounts::usecase::user::{
    DeleteUserUseCase, GetUserUseCase, ListUsersUseCase, UpdateUserInput, UpdateUserUseCase,
};
use inkpost_core::clock::Clock;
use inkpost_domain::pagination::PageRequest;
use inkpost_domain::user::UserStatus;
use inkpost_testing::clock::ManualClock;

use crate::helpers::{MemoryStore, signup, validation_errors};

fn update_user(store: &MemoryStore) -> UpdateUserUseCase<MemoryStore, MemoryStore> {
    UpdateUserUseCase {
        accounts: store.clone(),
        credentials: store.clone(),
    }
}

async fn list(store: &MemoryStore, filter: UserFilter) -> Vec<String> {
    ListUsersUseCase {
        accounts: store.clone(),
    }
    .execute(filter, PageRequest::default())
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.profile.username)
    .collect()
}

#[tokio::test]
async fn should_update_email_and_profile_together() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let account = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;

    clock.advance(Duration::hours(1));
    let updated = update_user(&store)
        .execute(
            account.id(),
            UpdateUserInput {
                email: Some("alice@new.example.com".to_owned()),
                profile: ProfileChanges {
                    bio: Some(Some("hello".to_owned())),
                    birth_date: Some(NaiveDate::from_ymd_opt(2000, 1, 1)),
                    ..Default::default()
                },
            },
            clock.now(),
        )
        .await
        .unwrap();

    assert_eq!(updated.credential.email, "alice@new.example.com");
    assert_eq!(updated.profile.username, "alice");
    assert_eq!(updated.profile.bio.as_deref(), Some("hello"));
    assert_eq!(updated.profile.updated_at, clock.now());
    assert_eq!(
        updated.full_profile(clock.now().date_naive()).profile.age,
        Some(25)
    );
}

#[tokio::test]
async fn should_reject_update_atomically_with_aggregated_errors() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    signup(&store, "bob@example.com", "secret1", "bob", now).await;
    let account = signup(&store, "alice@example.com", "secret1", "alice", now).await;

    let err = update_user(&store)
        .execute(
            account.id(),
            UpdateUserInput {
                email: Some("bob@example.com".to_owned()),
                profile: ProfileChanges {
                    username: Some(String::new()),
                    website_url: Some(Some("ftp://alice.dev".to_owned())),
                    ..Default::default()
                },
            },
            now,
        )
        .await
        .unwrap_err();

    assert_eq!(
        validation_errors(err),
        vec![
            "Email has already been taken",
            "Username can't be blank",
            "Website url is invalid",
        ]
    );
    let unchanged = store.find(account.id()).await.unwrap().unwrap();
    assert_eq!(unchanged, account);
}

#[tokio::test]
async fn should_ignore_unchanged_email_on_update() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    let account = signup(&store, "alice@example.com", "secret1", "alice", now).await;

    let updated = update_user(&store)
        .execute(
            account.id(),
            UpdateUserInput {
                email: Some("alice@example.com".to_owned()),
                profile: ProfileChanges {
                    username: Some("alice2".to_owned()),
                    ..Default::default()
                },
            },
            now,
        )
        .await
        .unwrap();

    assert_eq!(updated.credential.email, "alice@example.com");
    assert_eq!(updated.profile.username, "alice2");
}

#[tokio::test]
async fn should_update_email_through_credential_usecase() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    signup(&store, "bob@example.com", "secret1", "bob", now).await;
    let account = signup(&store, "alice@example.com", "secret1", "alice", now).await;
    let usecase = UpdateEmailUseCase {
        credentials: store.clone(),
    };

    let err = usecase
        .execute(account.id(), "bob@example.com", now)
        .await
        .unwrap_err();
    assert_eq!(validation_errors(err), vec!["Email has already been taken"]);

    let err = usecase
        .execute(account.id(), "broken", now)
        .await
        .unwrap_err();
    assert_eq!(validation_errors(err), vec!["Email is invalid"]);

    usecase
        .execute(account.id(), "alice@example.com", now)
        .await
        .unwrap();
    usecase
        .execute(account.id(), "alice@elsewhere.com", now)
        .await
        .unwrap();
    let credential = store.find_by_email("alice@elsewhere.com").await.unwrap().unwrap();
    assert_eq!(credential.user_id, account.id());
    assert!(store.find_by_email("alice@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn should_filter_users_by_current_status_and_query() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    let alice = signup(&store, "alice@example.com", "secret1", "alice", clock.now()).await;
    clock.advance(Duration::seconds(1));
    let bob = signup(&store, "bob@example.com", "secret1", "bob", clock.now()).await;
    clock.advance(Duration::seconds(1));
    signup(&store, "carol@corp.test", "secret1", "Carol", clock.now()).await;

    let change = ChangeStatusUseCase {
        accounts: store.clone(),
        ledger: store.clone(),
    };
    for (id, status) in [
        (alice.id(), UserStatus::Suspended),
        (bob.id(), UserStatus::Suspended),
        (bob.id(), UserStatus::Active),
    ] {
        change
            .execute(
                id,
                ChangeStatusInput {
                    status,
                    reason: None,
                    actor: None,
                },
                clock.now(),
            )
            .await
            .unwrap();
    }

    assert_eq!(
        list(&store, UserFilter::default()).await,
        vec!["alice", "bob", "Carol"]
    );
    assert_eq!(
        list(
            &store,
            UserFilter {
                status: Some(UserStatus::Suspended),
                query: None,
            }
        )
        .await,
        vec!["alice"]
    );
    assert_eq!(
        list(
            &store,
            UserFilter {
                status: None,
                query: Some("example.com".to_owned()),
            }
        )
        .await,
        vec!["alice", "bob"]
    );
    assert_eq!(
        list(
            &store,
            UserFilter {
                status: None,
                query: Some("carol".to_owned()),
            }
        )
        .await,
        vec!["Carol"]
    );
    assert!(
        list(
            &store,
            UserFilter {
                status: None,
                query: Some("ALICE".to_owned()),
            }
        )
        .await
        .is_empty()
    );
    assert!(
        list(
            &store,
            UserFilter {
                status: Some(UserStatus::Active),
                query: Some("alice".to_owned()),
            }
        )
        .await
        .is_empty()
    );
}

#[tokio::test]
async fn should_paginate_in_creation_order() {
    let store = MemoryStore::new();
    let clock = ManualClock::fixed();
    for i in 0..5 {
        clock.advance(Duration::seconds(1));
        signup(
            &store,
            &format!("user{i}@example.com"),
            "secret1",
            &format!("user{i}"),
            clock.now(),
        )
        .await;
    }

    let page = ListUsersUseCase {
        accounts: store.clone(),
    }
    .execute(
        UserFilter::default(),
        PageRequest {
            per_page: 2,
            page: 2,
        },
    )
    .await
    .unwrap();

    let names: Vec<_> = page.into_iter().map(|a| a.profile.username).collect();
    assert_eq!(names, vec!["user2", "user3"]);
}

#[tokio::test]
async fn should_delete_user_and_everything_it_owns() {
    let store = MemoryStore::new();
    let now = ManualClock::fixed().now();
    let account = signup(&store, "alice@example.com", "secret1", "alice", now).await;
    let delete = DeleteUserUseCase {
        accounts: store.clone(),
    };

    delete.execute(account.id()).await.unwrap();

    let err = GetUserUseCase {
        accounts: store.clone(),
    }
    .execute(account.id())
    .await
    .unwrap_err();
    assert!(matches!(err, AccountsServiceError::UserNotFound));
    assert!(store.find_by_user_id(account.id()).await.unwrap().is_none());
    assert!(store.history(account.id()).await.unwrap().is_empty());
    assert!(store.find_by_email("alice@example.com").await.unwrap().is_none());

    let err = delete.execute(account.id()).await.unwrap_err();
    assert!(matches!(err, AccountsServiceError::UserNotFound));
}

#[tokio::test]
async fn should_fail_update_for_unknown_user() {
    let store = MemoryStore::new();
    let err = update_user(&store)
        .execute(
            Uuid::now_v7(),
            UpdateUserInput::default(),
            ManualClock::fixed().now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccountsServiceError::UserNotFound));
}
