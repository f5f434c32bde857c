use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, SqlErr, Statement, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use inkpost_accounts_schema::{
    is_immutable_violation, user_credentials, user_profiles, user_statuses, users,
};
use inkpost_core::sea_ext::FilterIfPresent;
use inkpost_domain::pagination::PageRequest;
use inkpost_domain::user::UserStatus;

use crate::domain::repository::{AccountRepository, CredentialRepository, StatusLedger};
use crate::domain::types::{
    Account, AccountUpdate, Credential, LockoutPolicy, NewAccount, NewStatusRecord, Profile,
    StatusRecord, User, UserFilter,
};
use crate::domain::validation::EMAIL_TAKEN;
use crate::error::AccountsServiceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// The only unique column a client controls is `user_credentials.email`.
fn write_error(err: DbErr, context: &'static str) -> AccountsServiceError {
    if is_unique_violation(&err) {
        AccountsServiceError::validation(EMAIL_TAKEN)
    } else if is_immutable_violation(&err) {
        AccountsServiceError::ImmutableRecord
    } else {
        anyhow::Error::new(err).context(context).into()
    }
}

fn transaction_error(
    err: TransactionError<DbErr>,
    context: &'static str,
) -> AccountsServiceError {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => {
            write_error(e, context)
        }
    }
}

// ── Account repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn create(&self, account: &NewAccount) -> Result<Account, AccountsServiceError> {
        self.db
            .transaction::<_, Account, DbErr>(|txn| {
                let account = account.clone();
                Box::pin(async move { insert_account(txn, &account).await })
            })
            .await
            .map_err(|e| transaction_error(e, "create account"))
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<Account>, AccountsServiceError> {
        let Some(user) = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .context("find user by id")?
        else {
            return Ok(None);
        };
        Ok(load_accounts(&self.db, vec![user]).await?.pop())
    }

    async fn exists(&self, user_id: Uuid) -> Result<bool, AccountsServiceError> {
        let count = users::Entity::find_by_id(user_id)
            .count(&self.db)
            .await
            .context("check user exists")?;
        Ok(count > 0)
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Vec<Account>, AccountsServiceError> {
        let users = list_query(filter, page)
            .all(&self.db)
            .await
            .context("list users")?;
        load_accounts(&self.db, users).await
    }

    async fn update(
        &self,
        user_id: Uuid,
        update: &AccountUpdate,
    ) -> Result<Account, AccountsServiceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let update = update.clone();
                Box::pin(async move { apply_update(txn, user_id, &update).await })
            })
            .await
            .map_err(|e| transaction_error(e, "update account"))?;

        self.find(user_id)
            .await?
            .ok_or(AccountsServiceError::UserNotFound)
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool, AccountsServiceError> {
        let result = users::Entity::delete_by_id(user_id)
            .exec(&self.db)
            .await
            .map_err(|e| write_error(e, "delete user"))?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_account(
    txn: &DatabaseTransaction,
    account: &NewAccount,
) -> Result<Account, DbErr> {
    let now = account.created_at;

    let user = users::ActiveModel {
        id: Set(account.user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    let credential = user_credentials::ActiveModel {
        user_id: Set(account.user_id),
        email: Set(account.email.clone()),
        password_digest: Set(account.password_digest.clone()),
        failed_login_attempts: Set(0),
        locked_until: Set(None),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    let attrs = &account.profile;
    let profile = user_profiles::ActiveModel {
        user_id: Set(account.user_id),
        username: Set(attrs.username.clone()),
        bio: Set(attrs.bio.clone()),
        avatar_url: Set(attrs.avatar_url.clone()),
        website_url: Set(attrs.website_url.clone()),
        birth_date: Set(attrs.birth_date),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    let status = insert_status(txn, &NewStatusRecord::initial(account.user_id, now, None)).await?;

    Ok(Account {
        user: user_from_model(user),
        credential: credential_from_model(credential),
        profile: profile_from_model(profile),
        current_status: Some(status),
    })
}

async fn apply_update(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    update: &AccountUpdate,
) -> Result<(), DbErr> {
    if let Some(email) = &update.email {
        user_credentials::ActiveModel {
            user_id: Set(user_id),
            email: Set(email.clone()),
            updated_at: Set(update.updated_at),
            ..Default::default()
        }
        .update(txn)
        .await?;
    }

    let attrs = &update.profile;
    user_profiles::ActiveModel {
        user_id: Set(user_id),
        username: Set(attrs.username.clone()),
        bio: Set(attrs.bio.clone()),
        avatar_url: Set(attrs.avatar_url.clone()),
        website_url: Set(attrs.website_url.clone()),
        birth_date: Set(attrs.birth_date),
        updated_at: Set(update.updated_at),
        ..Default::default()
    }
    .update(txn)
    .await?;

    users::ActiveModel {
        id: Set(user_id),
        updated_at: Set(update.updated_at),
        ..Default::default()
    }
    .update(txn)
    .await?;
    Ok(())
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn list_query(filter: &UserFilter, page: PageRequest) -> Select<users::Entity> {
    users::Entity::find()
        .filter_if_present(filter.status, |q, status| {
            q.filter(Expr::cust_with_values(
                r#"(SELECT s.status FROM user_statuses s WHERE s.user_id = "users"."id" ORDER BY s.id DESC LIMIT 1) = $1"#,
                [status.as_i16()],
            ))
        })
        .filter_if_present(filter.query.as_deref(), |q, text| {
            let pattern = format!("%{}%", escape_like(text));
            q.filter(Expr::cust_with_values(
                r#"(EXISTS (SELECT 1 FROM user_credentials c WHERE c.user_id = "users"."id" AND c.email LIKE $1) OR EXISTS (SELECT 1 FROM user_profiles p WHERE p.user_id = "users"."id" AND p.username LIKE $2))"#,
                [pattern.clone(), pattern],
            ))
        })
        .order_by_asc(users::Column::CreatedAt)
        .order_by_asc(users::Column::Id)
        .offset(page.offset())
        .limit(page.limit())
}

/// Attach credential, profile and current status to each user, keeping order.
async fn load_accounts(
    db: &DatabaseConnection,
    users: Vec<users::Model>,
) -> Result<Vec<Account>, AccountsServiceError> {
    if users.is_empty() {
        return Ok(vec![]);
    }
    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

    let mut credentials: HashMap<Uuid, user_credentials::Model> = user_credentials::Entity::find()
        .filter(user_credentials::Column::UserId.is_in(ids.clone()))
        .all(db)
        .await
        .context("load credentials")?
        .into_iter()
        .map(|m| (m.user_id, m))
        .collect();

    let mut profiles: HashMap<Uuid, user_profiles::Model> = user_profiles::Entity::find()
        .filter(user_profiles::Column::UserId.is_in(ids.clone()))
        .all(db)
        .await
        .context("load profiles")?
        .into_iter()
        .map(|m| (m.user_id, m))
        .collect();

    let latest = Query::select()
        .expr(Expr::col(user_statuses::Column::Id).max())
        .from(user_statuses::Entity)
        .and_where(user_statuses::Column::UserId.is_in(ids))
        .group_by_col(user_statuses::Column::UserId)
        .to_owned();
    let mut statuses: HashMap<Uuid, StatusRecord> = user_statuses::Entity::find()
        .filter(user_statuses::Column::Id.in_subquery(latest))
        .all(db)
        .await
        .context("load current statuses")?
        .into_iter()
        .map(|m| status_from_model(m).map(|r| (r.user_id, r)))
        .collect::<Result<HashMap<_, _>, DbErr>>()
        .context("decode current statuses")?;

    users
        .into_iter()
        .map(|user| -> Result<Account, AccountsServiceError> {
            let credential = credentials
                .remove(&user.id)
                .with_context(|| format!("user {} has no credential", user.id))?;
            let profile = profiles
                .remove(&user.id)
                .with_context(|| format!("user {} has no profile", user.id))?;
            Ok(Account {
                current_status: statuses.remove(&user.id),
                user: user_from_model(user),
                credential: credential_from_model(credential),
                profile: profile_from_model(profile),
            })
        })
        .collect()
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn credential_from_model(model: user_credentials::Model) -> Credential {
    Credential {
        user_id: model.user_id,
        email: model.email,
        password_digest: model.password_digest,
        failed_login_attempts: model.failed_login_attempts,
        locked_until: model.locked_until,
        last_login_at: model.last_login_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn profile_from_model(model: user_profiles::Model) -> Profile {
    Profile {
        user_id: model.user_id,
        username: model.username,
        bio: model.bio,
        avatar_url: model.avatar_url,
        website_url: model.website_url,
        birth_date: model.birth_date,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn status_from_model(model: user_statuses::Model) -> Result<StatusRecord, DbErr> {
    let status = UserStatus::from_i16(model.status)
        .ok_or_else(|| DbErr::Type(format!("unknown user status value {}", model.status)))?;
    Ok(StatusRecord {
        id: model.id,
        user_id: model.user_id,
        status,
        reason: model.reason,
        changed_by_user_id: model.changed_by_user_id,
        effective_at: model.effective_at,
        created_at: model.created_at,
    })
}

// ── Credential repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCredentialRepository {
    pub db: DatabaseConnection,
}

// One statement so the increment and the lock decision cannot interleave with
// another attempt. SET expressions see the pre-update row.
const RECORD_FAILURE_SQL: &str = r#"
UPDATE user_credentials
SET failed_login_attempts = failed_login_attempts + 1,
    locked_until = CASE
        WHEN failed_login_attempts + 1 >= $2 THEN $3
        ELSE locked_until
    END,
    updated_at = $4
WHERE user_id = $1
RETURNING failed_login_attempts
"#;

#[derive(Debug, FromQueryResult)]
struct FailureCount {
    failed_login_attempts: i32,
}

impl CredentialRepository for DbCredentialRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AccountsServiceError> {
        let model = user_credentials::Entity::find()
            .filter(user_credentials::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find credential by email")?;
        Ok(model.map(credential_from_model))
    }

    async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Credential>, AccountsServiceError> {
        let model = user_credentials::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .context("find credential by user id")?;
        Ok(model.map(credential_from_model))
    }

    async fn email_taken(
        &self,
        email: &str,
        except: Option<Uuid>,
    ) -> Result<bool, AccountsServiceError> {
        let count = user_credentials::Entity::find()
            .filter(user_credentials::Column::Email.eq(email))
            .filter_if_present(except, |q, id| {
                q.filter(user_credentials::Column::UserId.ne(id))
            })
            .count(&self.db)
            .await
            .context("count credentials by email")?;
        Ok(count > 0)
    }

    async fn update_email(
        &self,
        user_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AccountsServiceError> {
        user_credentials::ActiveModel {
            user_id: Set(user_id),
            email: Set(email.to_owned()),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| write_error(e, "update credential email"))?;
        Ok(())
    }

    async fn record_success(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AccountsServiceError> {
        user_credentials::ActiveModel {
            user_id: Set(user_id),
            failed_login_attempts: Set(0),
            locked_until: Set(None),
            last_login_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("record login success")?;
        Ok(())
    }

    async fn record_failure(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        policy: &LockoutPolicy,
    ) -> Result<bool, AccountsServiceError> {
        let lock_until = now + policy.lock_duration;
        let row = FailureCount::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            RECORD_FAILURE_SQL,
            [
                user_id.into(),
                policy.max_failed_attempts.into(),
                lock_until.into(),
                now.into(),
            ],
        ))
        .one(&self.db)
        .await
        .context("record login failure")?;

        Ok(row.is_some_and(|r| policy.lock_expiry(r.failed_login_attempts, now).is_some()))
    }

    async fn unlock(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<(), AccountsServiceError> {
        user_credentials::ActiveModel {
            user_id: Set(user_id),
            failed_login_attempts: Set(0),
            locked_until: Set(None),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("unlock credential")?;
        Ok(())
    }
}

// ── Status ledger ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStatusLedger {
    pub db: DatabaseConnection,
}

async fn insert_status<C: ConnectionTrait>(
    db: &C,
    record: &NewStatusRecord,
) -> Result<StatusRecord, DbErr> {
    let model = user_statuses::ActiveModel {
        user_id: Set(record.user_id),
        status: Set(record.status.as_i16()),
        reason: Set(record.reason.clone()),
        changed_by_user_id: Set(record.changed_by_user_id),
        effective_at: Set(record.effective_at),
        ..Default::default()
    }
    .insert(db)
    .await?;
    status_from_model(model)
}

impl StatusLedger for DbStatusLedger {
    async fn append(&self, record: &NewStatusRecord) -> Result<StatusRecord, AccountsServiceError> {
        insert_status(&self.db, record)
            .await
            .map_err(|e| write_error(e, "append status record"))
    }

    async fn current(&self, user_id: Uuid) -> Result<Option<StatusRecord>, AccountsServiceError> {
        let model = user_statuses::Entity::find()
            .filter(user_statuses::Column::UserId.eq(user_id))
            .order_by_desc(user_statuses::Column::Id)
            .one(&self.db)
            .await
            .context("find current status")?;
        Ok(model
            .map(status_from_model)
            .transpose()
            .context("decode current status")?)
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<StatusRecord>, AccountsServiceError> {
        let models = user_statuses::Entity::find()
            .filter(user_statuses::Column::UserId.eq(user_id))
            .order_by_desc(user_statuses::Column::Id)
            .all(&self.db)
            .await
            .context("list status history")?;
        Ok(models
            .into_iter()
            .map(status_from_model)
            .collect::<Result<Vec<_>, _>>()
            .context("decode status history")?)
    }
}
