use chrono::{DateTime, Utc};
use common_http_errors::ApiError;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{RequestStatus, Tier, User};

/// A user's petition to move from `membership` to `premium`.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub handled_at: Option<DateTime<Utc>>,
}

/// Pending request joined with the requesting user, as shown to admins.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("Account is already at the premium tier")]
    AlreadyPremium,
    #[error("An upgrade request is already pending")]
    AlreadyPending,
    #[error("A previous upgrade request was already approved")]
    AlreadyUpgraded,
    #[error("Upgrade request not found or already handled")]
    RequestNotFound,
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl From<UpgradeError> for ApiError {
    fn from(value: UpgradeError) -> Self {
        match value {
            UpgradeError::AlreadyPremium => ApiError::Conflict {
                code: "already_premium",
                message: "Account is already at the premium tier",
            },
            UpgradeError::AlreadyPending => ApiError::Conflict {
                code: "upgrade_pending",
                message: "An upgrade request is already pending",
            },
            UpgradeError::AlreadyUpgraded => ApiError::Conflict {
                code: "already_upgraded",
                message: "A previous upgrade request was already approved",
            },
            UpgradeError::RequestNotFound => ApiError::NotFound {
                code: "request_not_found",
                message: "Upgrade request not found or already handled",
            },
            UpgradeError::Store(err) => ApiError::internal(err),
        }
    }
}

/// Inserts a new pending request for `user`, unless the tier or an
/// earlier request forbids it. A `rejected` most-recent request does not
/// block resubmission. The partial unique index on pending requests
/// backstops the guard ladder: a concurrent duplicate submit surfaces as
/// a unique violation, not a second pending row.
pub async fn submit(db: &PgPool, user: &User) -> Result<UpgradeRequest, UpgradeError> {
    let last_status = sqlx::query_scalar::<_, RequestStatus>(
        "SELECT status FROM upgrade_requests WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user.id)
    .fetch_optional(db)
    .await?;

    match last_status {
        Some(RequestStatus::Pending) => return Err(UpgradeError::AlreadyPending),
        Some(RequestStatus::Approved) => return Err(UpgradeError::AlreadyUpgraded),
        Some(RequestStatus::Rejected) | None => {}
    }

    if user.tier == Tier::Premium {
        return Err(UpgradeError::AlreadyPremium);
    }

    let request = sqlx::query_as::<_, UpgradeRequest>(
        "INSERT INTO upgrade_requests (id, user_id, status)
         VALUES ($1, $2, 'pending')
         RETURNING id, user_id, status, created_at, handled_at",
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .fetch_one(db)
    .await
    .map_err(|err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            UpgradeError::AlreadyPending
        }
        _ => UpgradeError::Store(err),
    })?;

    Ok(request)
}

/// All pending requests joined with the requesting user, newest first.
pub async fn list_pending(db: &PgPool) -> Result<Vec<PendingRequest>, UpgradeError> {
    let requests = sqlx::query_as::<_, PendingRequest>(
        "SELECT r.id, r.user_id, u.username, u.tier, r.created_at
         FROM upgrade_requests r
         JOIN users u ON u.id = r.user_id
         WHERE r.status = 'pending'
         ORDER BY r.created_at DESC",
    )
    .fetch_all(db)
    .await?;

    Ok(requests)
}

/// Approves a pending request and upgrades the owner's tier as one atomic
/// unit: both writes commit or neither does. The conditional update on
/// `status = 'pending'` makes a second approval of the same request
/// observe zero rows and fail, so the tier is upgraded exactly once no
/// matter how many calls race.
pub async fn approve(db: &PgPool, request_id: Uuid) -> Result<Uuid, UpgradeError> {
    let mut tx = db.begin().await?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "UPDATE upgrade_requests
         SET status = 'approved', handled_at = NOW()
         WHERE id = $1 AND status = 'pending'
         RETURNING user_id",
    )
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user_id) = user_id else {
        return Err(UpgradeError::RequestNotFound);
    };

    sqlx::query("UPDATE users SET tier = 'premium' WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(user_id)
}

/// Rejects a pending request. Terminal states are not re-enterable: a
/// request that is no longer pending reports not-found.
pub async fn reject(db: &PgPool, request_id: Uuid) -> Result<(), UpgradeError> {
    let result = sqlx::query(
        "UPDATE upgrade_requests
         SET status = 'rejected', handled_at = NOW()
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(request_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(UpgradeError::RequestNotFound);
    }
    Ok(())
}

/// All requests ever submitted by `user_id`, newest first. Requests are
/// never deleted.
pub async fn history(db: &PgPool, user_id: Uuid) -> Result<Vec<UpgradeRequest>, UpgradeError> {
    let requests = sqlx::query_as::<_, UpgradeRequest>(
        "SELECT id, user_id, status, created_at, handled_at
         FROM upgrade_requests
         WHERE user_id = $1
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(requests)
}
