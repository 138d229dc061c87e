use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Gates workflow-management operations. Closed enumeration: an
/// unrecognized stored value fails row decoding and surfaces as a store
/// error, never as a valid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Privilege tier, orthogonal to role. Transitions to `Premium` only
/// through the upgrade workflow's approval path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Membership,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tool_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Active,
    Disabled,
}

/// Identity record as exposed to callers. The password hash never leaves
/// the store layer; rows that need it decode into a separate struct.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ToolStatus,
    pub access_tier: Tier,
    pub icon_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_deleted: bool,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ToolCategory {
    pub id: Uuid,
    pub name: String,
}
