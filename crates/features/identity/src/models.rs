use atelier_domain::roles::RoleSet;
use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

/// Persisted account record.
#[derive(Debug, Clone, SurrealValue)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub oauth_external_id: Option<String>,
    pub roles: Vec<String>,
    pub locked: bool,
    pub landing_url: Option<String>,
}

impl UserRow {
    #[must_use]
    pub fn role_set(&self) -> RoleSet {
        self.roles.iter().fold(RoleSet::empty(), |acc, name| acc | RoleSet::from(name.as_str()))
    }
}

/// One-shot password reset request.
#[derive(Debug, Clone, SurrealValue)]
pub struct PasswordResetRow {
    pub id: String,
    pub email: String,
    pub created_at: i64,
}

/// One-shot email change request.
#[derive(Debug, Clone, SurrealValue)]
pub struct EmailChangeRow {
    pub id: String,
    pub current_email: String,
    pub new_email: String,
    pub created_at: i64,
}

/// Registration invitation issued by an administrator.
#[derive(Debug, Clone, SurrealValue)]
pub struct UserInviteRow {
    pub id: String,
    pub email: String,
    pub organization_name: String,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub roles: Vec<String>,
    pub created_at: i64,
}

impl UserInviteRow {
    #[must_use]
    pub fn role_set(&self) -> RoleSet {
        self.roles.iter().fold(RoleSet::empty(), |acc, name| acc | RoleSet::from(name.as_str()))
    }
}

/// Internal payload for account creation.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    /// Plain-text password; hashed before it reaches the store. Absent for
    /// OAuth-linked accounts.
    pub password: Option<String>,
    pub email: Option<String>,
    pub oauth_external_id: Option<String>,
    pub roles: RoleSet,
    pub landing_url: Option<String>,
}

// --- Wire DTOs ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub roles: Vec<String>,
    pub artist_id: Option<String>,
    pub provider_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OauthExchangeRequest {
    /// Upstream provider slug, e.g. `google`.
    pub provider: String,
    /// Stable subject identifier at the provider.
    pub subject: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OauthExchangeResponse {
    /// `ok` when a session was issued, `registration_required` when the
    /// caller still has to complete artist registration.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterByInviteRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PasswordResetConfirm {
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmailChangeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingUrlResponse {
    pub url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    #[must_use]
    pub const fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}
