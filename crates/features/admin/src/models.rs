use atelier_domain::roles::RoleSet;
use atelier_domain::status::AdminMark;
use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

pub const MAX_INVITE_SUBJECT_LENGTH: usize = 255;
pub const MAX_INVITE_MESSAGE_LENGTH: usize = 512;

/// Administrator-issued registration invitation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserInvitePayload {
    pub email: String,
    pub organization_name: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Role names, e.g. `["provider"]`.
    pub roles: Vec<String>,
}

impl UserInvitePayload {
    #[must_use]
    pub fn role_set(&self) -> RoleSet {
        self.roles.iter().fold(RoleSet::empty(), |acc, name| acc | RoleSet::from(name.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInviteSummary {
    pub id: String,
    pub email: String,
    pub organization_name: String,
    pub roles: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInvitesResponse {
    pub invites: Vec<UserInviteSummary>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "kebab-case", default)]
pub struct UsersFilter {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Role name; matches accounts holding the role.
    pub role: Option<String>,
    pub locked: Option<bool>,
    pub page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub locked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub pages_total: u64,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub locked: bool,
    pub artist_id: Option<String>,
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LockRequest {
    pub locked: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkRequest {
    pub mark: AdminMark,
}

/// Key/value pair for dashboard breakdowns.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub key: String,
    pub value: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDashboard {
    pub artist_count: i64,
    pub project_count: i64,
    pub open_application_count: i64,
    pub submitted_application_count: i64,
    pub artists_by_industry: Vec<Breakdown>,
    pub artists_by_country: Vec<Breakdown>,
    pub new_this_month: i64,
    pub new_last_month: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDashboard {
    pub provider_count: i64,
    pub live_opportunity_count: i64,
    pub opportunities_by_kind: Vec<Breakdown>,
    pub outstanding_provider_invites: i64,
}
