use atelier_domain::status::ApplicationStatus;
use atelier_media::AttachmentRef;
use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Persisted application.
#[derive(Debug, Clone, SurrealValue)]
pub struct ApplicationRow {
    pub id: String,
    pub artist: String,
    pub opportunity: String,
    pub project: Option<String>,
    pub message: String,
    pub attachments: Vec<AttachmentRef>,
    pub status: String,
}

impl ApplicationRow {
    #[must_use]
    pub fn status_value(&self) -> ApplicationStatus {
        self.status.parse().unwrap_or(ApplicationStatus::New)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicationPayload {
    pub message: String,
    pub project_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateApplicationRequest {
    pub opportunity_id: String,
    pub message: String,
    pub project_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl CreateApplicationRequest {
    #[must_use]
    pub fn content(&self) -> ApplicationPayload {
        ApplicationPayload {
            message: self.message.clone(),
            project_id: self.project_id.clone(),
            attachments: self.attachments.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusChangeRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RejectRequest {
    #[serde(default)]
    pub block_artist: bool,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "kebab-case", default)]
pub struct MyApplicationsFilter {
    pub opportunity: Option<String>,
    pub status: Option<ApplicationStatus>,
}

/// Artist-side listing row with the essentials of the listing attached.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyApplicationHit {
    pub id: String,
    pub status: String,
    pub message: String,
    pub attachments: Vec<AttachmentRef>,
    pub project: Option<String>,
    pub opportunity: String,
    pub opportunity_title: String,
    pub opportunity_kind: String,
    pub application_deadline: String,
    pub organization_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyApplicationsResponse {
    pub applications: Vec<MyApplicationHit>,
}

/// Provider-side search parameters.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProviderApplicationsFilter {
    /// Restrict to these opportunity ids (own listings only).
    pub opportunity: Option<Vec<String>>,
    pub status: Option<Vec<ApplicationStatus>>,
    /// Fuzzy match against the applicant's name and profile text.
    pub applicant: Option<String>,
    /// Fuzzy match against the application message.
    pub message: Option<String>,
    /// Fuzzy match against the attached project's description.
    pub project: Option<String>,
    /// Include applications from blocked artists.
    pub show_blocked: bool,
    pub page: Option<u64>,
}

/// Provider-side search hit with applicant and project context.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderApplicationHit {
    pub id: String,
    pub status: String,
    pub message: String,
    pub attachments: Vec<AttachmentRef>,
    pub artist: String,
    pub opportunity: String,
    pub applicant_first_name: Option<String>,
    pub applicant_last_name: Option<String>,
    pub applicant_phone: Option<String>,
    pub applicant_country_residence: Option<String>,
    pub applicant_links: Option<Vec<String>>,
    pub applicant_email: Option<String>,
    pub project_title: Option<String>,
    pub project_description: Option<String>,
    pub project_reach: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderApplicationsResponse {
    pub pages_total: u64,
    pub blocked_artists: Vec<String>,
    pub applications: Vec<ProviderApplicationHit>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}
