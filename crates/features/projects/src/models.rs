use atelier_domain::status::ModerationStatus;
use atelier_media::AttachmentRef;
use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

/// Persisted artist project.
#[derive(Debug, Clone, SurrealValue)]
pub struct ProjectRow {
    pub id: String,
    pub artist: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub link: Option<String>,
    pub budget: i64,
    pub reach: i64,
    pub exclusive_support: bool,
    pub hidden: bool,
    pub banned: bool,
    pub attachments: Vec<AttachmentRef>,
    pub poster_image: Option<AttachmentRef>,
    pub moderation: String,
    pub moderation_comment: String,
}

impl ProjectRow {
    #[must_use]
    pub fn moderation_status(&self) -> ModerationStatus {
        self.moderation.parse().unwrap_or(ModerationStatus::Draft)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectPayload {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub link: Option<String>,
    pub budget: i64,
    pub reach: i64,
    pub exclusive_support: bool,
    pub hidden: bool,
    pub attachments: Vec<AttachmentRef>,
    pub poster_image: Option<AttachmentRef>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub link: Option<String>,
    pub budget: i64,
    pub reach: i64,
    pub exclusive_support: bool,
    pub hidden: bool,
    pub banned: bool,
    pub attachments: Vec<AttachmentRef>,
    pub poster_image: Option<AttachmentRef>,
    pub moderation: String,
    pub moderation_comment: String,
    /// Whether any non-rejected application references this project.
    pub has_applications: bool,
}

impl ProjectResponse {
    #[must_use]
    pub fn from_row(row: ProjectRow, has_applications: bool) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            link: row.link,
            budget: row.budget,
            reach: row.reach,
            exclusive_support: row.exclusive_support,
            hidden: row.hidden,
            banned: row.banned,
            attachments: row.attachments,
            poster_image: row.poster_image,
            moderation: row.moderation,
            moderation_comment: row.moderation_comment,
            has_applications,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}
