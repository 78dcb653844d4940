use atelier_domain::status::ModerationStatus;
use atelier_media::AttachmentRef;
use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

pub const MAX_COMMENT_LENGTH: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueueEntity {
    #[default]
    Artist,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueueOrder {
    #[default]
    Desc,
    Asc,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "kebab-case", default)]
pub struct QueueFilter {
    pub entity: QueueEntity,
    pub order: QueueOrder,
    pub page: Option<u64>,
}

/// Queued artist profile awaiting review.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueuedArtist {
    pub id: String,
    pub artist_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub statement: String,
    pub updated_at: i64,
}

/// Queued project awaiting review.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueuedProject {
    pub id: String,
    pub title: String,
    pub description: String,
    pub updated_at: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub pages_total: u64,
    pub artists: Vec<QueuedArtist>,
    pub projects: Vec<QueuedProject>,
}

/// Full artist dossier for review.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDossier {
    pub id: String,
    pub artist_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_day: String,
    pub country_residence: String,
    pub country_citizenship: String,
    pub languages: Vec<String>,
    pub industries: Vec<String>,
    pub title: String,
    pub themes: Vec<String>,
    pub bio: Option<String>,
    pub statement: String,
    pub links: Vec<String>,
    pub moderation: String,
    pub moderation_comment: String,
}

/// Full project dossier for review.
#[derive(Debug, Clone, Serialize, SurrealValue, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDossier {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub link: Option<String>,
    pub budget: i64,
    pub reach: i64,
    pub banned: bool,
    pub attachments: Vec<AttachmentRef>,
    pub poster_image: Option<AttachmentRef>,
    pub moderation: String,
    pub moderation_comment: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DecisionRequest {
    pub status: ModerationStatus,
    #[serde(default)]
    pub comment: String,
}
