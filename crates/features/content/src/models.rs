use atelier_media::AttachmentRef;
use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

pub const MAX_TITLE_LENGTH: usize = 200;

/// Persisted news post.
#[derive(Debug, Clone, SurrealValue)]
pub struct NewsRow {
    pub id: String,
    pub author: String,
    pub title: String,
    pub body: String,
    pub main_picture: Option<AttachmentRef>,
    pub attachments: Vec<AttachmentRef>,
    pub show_at_home: bool,
    pub show_at_news: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewsPayload {
    pub title: String,
    pub body: String,
    pub main_picture: Option<AttachmentRef>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub show_at_home: bool,
    #[serde(default = "default_show_at_news")]
    pub show_at_news: bool,
}

fn default_show_at_news() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "kebab-case", default)]
pub struct NewsListFilter {
    /// When true, list only home-page posts.
    pub home: bool,
    pub page: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    pub main_picture: Option<AttachmentRef>,
    pub attachments: Vec<AttachmentRef>,
    pub show_at_home: bool,
    pub show_at_news: bool,
    pub created_at: i64,
}

impl From<NewsRow> for NewsResponse {
    fn from(row: NewsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            main_picture: row.main_picture,
            attachments: row.attachments,
            show_at_home: row.show_at_home,
            show_at_news: row.show_at_news,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsListResponse {
    pub pages_total: u64,
    pub news: Vec<NewsResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}
