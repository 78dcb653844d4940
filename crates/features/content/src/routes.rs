use crate::error::ContentError;
use crate::models::{
    CreatedResponse, NewsListFilter, NewsListResponse, NewsPayload, NewsResponse, MAX_TITLE_LENGTH,
};
use crate::Content;
use atelier_domain::constants::CONTENT_TAG;
use atelier_domain::roles::RoleSet;
use atelier_identity::Session;
use atelier_kernel::server::ApiState;
use atelier_media::{AttachmentRef, Media};
use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_news))
        .routes(routes!(get_news))
        .routes(routes!(create_news))
        .routes(routes!(update_news))
        .routes(routes!(delete_news))
}

fn content(state: &ApiState) -> Result<&Content, ContentError> {
    state.try_get_slice::<Content>().map_err(|e| ContentError::Internal {
        message: e.to_string().into(),
        context: Some("Content slice not registered".into()),
    })
}

fn media(state: &ApiState) -> Result<&Media, ContentError> {
    state.try_get_slice::<Media>().map_err(|e| ContentError::Internal {
        message: e.to_string().into(),
        context: Some("Media slice not registered".into()),
    })
}

fn require_manager(session: &Session) -> Result<(), ContentError> {
    session
        .require_role(RoleSet::CONTENT_MANAGER)
        .map_err(|e| ContentError::Forbidden { message: e.to_string().into(), context: None })
}

fn validate(payload: &NewsPayload) -> Result<(), ContentError> {
    if payload.title.trim().is_empty() {
        return Err(ContentError::Validation {
            message: "title: required".into(),
            context: None,
        });
    }
    if payload.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ContentError::Validation {
            message: format!("title: must be at most {MAX_TITLE_LENGTH} characters").into(),
            context: None,
        });
    }
    if payload.body.trim().is_empty() {
        return Err(ContentError::Validation {
            message: "body: required".into(),
            context: None,
        });
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/news",
    params(NewsListFilter),
    responses((status = OK, description = "Public news, newest first", body = NewsListResponse)),
    tag = CONTENT_TAG,
)]
async fn list_news(
    State(state): State<ApiState>,
    Query(filter): Query<NewsListFilter>,
) -> Result<Json<NewsListResponse>, ContentError> {
    let (pages_total, rows) = content(&state)?
        .store()
        .list_public(filter.home, filter.page.unwrap_or(1).max(1))
        .await?;

    Ok(Json(NewsListResponse {
        pages_total,
        news: rows.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/news/{news_id}",
    responses(
        (status = OK, description = "One news post", body = NewsResponse),
        (status = NOT_FOUND, description = "Unknown or unlisted post"),
    ),
    tag = CONTENT_TAG,
)]
async fn get_news(
    State(state): State<ApiState>,
    session: Option<Session>,
    Path(news_id): Path<String>,
) -> Result<Json<NewsResponse>, ContentError> {
    let row = content(&state)?.store().find(&news_id).await?.ok_or(ContentError::NotFound {
        message: "news not found".into(),
        context: None,
    })?;

    // Unlisted posts stay manager-only.
    if !row.show_at_home && !row.show_at_news {
        let is_manager =
            session.as_ref().is_some_and(|s| s.roles.contains(RoleSet::CONTENT_MANAGER));
        if !is_manager {
            return Err(ContentError::NotFound {
                message: "news not found".into(),
                context: None,
            });
        }
    }

    Ok(Json(row.into()))
}

#[utoipa::path(
    post,
    path = "/v1/news",
    request_body = NewsPayload,
    responses((status = OK, description = "Post created", body = CreatedResponse)),
    tag = CONTENT_TAG,
)]
async fn create_news(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<NewsPayload>,
) -> Result<Json<CreatedResponse>, ContentError> {
    require_manager(&session)?;
    validate(&payload)?;

    let id = content(&state)?.store().create(&session.user_id, &payload).await?;
    info!(author = session.user_id, news = id, "News created");
    Ok(Json(CreatedResponse { id }))
}

#[utoipa::path(
    put,
    path = "/v1/news/{news_id}",
    request_body = NewsPayload,
    responses((status = OK, description = "Post updated; removed media deleted")),
    tag = CONTENT_TAG,
)]
async fn update_news(
    State(state): State<ApiState>,
    session: Session,
    Path(news_id): Path<String>,
    Json(payload): Json<NewsPayload>,
) -> Result<(), ContentError> {
    require_manager(&session)?;
    validate(&payload)?;
    let content = content(&state)?;

    let existing = content.store().find(&news_id).await?.ok_or(ContentError::NotFound {
        message: "news not found".into(),
        context: None,
    })?;

    let mut removed = AttachmentRef::removed_ids(&existing.attachments, &payload.attachments);
    if let Some(old_picture) = &existing.main_picture {
        let kept = payload.main_picture.as_ref().is_some_and(|new| new.id == old_picture.id);
        if !kept {
            removed.push(old_picture.id.clone());
        }
    }
    if !removed.is_empty() {
        // Media ownership follows the original author.
        media(&state)?.store().delete_owned(&existing.author, &removed).await?;
    }

    content.store().update(&news_id, &session.user_id, &payload).await
}

#[utoipa::path(
    delete,
    path = "/v1/news/{news_id}",
    responses((status = OK, description = "Post and its media deleted")),
    tag = CONTENT_TAG,
)]
async fn delete_news(
    State(state): State<ApiState>,
    session: Session,
    Path(news_id): Path<String>,
) -> Result<(), ContentError> {
    require_manager(&session)?;
    let content = content(&state)?;

    let existing = content.store().find(&news_id).await?.ok_or(ContentError::NotFound {
        message: "news not found".into(),
        context: None,
    })?;

    let mut removed: Vec<String> = existing.attachments.iter().map(|a| a.id.clone()).collect();
    if let Some(picture) = &existing.main_picture {
        removed.push(picture.id.clone());
    }
    if !removed.is_empty() {
        media(&state)?.store().delete_owned(&existing.author, &removed).await?;
    }

    content.store().delete(&news_id).await?;
    info!(manager = session.user_id, news = news_id, "News deleted");
    Ok(())
}
