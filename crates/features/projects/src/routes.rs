use crate::error::ProjectError;
use crate::models::{CreatedResponse, ProjectListResponse, ProjectPayload, ProjectResponse};
use crate::store::orphaned_attachments;
use crate::{Projects, validate};
use atelier_domain::constants::PROJECTS_TAG;
use atelier_identity::Session;
use atelier_kernel::server::ApiState;
use atelier_media::{AttachmentRef, Media};
use axum::Json;
use axum::extract::{Path, State};
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_mine))
        .routes(routes!(create))
        .routes(routes!(update))
        .routes(routes!(delete))
        .routes(routes!(submit_for_moderation))
}

fn projects(state: &ApiState) -> Result<&Projects, ProjectError> {
    state.try_get_slice::<Projects>().map_err(|e| ProjectError::Internal {
        message: e.to_string().into(),
        context: Some("Projects slice not registered".into()),
    })
}

fn media(state: &ApiState) -> Result<&Media, ProjectError> {
    state.try_get_slice::<Media>().map_err(|e| ProjectError::Internal {
        message: e.to_string().into(),
        context: Some("Media slice not registered".into()),
    })
}

#[utoipa::path(
    get,
    path = "/v1/projects/mine",
    responses((status = OK, description = "Own projects, newest first", body = ProjectListResponse)),
    tag = PROJECTS_TAG,
)]
async fn list_mine(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<ProjectListResponse>, ProjectError> {
    let projects = projects(&state)?;
    let artist_id = session.artist_id()?;

    let rows = projects.store().list_mine(artist_id).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let has_applications = projects.store().has_applications(&row.id).await?;
        out.push(ProjectResponse::from_row(row, has_applications));
    }

    Ok(Json(ProjectListResponse { projects: out }))
}

#[utoipa::path(
    post,
    path = "/v1/projects",
    request_body = ProjectPayload,
    responses((status = OK, description = "Project created in draft state", body = CreatedResponse)),
    tag = PROJECTS_TAG,
)]
async fn create(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<ProjectPayload>,
) -> Result<Json<CreatedResponse>, ProjectError> {
    let artist_id = session.artist_id()?;
    validate::payload(&payload)?;

    let id = projects(&state)?.store().create(artist_id, &payload).await?;
    info!(artist = artist_id, project = id, "Project created");
    Ok(Json(CreatedResponse { id }))
}

#[utoipa::path(
    put,
    path = "/v1/projects/{project_id}",
    request_body = ProjectPayload,
    responses(
        (status = OK, description = "Project updated; removed attachments deleted"),
        (status = NOT_FOUND, description = "Not the caller's project"),
    ),
    tag = PROJECTS_TAG,
)]
async fn update(
    State(state): State<ApiState>,
    session: Session,
    Path(project_id): Path<String>,
    Json(payload): Json<ProjectPayload>,
) -> Result<(), ProjectError> {
    let projects = projects(&state)?;
    let artist_id = session.artist_id()?;
    validate::payload(&payload)?;

    let existing = projects.store().find_owned(&project_id, artist_id).await?;

    let orphaned = orphaned_attachments(&existing, &payload);
    if !orphaned.is_empty() {
        media(&state)?.store().delete_owned(&session.user_id, &orphaned).await?;
    }

    projects.store().update(&project_id, &payload).await?;
    info!(artist = artist_id, project = project_id, "Project updated");
    Ok(())
}

#[utoipa::path(
    delete,
    path = "/v1/projects/{project_id}",
    responses(
        (status = OK, description = "Project and its attachments deleted"),
        (status = CONFLICT, description = "Project still has live applications"),
    ),
    tag = PROJECTS_TAG,
)]
async fn delete(
    State(state): State<ApiState>,
    session: Session,
    Path(project_id): Path<String>,
) -> Result<(), ProjectError> {
    let projects = projects(&state)?;
    let artist_id = session.artist_id()?;

    let existing = projects.store().find_owned(&project_id, artist_id).await?;

    if projects.store().has_applications(&project_id).await? {
        return Err(ProjectError::Conflict {
            message: "withdraw the project's applications first".into(),
            context: None,
        });
    }

    let mut attachment_ids: Vec<String> =
        existing.attachments.iter().map(|a: &AttachmentRef| a.id.clone()).collect();
    if let Some(poster) = &existing.poster_image {
        attachment_ids.push(poster.id.clone());
    }
    if !attachment_ids.is_empty() {
        media(&state)?.store().delete_owned(&session.user_id, &attachment_ids).await?;
    }

    projects.store().delete(&project_id).await?;
    info!(artist = artist_id, project = project_id, "Project deleted");
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/projects/{project_id}/moderation",
    responses(
        (status = OK, description = "Project queued for review"),
        (status = CONFLICT, description = "Project not in a submittable state"),
    ),
    tag = PROJECTS_TAG,
)]
async fn submit_for_moderation(
    State(state): State<ApiState>,
    session: Session,
    Path(project_id): Path<String>,
) -> Result<(), ProjectError> {
    let artist_id = session.artist_id()?;
    projects(&state)?.store().submit_for_moderation(&project_id, artist_id).await
}
