use crate::error::ModerationError;
use crate::models::{
    ArtistDossier, DecisionRequest, ProjectDossier, QueueEntity, QueueFilter, QueueResponse,
    MAX_COMMENT_LENGTH,
};
use crate::Moderation;
use atelier_domain::constants::MODERATION_TAG;
use atelier_domain::roles::RoleSet;
use atelier_identity::Session;
use atelier_kernel::server::ApiState;
use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(queue))
        .routes(routes!(artist_dossier))
        .routes(routes!(project_dossier))
        .routes(routes!(decide_artist))
        .routes(routes!(decide_project))
}

fn moderation(state: &ApiState) -> Result<&Moderation, ModerationError> {
    state.try_get_slice::<Moderation>().map_err(|e| ModerationError::Internal {
        message: e.to_string().into(),
        context: Some("Moderation slice not registered".into()),
    })
}

fn check_decision(payload: &DecisionRequest) -> Result<(), ModerationError> {
    if !payload.status.is_decision() {
        return Err(ModerationError::Validation {
            message: "status: must be approved or declined".into(),
            context: None,
        });
    }
    if payload.comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ModerationError::Validation {
            message: format!("comment: must be at most {MAX_COMMENT_LENGTH} characters").into(),
            context: None,
        });
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/moderation/queue",
    params(QueueFilter),
    responses((status = OK, description = "Records awaiting review", body = QueueResponse)),
    tag = MODERATION_TAG,
)]
async fn queue(
    State(state): State<ApiState>,
    session: Session,
    Query(filter): Query<QueueFilter>,
) -> Result<Json<QueueResponse>, ModerationError> {
    session.require_role(RoleSet::MODERATOR)?;
    let moderation = moderation(&state)?;
    let page = filter.page.unwrap_or(1).max(1);

    let (pages_total, artists, projects) = match filter.entity {
        QueueEntity::Artist => {
            let (pages, rows) = moderation.store().queued_artists(filter.order, page).await?;
            (pages, rows, Vec::new())
        },
        QueueEntity::Project => {
            let (pages, rows) = moderation.store().queued_projects(filter.order, page).await?;
            (pages, Vec::new(), rows)
        },
    };

    Ok(Json(QueueResponse { pages_total, artists, projects }))
}

#[utoipa::path(
    get,
    path = "/v1/moderation/artist/{artist_id}",
    responses(
        (status = OK, description = "Artist dossier", body = ArtistDossier),
        (status = NOT_FOUND, description = "Unknown artist"),
    ),
    tag = MODERATION_TAG,
)]
async fn artist_dossier(
    State(state): State<ApiState>,
    session: Session,
    Path(artist_id): Path<String>,
) -> Result<Json<ArtistDossier>, ModerationError> {
    session.require_role(RoleSet::MODERATOR)?;

    let dossier = moderation(&state)?.store().artist_dossier(&artist_id).await?.ok_or(
        ModerationError::NotFound { message: "artist not found".into(), context: None },
    )?;
    Ok(Json(dossier))
}

#[utoipa::path(
    get,
    path = "/v1/moderation/project/{project_id}",
    responses(
        (status = OK, description = "Project dossier", body = ProjectDossier),
        (status = NOT_FOUND, description = "Unknown project"),
    ),
    tag = MODERATION_TAG,
)]
async fn project_dossier(
    State(state): State<ApiState>,
    session: Session,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectDossier>, ModerationError> {
    session.require_role(RoleSet::MODERATOR)?;

    let dossier = moderation(&state)?.store().project_dossier(&project_id).await?.ok_or(
        ModerationError::NotFound { message: "project not found".into(), context: None },
    )?;
    Ok(Json(dossier))
}

#[utoipa::path(
    post,
    path = "/v1/moderation/artist/{artist_id}/decision",
    request_body = DecisionRequest,
    responses((status = OK, description = "Decision recorded")),
    tag = MODERATION_TAG,
)]
async fn decide_artist(
    State(state): State<ApiState>,
    session: Session,
    Path(artist_id): Path<String>,
    Json(payload): Json<DecisionRequest>,
) -> Result<(), ModerationError> {
    session.require_role(RoleSet::MODERATOR)?;
    check_decision(&payload)?;

    moderation(&state)?
        .store()
        .decide("artist", &artist_id, payload.status, &payload.comment, &session.user_id)
        .await?;

    info!(moderator = session.user_id, artist = artist_id, status = %payload.status,
        "Artist moderation decision");
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/moderation/project/{project_id}/decision",
    request_body = DecisionRequest,
    responses((status = OK, description = "Decision recorded")),
    tag = MODERATION_TAG,
)]
async fn decide_project(
    State(state): State<ApiState>,
    session: Session,
    Path(project_id): Path<String>,
    Json(payload): Json<DecisionRequest>,
) -> Result<(), ModerationError> {
    session.require_role(RoleSet::MODERATOR)?;
    check_decision(&payload)?;

    moderation(&state)?
        .store()
        .decide("project", &project_id, payload.status, &payload.comment, &session.user_id)
        .await?;

    info!(moderator = session.user_id, project = project_id, status = %payload.status,
        "Project moderation decision");
    Ok(())
}
