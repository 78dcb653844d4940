use crate::error::OpportunityError;
use crate::models::{
    CreatedResponse, OpportunityFilter, OpportunityListResponse, OpportunityPayload,
    OpportunityResponse, OpportunitySearchResponse,
};
use crate::store::SearchViewer;
use crate::{Opportunities, validate};
use atelier_domain::constants::OPPORTUNITIES_TAG;
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
        .routes(routes!(search))
        .routes(routes!(list_mine))
        .routes(routes!(create))
        .routes(routes!(get_one))
        .routes(routes!(update))
        .routes(routes!(delete))
}

fn opportunities(state: &ApiState) -> Result<&Opportunities, OpportunityError> {
    state.try_get_slice::<Opportunities>().map_err(|e| OpportunityError::Internal {
        message: e.to_string().into(),
        context: Some("Opportunities slice not registered".into()),
    })
}

fn media(state: &ApiState) -> Result<&Media, OpportunityError> {
    state.try_get_slice::<Media>().map_err(|e| OpportunityError::Internal {
        message: e.to_string().into(),
        context: Some("Media slice not registered".into()),
    })
}

#[utoipa::path(
    get,
    path = "/v1/opportunities",
    params(OpportunityFilter),
    responses((status = OK, description = "Filtered, relevance-ordered listings", body = OpportunitySearchResponse)),
    tag = OPPORTUNITIES_TAG,
)]
async fn search(
    State(state): State<ApiState>,
    session: Option<Session>,
    Query(filter): Query<OpportunityFilter>,
) -> Result<Json<OpportunitySearchResponse>, OpportunityError> {
    let viewer = SearchViewer {
        artist_id: session.as_ref().and_then(|s| s.artist_id.clone()),
        is_admin: session.as_ref().is_some_and(|s| s.roles.contains(RoleSet::ADMINISTRATOR)),
    };

    let (pages_total, hits) = opportunities(&state)?.store().search(&filter, &viewer).await?;
    Ok(Json(OpportunitySearchResponse { pages_total, opportunities: hits }))
}

#[utoipa::path(
    get,
    path = "/v1/opportunities/mine",
    responses((status = OK, description = "Own listings, newest first", body = OpportunityListResponse)),
    tag = OPPORTUNITIES_TAG,
)]
async fn list_mine(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<OpportunityListResponse>, OpportunityError> {
    let provider_id = session.provider_id()?;
    let rows = opportunities(&state)?.store().list_mine(provider_id).await?;
    Ok(Json(OpportunityListResponse {
        opportunities: rows.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/opportunities",
    request_body = OpportunityPayload,
    responses((status = OK, description = "Listing created", body = CreatedResponse)),
    tag = OPPORTUNITIES_TAG,
)]
async fn create(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<OpportunityPayload>,
) -> Result<Json<CreatedResponse>, OpportunityError> {
    let provider_id = session.provider_id()?;
    validate::payload(&payload)?;

    let id = opportunities(&state)?.store().create(provider_id, &payload).await?;
    info!(provider = provider_id, opportunity = id, "Opportunity created");
    Ok(Json(CreatedResponse { id }))
}

#[utoipa::path(
    get,
    path = "/v1/opportunities/{opportunity_id}",
    responses(
        (status = OK, description = "One listing, honoring visibility", body = OpportunityResponse),
        (status = NOT_FOUND, description = "Unknown or invisible listing"),
    ),
    tag = OPPORTUNITIES_TAG,
)]
async fn get_one(
    State(state): State<ApiState>,
    session: Option<Session>,
    Path(opportunity_id): Path<String>,
) -> Result<Json<OpportunityResponse>, OpportunityError> {
    let opportunities = opportunities(&state)?;

    // Owners read their listings regardless of visibility.
    if let Some(provider_id) = session.as_ref().and_then(|s| s.provider_id.clone()) {
        if let Ok(row) = opportunities.store().find_owned(&opportunity_id, &provider_id).await {
            return Ok(Json(row.into()));
        }
    }

    let artist_id = session.as_ref().and_then(|s| s.artist_id.as_deref());
    let row = opportunities
        .store()
        .find_available(&opportunity_id, artist_id)
        .await?
        .ok_or(OpportunityError::NotFound {
            message: "opportunity not found".into(),
            context: None,
        })?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    put,
    path = "/v1/opportunities/{opportunity_id}",
    request_body = OpportunityPayload,
    responses(
        (status = OK, description = "Listing updated; removed attachments deleted"),
        (status = NOT_FOUND, description = "Not the caller's listing"),
    ),
    tag = OPPORTUNITIES_TAG,
)]
async fn update(
    State(state): State<ApiState>,
    session: Session,
    Path(opportunity_id): Path<String>,
    Json(payload): Json<OpportunityPayload>,
) -> Result<(), OpportunityError> {
    let opportunities = opportunities(&state)?;
    let provider_id = session.provider_id()?;
    validate::payload(&payload)?;

    let existing = opportunities.store().find_owned(&opportunity_id, provider_id).await?;

    let removed = AttachmentRef::removed_ids(&existing.attachments, &payload.attachments);
    if !removed.is_empty() {
        media(&state)?.store().delete_owned(&session.user_id, &removed).await?;
    }

    opportunities.store().update(&opportunity_id, &payload).await?;
    info!(provider = provider_id, opportunity = opportunity_id, "Opportunity updated");
    Ok(())
}

#[utoipa::path(
    delete,
    path = "/v1/opportunities/{opportunity_id}",
    responses(
        (status = OK, description = "Listing and its attachments deleted"),
        (status = NOT_FOUND, description = "Not the caller's listing"),
    ),
    tag = OPPORTUNITIES_TAG,
)]
async fn delete(
    State(state): State<ApiState>,
    session: Session,
    Path(opportunity_id): Path<String>,
) -> Result<(), OpportunityError> {
    let opportunities = opportunities(&state)?;
    let provider_id = session.provider_id()?;

    let existing = opportunities.store().find_owned(&opportunity_id, provider_id).await?;

    let attachment_ids: Vec<String> = existing.attachments.iter().map(|a| a.id.clone()).collect();
    if !attachment_ids.is_empty() {
        media(&state)?.store().delete_owned(&session.user_id, &attachment_ids).await?;
    }

    opportunities.store().delete(&opportunity_id).await?;
    info!(provider = provider_id, opportunity = opportunity_id, "Opportunity deleted");
    Ok(())
}
