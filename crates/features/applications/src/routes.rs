use crate::error::ApplicationError;
use crate::models::{
    ApplicationPayload, CreateApplicationRequest, CreatedResponse, MyApplicationsFilter,
    MyApplicationsResponse, ProviderApplicationsFilter, ProviderApplicationsResponse,
    RejectRequest, StatusChangeRequest, MAX_MESSAGE_LENGTH,
};
use crate::store::AttachableProject;
use crate::Applications;
use atelier_domain::constants::APPLICATIONS_TAG;
use atelier_domain::email::OutboundEmail;
use atelier_domain::status::{ApplicationStatus, InviteStatus};
use atelier_identity::Session;
use atelier_kernel::server::ApiState;
use atelier_media::{AttachmentRef, Media};
use atelier_opportunities::Opportunities;
use atelier_providers::Providers;
use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(create))
        .routes(routes!(list_mine))
        .routes(routes!(attachable_projects))
        .routes(routes!(update))
        .routes(routes!(send))
        .routes(routes!(revoke))
        .routes(routes!(archive))
        .routes(routes!(unarchive))
        .routes(routes!(delete))
        .routes(routes!(provider_list))
        .routes(routes!(change_status))
        .routes(routes!(reject))
        .routes(routes!(restore))
}

fn applications(state: &ApiState) -> Result<&Applications, ApplicationError> {
    state.try_get_slice::<Applications>().map_err(|e| ApplicationError::Internal {
        message: e.to_string().into(),
        context: Some("Applications slice not registered".into()),
    })
}

fn slice<'a, T: atelier_domain::registry::FeatureSlice>(
    state: &'a ApiState,
    name: &'static str,
) -> Result<&'a T, ApplicationError> {
    state.try_get_slice::<T>().map_err(|e| ApplicationError::Internal {
        message: e.to_string().into(),
        context: Some(name.into()),
    })
}

fn validate_content(payload: &ApplicationPayload) -> Result<(), ApplicationError> {
    if payload.message.trim().is_empty() {
        return Err(ApplicationError::Validation {
            message: "message: required".into(),
            context: None,
        });
    }
    if payload.message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ApplicationError::Validation {
            message: format!("message: must be at most {MAX_MESSAGE_LENGTH} characters").into(),
            context: None,
        });
    }
    Ok(())
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[utoipa::path(
    post,
    path = "/v1/applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = OK, description = "Draft application created", body = CreatedResponse),
        (status = FORBIDDEN, description = "Deadline passed or duplicate application"),
    ),
    tag = APPLICATIONS_TAG,
)]
async fn create(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<CreateApplicationRequest>,
) -> Result<Json<CreatedResponse>, ApplicationError> {
    let applications = applications(&state)?;
    let artist_id = session.artist_id()?;
    let content = payload.content();
    validate_content(&content)?;

    let opportunities = slice::<Opportunities>(&state, "Opportunities slice not registered")?;
    let opportunity = opportunities
        .store()
        .find_available(&payload.opportunity_id, Some(artist_id))
        .await?
        .ok_or(ApplicationError::NotFound {
            message: "opportunity not found".into(),
            context: None,
        })?;

    // Applications close at the end of the deadline day.
    if opportunity.application_deadline < today() {
        return Err(ApplicationError::Forbidden {
            message: "the application deadline has passed".into(),
            context: None,
        });
    }

    if let Some(project_id) = content.project_id.as_deref() {
        if !applications.store().project_attachable(artist_id, project_id).await? {
            return Err(ApplicationError::NotFound {
                message: "project not found or not approved".into(),
                context: None,
            });
        }
    }

    if applications
        .store()
        .duplicate_exists(artist_id, &opportunity.id, content.project_id.as_deref(), None)
        .await?
    {
        return Err(ApplicationError::Conflict {
            message: "an application for this listing already exists".into(),
            context: None,
        });
    }

    let id = applications.store().create(artist_id, &opportunity.id, &content).await?;
    info!(artist = artist_id, application = id, "Application drafted");
    Ok(Json(CreatedResponse { id }))
}

#[utoipa::path(
    get,
    path = "/v1/applications/mine",
    params(MyApplicationsFilter),
    responses((status = OK, description = "Own applications, newest first", body = MyApplicationsResponse)),
    tag = APPLICATIONS_TAG,
)]
async fn list_mine(
    State(state): State<ApiState>,
    session: Session,
    Query(filter): Query<MyApplicationsFilter>,
) -> Result<Json<MyApplicationsResponse>, ApplicationError> {
    let artist_id = session.artist_id()?;
    let hits = applications(&state)?.store().my_applications(artist_id, &filter).await?;
    Ok(Json(MyApplicationsResponse { applications: hits }))
}

#[utoipa::path(
    get,
    path = "/v1/applications/attachable-projects/{opportunity_id}",
    responses((status = OK, description = "Projects free to attach on this listing", body = [AttachableProject])),
    tag = APPLICATIONS_TAG,
)]
async fn attachable_projects(
    State(state): State<ApiState>,
    session: Session,
    Path(opportunity_id): Path<String>,
) -> Result<Json<Vec<AttachableProject>>, ApplicationError> {
    let artist_id = session.artist_id()?;
    let projects = applications(&state)?
        .store()
        .projects_without_applications(artist_id, &opportunity_id)
        .await?;
    Ok(Json(projects))
}

#[utoipa::path(
    put,
    path = "/v1/applications/{application_id}",
    request_body = ApplicationPayload,
    responses(
        (status = OK, description = "Draft updated; removed attachments deleted"),
        (status = CONFLICT, description = "Only drafts can be edited"),
    ),
    tag = APPLICATIONS_TAG,
)]
async fn update(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
    Json(payload): Json<ApplicationPayload>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let artist_id = session.artist_id()?;
    validate_content(&payload)?;

    let existing = applications.store().find_owned(&application_id, artist_id).await?;
    if existing.status_value() != ApplicationStatus::New {
        return Err(ApplicationError::Conflict {
            message: "only draft applications can be edited".into(),
            context: None,
        });
    }

    if let Some(project_id) = payload.project_id.as_deref() {
        if !applications.store().project_attachable(artist_id, project_id).await? {
            return Err(ApplicationError::NotFound {
                message: "project not found or not approved".into(),
                context: None,
            });
        }
    }
    if applications
        .store()
        .duplicate_exists(
            artist_id,
            &existing.opportunity,
            payload.project_id.as_deref(),
            Some(&application_id),
        )
        .await?
    {
        return Err(ApplicationError::Conflict {
            message: "another application already covers this project".into(),
            context: None,
        });
    }

    let removed = AttachmentRef::removed_ids(&existing.attachments, &payload.attachments);
    if !removed.is_empty() {
        slice::<Media>(&state, "Media slice not registered")?
            .store()
            .delete_owned(&session.user_id, &removed)
            .await?;
    }

    applications.store().update_content(&application_id, &payload).await
}

#[utoipa::path(
    post,
    path = "/v1/applications/{application_id}/send",
    responses(
        (status = OK, description = "Application submitted; invites marked accepted"),
        (status = FORBIDDEN, description = "Artist profile not approved"),
        (status = CONFLICT, description = "Not a draft"),
    ),
    tag = APPLICATIONS_TAG,
)]
async fn send(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let artist_id = session.artist_id()?;

    if !applications.store().artist_approved(artist_id).await? {
        return Err(ApplicationError::Forbidden {
            message: "profile must pass moderation before applying".into(),
            context: None,
        });
    }

    let existing = applications.store().find_owned(&application_id, artist_id).await?;
    if existing.status_value() != ApplicationStatus::New {
        return Err(ApplicationError::Conflict {
            message: "only draft applications can be sent".into(),
            context: None,
        });
    }

    if applications
        .store()
        .duplicate_exists(
            artist_id,
            &existing.opportunity,
            existing.project.as_deref(),
            Some(&application_id),
        )
        .await?
    {
        return Err(ApplicationError::Conflict {
            message: "another live application already covers this listing".into(),
            context: None,
        });
    }

    applications.store().set_status(&application_id, ApplicationStatus::Sent).await?;
    applications
        .store()
        .sync_invites(artist_id, &existing.opportunity, None, InviteStatus::Accepted)
        .await?;

    // Provider notification is best effort; submission already happened.
    match applications.store().provider_email(&existing.opportunity).await {
        Ok(Some(email)) => {
            let url = state.config.links.provider_applications(&existing.opportunity);
            let _ = state.events.publish(OutboundEmail::new(
                email,
                "Atelier | New application",
                format!("An artist submitted an application to your listing.\n\n{url}"),
            ));
        },
        Ok(None) => warn!(opportunity = existing.opportunity, "Provider has no email on file"),
        Err(e) => warn!(error = %e, "Provider email lookup failed"),
    }

    info!(artist = artist_id, application = application_id, "Application sent");
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/applications/{application_id}/revoke",
    responses((status = OK, description = "Submission withdrawn back to draft")),
    tag = APPLICATIONS_TAG,
)]
async fn revoke(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let artist_id = session.artist_id()?;

    let existing = applications.store().find_owned(&application_id, artist_id).await?;
    if existing.status_value() != ApplicationStatus::Sent {
        return Err(ApplicationError::Conflict {
            message: "only sent applications can be revoked".into(),
            context: None,
        });
    }

    release_invites(applications, artist_id, &existing.opportunity, &application_id).await?;
    applications.store().set_status(&application_id, ApplicationStatus::New).await
}

#[utoipa::path(
    post,
    path = "/v1/applications/{application_id}/archive",
    responses((status = OK, description = "Application archived by the artist")),
    tag = APPLICATIONS_TAG,
)]
async fn archive(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let artist_id = session.artist_id()?;

    let existing = applications.store().find_owned(&application_id, artist_id).await?;
    if !existing.status_value().artist_can_archive() {
        return Err(ApplicationError::Conflict {
            message: "application cannot be archived from its current state".into(),
            context: None,
        });
    }

    release_invites(applications, artist_id, &existing.opportunity, &application_id).await?;
    applications.store().set_status(&application_id, ApplicationStatus::ArchivedByArtist).await
}

#[utoipa::path(
    post,
    path = "/v1/applications/{application_id}/unarchive",
    responses((status = OK, description = "Application restored to draft")),
    tag = APPLICATIONS_TAG,
)]
async fn unarchive(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let artist_id = session.artist_id()?;

    let existing = applications.store().find_owned(&application_id, artist_id).await?;
    if existing.status_value() != ApplicationStatus::ArchivedByArtist {
        return Err(ApplicationError::Conflict {
            message: "only archived applications can be restored".into(),
            context: None,
        });
    }

    applications.store().set_status(&application_id, ApplicationStatus::New).await
}

#[utoipa::path(
    delete,
    path = "/v1/applications/{application_id}",
    responses((status = OK, description = "Application and its attachments deleted")),
    tag = APPLICATIONS_TAG,
)]
async fn delete(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let artist_id = session.artist_id()?;

    let existing = applications.store().find_owned(&application_id, artist_id).await?;

    release_invites(applications, artist_id, &existing.opportunity, &application_id).await?;

    let attachment_ids: Vec<String> = existing.attachments.iter().map(|a| a.id.clone()).collect();
    if !attachment_ids.is_empty() {
        slice::<Media>(&state, "Media slice not registered")?
            .store()
            .delete_owned(&session.user_id, &attachment_ids)
            .await?;
    }

    applications.store().delete(&application_id).await?;
    info!(artist = artist_id, application = application_id, "Application deleted");
    Ok(())
}

/// When the artist's last open application on a listing goes away, their
/// accepted invites fall back to pending.
async fn release_invites(
    applications: &Applications,
    artist_id: &str,
    opportunity_id: &str,
    withdrawn_id: &str,
) -> Result<(), ApplicationError> {
    if !applications
        .store()
        .open_application_remains(artist_id, opportunity_id, withdrawn_id)
        .await?
    {
        applications
            .store()
            .sync_invites(
                artist_id,
                opportunity_id,
                Some(InviteStatus::Accepted),
                InviteStatus::Pending,
            )
            .await?;
    }
    Ok(())
}

// --- provider side ---

#[utoipa::path(
    get,
    path = "/v1/applications",
    params(ProviderApplicationsFilter),
    responses((status = OK, description = "Applications across own listings", body = ProviderApplicationsResponse)),
    tag = APPLICATIONS_TAG,
)]
async fn provider_list(
    State(state): State<ApiState>,
    session: Session,
    Query(filter): Query<ProviderApplicationsFilter>,
) -> Result<Json<ProviderApplicationsResponse>, ApplicationError> {
    let applications = applications(&state)?;
    let provider_id = session.provider_id()?;

    let providers = slice::<Providers>(&state, "Providers slice not registered")?;
    let blocked = providers.store().blocked_artist_ids(provider_id).await?;

    let (pages_total, hits) =
        applications.store().provider_applications(provider_id, &filter, &blocked).await?;

    Ok(Json(ProviderApplicationsResponse {
        pages_total,
        blocked_artists: blocked,
        applications: hits,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/applications/{application_id}/status",
    request_body = StatusChangeRequest,
    responses(
        (status = OK, description = "Status updated"),
        (status = CONFLICT, description = "Transition not allowed"),
    ),
    tag = APPLICATIONS_TAG,
)]
async fn change_status(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let provider_id = session.provider_id()?;

    let existing = applications.store().find_for_provider(&application_id, provider_id).await?;
    if !existing.status_value().provider_can_set(payload.status) {
        return Err(ApplicationError::Conflict {
            message: "transition not allowed".into(),
            context: None,
        });
    }

    applications.store().set_status(&application_id, payload.status).await
}

#[utoipa::path(
    post,
    path = "/v1/applications/{application_id}/reject",
    request_body = RejectRequest,
    responses((status = OK, description = "Application rejected; artist optionally blocked")),
    tag = APPLICATIONS_TAG,
)]
async fn reject(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let provider_id = session.provider_id()?;

    let existing = applications.store().find_for_provider(&application_id, provider_id).await?;

    applications.store().set_status(&application_id, ApplicationStatus::Rejected).await?;

    if payload.block_artist {
        let providers = slice::<Providers>(&state, "Providers slice not registered")?;
        providers.store().block_artist(provider_id, &existing.artist).await?;
    }

    info!(provider = provider_id, application = application_id, "Application rejected");
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/applications/{application_id}/restore",
    responses(
        (status = OK, description = "Rejected application restored to sent; artist unblocked"),
        (status = CONFLICT, description = "Only rejected applications can be restored"),
    ),
    tag = APPLICATIONS_TAG,
)]
async fn restore(
    State(state): State<ApiState>,
    session: Session,
    Path(application_id): Path<String>,
) -> Result<(), ApplicationError> {
    let applications = applications(&state)?;
    let provider_id = session.provider_id()?;

    let existing = applications.store().find_for_provider(&application_id, provider_id).await?;
    if existing.status_value() != ApplicationStatus::Rejected {
        return Err(ApplicationError::Conflict {
            message: "only rejected applications can be restored".into(),
            context: None,
        });
    }

    applications.store().set_status(&application_id, ApplicationStatus::Sent).await?;

    let providers = slice::<Providers>(&state, "Providers slice not registered")?;
    providers.store().unblock_artist(provider_id, &existing.artist).await?;

    Ok(())
}
