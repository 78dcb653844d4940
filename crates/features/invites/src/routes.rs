use crate::error::InviteError;
use crate::models::{
    BatchArtistInvites, BatchOpportunityInvites, BatchUnregisteredInvites, MyInvitesResponse,
    ProviderInvitesResponse, SelfInviteRequest, SweepResponse, MAX_INVITE_MESSAGE_LENGTH,
    MAX_INVITE_SUBJECT_LENGTH,
};
use crate::{Invites, notify};
use atelier_domain::constants::INVITES_TAG;
use atelier_domain::email::OutboundEmail;
use atelier_domain::status::InviteStatus;
use atelier_identity::Session;
use atelier_kernel::server::ApiState;
use atelier_opportunities::Opportunities;
use axum::Json;
use axum::extract::{Path, State};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, warn};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(invite_artists))
        .routes(routes!(invite_to_opportunities))
        .routes(routes!(invite_unregistered))
        .routes(routes!(provider_invites))
        .routes(routes!(delete_invite))
        .routes(routes!(delete_unregistered))
        .routes(routes!(my_invites))
        .routes(routes!(reject_invite))
        .routes(routes!(unreject_invite))
        .routes(routes!(self_invite))
        .routes(routes!(run_sweep))
}

fn invites(state: &ApiState) -> Result<&Invites, InviteError> {
    state.try_get_slice::<Invites>().map_err(|e| InviteError::Internal {
        message: e.to_string().into(),
        context: Some("Invites slice not registered".into()),
    })
}

fn opportunities(state: &ApiState) -> Result<&Opportunities, InviteError> {
    state.try_get_slice::<Opportunities>().map_err(|e| InviteError::Internal {
        message: e.to_string().into(),
        context: Some("Opportunities slice not registered".into()),
    })
}

fn check_message(message: &str) -> Result<(), InviteError> {
    if message.chars().count() > MAX_INVITE_MESSAGE_LENGTH {
        return Err(InviteError::Validation {
            message: format!("message: must be at most {MAX_INVITE_MESSAGE_LENGTH} characters")
                .into(),
            context: None,
        });
    }
    Ok(())
}

fn queue_email(state: &ApiState, email: OutboundEmail) {
    if let Err(e) = state.events.publish(email) {
        warn!(error = %e, "Email queue rejected a message");
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[utoipa::path(
    post,
    path = "/v1/invites/opportunity/{opportunity_id}",
    request_body = BatchArtistInvites,
    responses(
        (status = OK, description = "Invites created and artists emailed"),
        (status = FORBIDDEN, description = "Banned listing or unapproved artist in the batch"),
    ),
    tag = INVITES_TAG,
)]
async fn invite_artists(
    State(state): State<ApiState>,
    session: Session,
    Path(opportunity_id): Path<String>,
    Json(payload): Json<BatchArtistInvites>,
) -> Result<(), InviteError> {
    let invites = invites(&state)?;
    let provider_id = session.provider_id()?;
    check_message(&payload.message)?;
    if payload.invites.is_empty() {
        return Err(InviteError::Validation {
            message: "invites: at least one artist is required".into(),
            context: None,
        });
    }

    let opportunity = opportunities(&state)?
        .store()
        .find_owned(&opportunity_id, provider_id)
        .await
        .map_err(|_| InviteError::NotFound {
            message: "opportunity not found".into(),
            context: None,
        })?;
    if !opportunity.open_for_invites(&today()) {
        return Err(InviteError::Forbidden {
            message: "listing is closed for invitations".into(),
            context: None,
        });
    }

    for entry in &payload.invites {
        if let Some(message) = &entry.message {
            check_message(message)?;
        }
        if !invites.store().artist_approved(&entry.artist_id).await? {
            return Err(InviteError::Forbidden {
                message: "every invited artist must be approved".into(),
                context: None,
            });
        }
    }

    let invites_page = state.config.links.artist_invites_page();
    for entry in &payload.invites {
        let message = entry.message.as_deref().unwrap_or(&payload.message);
        invites.store().create_invite(&entry.artist_id, &opportunity_id, message).await?;

        if let Some(email) = invites.store().artist_email(&entry.artist_id).await? {
            queue_email(
                &state,
                OutboundEmail::new(
                    email,
                    "Atelier | Opportunity invite",
                    format!("{message}\n\nReview your invitations: {invites_page}"),
                ),
            );
        }
    }

    info!(provider = provider_id, opportunity = opportunity_id, count = payload.invites.len(),
        "Artists invited");
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/invites/artist/{artist_id}",
    request_body = BatchOpportunityInvites,
    responses(
        (status = OK, description = "Invites created across listings"),
        (status = FORBIDDEN, description = "A listing in the batch is closed"),
    ),
    tag = INVITES_TAG,
)]
async fn invite_to_opportunities(
    State(state): State<ApiState>,
    session: Session,
    Path(artist_id): Path<String>,
    Json(payload): Json<BatchOpportunityInvites>,
) -> Result<(), InviteError> {
    let invites = invites(&state)?;
    let provider_id = session.provider_id()?;
    check_message(&payload.message)?;
    if payload.invites.is_empty() {
        return Err(InviteError::Validation {
            message: "invites: at least one listing is required".into(),
            context: None,
        });
    }

    if !invites.store().artist_approved(&artist_id).await? {
        return Err(InviteError::NotFound {
            message: "artist not found".into(),
            context: None,
        });
    }

    // Validate the whole batch before creating anything.
    let today = today();
    for entry in &payload.invites {
        if let Some(message) = &entry.message {
            check_message(message)?;
        }
        let opportunity = opportunities(&state)?
            .store()
            .find_owned(&entry.opportunity_id, provider_id)
            .await
            .map_err(|_| InviteError::Forbidden {
                message: "every listing must be the caller's own".into(),
                context: None,
            })?;
        if !opportunity.open_for_invites(&today) {
            return Err(InviteError::Forbidden {
                message: "a listing in the batch is closed for invitations".into(),
                context: None,
            });
        }
    }

    let email = invites.store().artist_email(&artist_id).await?;
    let invites_page = state.config.links.artist_invites_page();

    for entry in &payload.invites {
        let message = entry.message.as_deref().unwrap_or(&payload.message);
        invites.store().create_invite(&artist_id, &entry.opportunity_id, message).await?;

        if let Some(address) = &email {
            queue_email(
                &state,
                OutboundEmail::new(
                    address.clone(),
                    "Atelier | Opportunity invite",
                    format!("{message}\n\nReview your invitations: {invites_page}"),
                ),
            );
        }
    }

    info!(provider = provider_id, artist = artist_id, count = payload.invites.len(),
        "Artist invited to listings");
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/invites/opportunity/{opportunity_id}/unregistered",
    request_body = BatchUnregisteredInvites,
    responses(
        (status = OK, description = "Registration invitations queued and emailed"),
        (status = CONFLICT, description = "An email already belongs to an artist or is already invited"),
    ),
    tag = INVITES_TAG,
)]
async fn invite_unregistered(
    State(state): State<ApiState>,
    session: Session,
    Path(opportunity_id): Path<String>,
    Json(payload): Json<BatchUnregisteredInvites>,
) -> Result<(), InviteError> {
    let invites = invites(&state)?;
    let provider_id = session.provider_id()?;

    check_message(&payload.message)?;
    if payload.subject.chars().count() > MAX_INVITE_SUBJECT_LENGTH {
        return Err(InviteError::Validation {
            message: format!("subject: must be at most {MAX_INVITE_SUBJECT_LENGTH} characters")
                .into(),
            context: None,
        });
    }
    if payload.invites.is_empty() {
        return Err(InviteError::Validation {
            message: "invites: at least one email is required".into(),
            context: None,
        });
    }

    let mut emails = Vec::with_capacity(payload.invites.len());
    let mut seen = HashSet::new();
    for entry in &payload.invites {
        atelier_identity::validate_email(&entry.email).map_err(InviteError::from)?;
        check_message(&entry.message)?;
        if !seen.insert(entry.email.to_lowercase()) {
            return Err(InviteError::Validation {
                message: "invites: emails must be unique".into(),
                context: None,
            });
        }
        emails.push(entry.email.clone());
    }

    let opportunity = opportunities(&state)?
        .store()
        .find_owned(&opportunity_id, provider_id)
        .await
        .map_err(|_| InviteError::NotFound {
            message: "opportunity not found".into(),
            context: None,
        })?;
    if opportunity.banned {
        return Err(InviteError::Forbidden {
            message: "listing is banned".into(),
            context: None,
        });
    }

    let registered = invites.store().emails_of_registered_artists(&emails).await?;
    if !registered.is_empty() {
        return Err(InviteError::Conflict {
            message: format!("artists already exist for: {}", registered.join(", ")).into(),
            context: None,
        });
    }
    let already_invited = invites.store().emails_already_invited(&opportunity_id, &emails).await?;
    if !already_invited.is_empty() {
        return Err(InviteError::Conflict {
            message: format!("already invited: {}", already_invited.join(", ")).into(),
            context: None,
        });
    }

    for entry in &payload.invites {
        let message =
            if entry.message.is_empty() { payload.message.as_str() } else { &entry.message };
        let subject = if entry.subject.is_empty() {
            if payload.subject.is_empty() { "Atelier | Registration" } else { &payload.subject }
        } else {
            &entry.subject
        };

        let artist_invite =
            invites.store().queue_unregistered(&entry.email, &opportunity_id, message).await?;

        let url = state.config.links.artist_invite(&artist_invite);
        queue_email(
            &state,
            OutboundEmail::new(
                entry.email.clone(),
                subject,
                format!(
                    "{message}\n\nListing: {}\n\nRegister here to apply: {url}",
                    opportunity.description
                ),
            ),
        );
    }

    info!(provider = provider_id, opportunity = opportunity_id, count = emails.len(),
        "Unregistered artists invited");
    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/invites/opportunity/{opportunity_id}",
    responses((status = OK, description = "Invites on one listing", body = ProviderInvitesResponse)),
    tag = INVITES_TAG,
)]
async fn provider_invites(
    State(state): State<ApiState>,
    session: Session,
    Path(opportunity_id): Path<String>,
) -> Result<Json<ProviderInvitesResponse>, InviteError> {
    let invites = invites(&state)?;
    let provider_id = session.provider_id()?;

    // Ownership check via the opportunities store.
    opportunities(&state)?
        .store()
        .find_owned(&opportunity_id, provider_id)
        .await
        .map_err(|_| InviteError::NotFound {
            message: "opportunity not found".into(),
            context: None,
        })?;

    Ok(Json(ProviderInvitesResponse {
        invites: invites.store().provider_invites(&opportunity_id).await?,
        unregistered: invites.store().unregistered_for_opportunity(&opportunity_id).await?,
        application_count: invites.store().application_count(&opportunity_id).await?,
    }))
}

#[utoipa::path(
    delete,
    path = "/v1/invites/{invite_id}",
    responses(
        (status = OK, description = "Pending invite withdrawn"),
        (status = CONFLICT, description = "Only pending invites can be withdrawn"),
    ),
    tag = INVITES_TAG,
)]
async fn delete_invite(
    State(state): State<ApiState>,
    session: Session,
    Path(invite_id): Path<String>,
) -> Result<(), InviteError> {
    let invites = invites(&state)?;
    let provider_id = session.provider_id()?;

    let invite =
        invites.store().find_for_provider(&invite_id, provider_id).await?.ok_or(
            InviteError::NotFound { message: "invite not found".into(), context: None },
        )?;

    if invite.status != InviteStatus::Pending.to_string() {
        return Err(InviteError::Conflict {
            message: "only pending invites can be withdrawn".into(),
            context: None,
        });
    }

    invites.store().delete_invite(&invite_id).await
}

#[utoipa::path(
    delete,
    path = "/v1/invites/unregistered/{id}",
    responses((status = OK, description = "Unregistered invite withdrawn; orphaned invitations cancelled")),
    tag = INVITES_TAG,
)]
async fn delete_unregistered(
    State(state): State<ApiState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<(), InviteError> {
    let invites = invites(&state)?;
    let provider_id = session.provider_id()?;

    let (detail, siblings) = invites
        .store()
        .find_unregistered_for_provider(&id, provider_id)
        .await?
        .ok_or(InviteError::NotFound { message: "invite not found".into(), context: None })?;

    // The registration invitation goes too when this was its only
    // purpose and the artist never asked for it themselves.
    if siblings <= 1 && !detail.created_by_artist {
        invites.store().delete_artist_invite(&detail.artist_invite).await?;
        queue_email(
            &state,
            OutboundEmail::new(
                detail.email,
                "Atelier | Registration",
                "The invitation to register has been cancelled by the provider.",
            ),
        );
        return Ok(());
    }

    invites.store().delete_unregistered(&id).await
}

#[utoipa::path(
    get,
    path = "/v1/invites/mine",
    responses((status = OK, description = "Own invites on live listings", body = MyInvitesResponse)),
    tag = INVITES_TAG,
)]
async fn my_invites(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<MyInvitesResponse>, InviteError> {
    let artist_id = session.artist_id()?;
    let hits = invites(&state)?.store().list_mine(artist_id).await?;
    Ok(Json(MyInvitesResponse { invites: hits }))
}

#[utoipa::path(
    post,
    path = "/v1/invites/opportunity/{opportunity_id}/reject",
    responses((status = OK, description = "Pending invites on the listing rejected")),
    tag = INVITES_TAG,
)]
async fn reject_invite(
    State(state): State<ApiState>,
    session: Session,
    Path(opportunity_id): Path<String>,
) -> Result<(), InviteError> {
    let artist_id = session.artist_id()?;
    invites(&state)?
        .store()
        .set_status_for_artist(artist_id, &opportunity_id, InviteStatus::Pending, InviteStatus::Rejected)
        .await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/invites/opportunity/{opportunity_id}/unreject",
    responses((status = OK, description = "Rejected invites on the listing reopened")),
    tag = INVITES_TAG,
)]
async fn unreject_invite(
    State(state): State<ApiState>,
    session: Session,
    Path(opportunity_id): Path<String>,
) -> Result<(), InviteError> {
    let artist_id = session.artist_id()?;
    invites(&state)?
        .store()
        .set_status_for_artist(artist_id, &opportunity_id, InviteStatus::Rejected, InviteStatus::Pending)
        .await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/invites/self",
    request_body = SelfInviteRequest,
    responses(
        (status = OK, description = "Registration link emailed"),
        (status = CONFLICT, description = "Account exists or cooldown running"),
    ),
    tag = INVITES_TAG,
)]
async fn self_invite(
    State(state): State<ApiState>,
    session: Option<Session>,
    Json(payload): Json<SelfInviteRequest>,
) -> Result<(), InviteError> {
    if session.is_some() {
        return Err(InviteError::Forbidden {
            message: "already signed in".into(),
            context: None,
        });
    }

    let invites = invites(&state)?;
    atelier_identity::validate_email(&payload.email).map_err(InviteError::from)?;

    let cooldown = state.config.security.invite_cooldown_seconds;
    let invite_id = invites.store().self_invite(&payload.email, cooldown).await?;

    let url = state.config.links.artist_invite(&invite_id);
    queue_email(
        &state,
        OutboundEmail::new(
            payload.email.clone(),
            "Atelier | Registration",
            format!("Welcome to Atelier. Complete your artist registration here: {url}"),
        ),
    );
    invites.store().mark_invite_sent(&invite_id).await?;

    info!(invite = invite_id, "Self-service artist invitation sent");
    Ok(())
}

// --- deadline notification sweep ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct SweepRequest {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/v1/scheduler/run",
    request_body = SweepRequest,
    responses(
        (status = OK, description = "Sweep executed", body = SweepResponse),
        (status = UNAUTHORIZED, description = "Bad scheduler token"),
    ),
    tag = INVITES_TAG,
)]
async fn run_sweep(
    State(state): State<ApiState>,
    Json(payload): Json<SweepRequest>,
) -> Result<Json<SweepResponse>, InviteError> {
    let expected = &state.config.scheduler.token;
    if expected.is_empty() || payload.token != *expected {
        return Err(InviteError::Unauthorized {
            message: "scheduler token mismatch".into(),
            context: None,
        });
    }

    let invites = invites(&state)?;
    let checkpoint_minutes = &state.config.scheduler.deadline_minutes;
    if checkpoint_minutes.is_empty() {
        return Err(InviteError::Validation {
            message: "scheduler: no deadline checkpoints configured".into(),
            context: None,
        });
    }

    let now = Utc::now();
    let invites_page = state.config.links.artist_invites_page();
    let mut notified = 0;

    for candidate in invites.store().sweep_candidates().await? {
        // Applications close at the end of the deadline day.
        let Some(deadline) = NaiveDate::parse_from_str(&candidate.application_deadline, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| Utc.from_utc_datetime(&dt))
        else {
            warn!(invite = candidate.id, "Sweep candidate with unparsable deadline");
            continue;
        };

        let checkpoints = notify::build_checkpoints(checkpoint_minutes, deadline);
        let last = candidate
            .notice_times
            .iter()
            .max()
            .and_then(|seconds| Utc.timestamp_opt(*seconds, 0).single());

        if !notify::notification_due(&checkpoints, now, last) {
            continue;
        }

        let Some(email) = candidate.email.clone() else {
            warn!(invite = candidate.id, "Sweep candidate without an email address");
            continue;
        };

        invites.store().record_notice(&candidate.id).await?;
        queue_email(
            &state,
            OutboundEmail::new(
                email,
                "Atelier | Opportunity invite",
                format!(
                    "The listing \"{}\" closes on {} ({} days left).\n\n\
                     Review your invitations: {invites_page}",
                    candidate.title,
                    candidate.application_deadline,
                    notify::days_between(now, deadline),
                ),
            ),
        );
        notified += 1;
    }

    info!(notified, "Deadline notification sweep finished");
    Ok(Json(SweepResponse { notified }))
}
