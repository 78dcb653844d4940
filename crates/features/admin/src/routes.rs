use crate::error::AdminError;
use crate::models::{
    ArtistDashboard, LockRequest, MarkRequest, ProviderDashboard, UserDetailResponse,
    UserInvitePayload, UserInvitesResponse, UsersFilter, UsersResponse,
    MAX_INVITE_MESSAGE_LENGTH, MAX_INVITE_SUBJECT_LENGTH,
};
use crate::store::month_bounds;
use crate::Admin;
use atelier_domain::constants::ADMIN_TAG;
use atelier_domain::email::OutboundEmail;
use atelier_domain::roles::RoleSet;
use atelier_identity::{Identity, Session};
use atelier_kernel::server::ApiState;
use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(create_invite))
        .routes(routes!(list_invites))
        .routes(routes!(resend_invite))
        .routes(routes!(revoke_invite))
        .routes(routes!(list_users))
        .routes(routes!(user_detail))
        .routes(routes!(set_user_lock))
        .routes(routes!(set_artist_lock))
        .routes(routes!(set_artist_mark))
        .routes(routes!(artist_dashboard))
        .routes(routes!(provider_dashboard))
}

fn admin(state: &ApiState) -> Result<&Admin, AdminError> {
    state.try_get_slice::<Admin>().map_err(|e| AdminError::Internal {
        message: e.to_string().into(),
        context: Some("Admin slice not registered".into()),
    })
}

fn identity(state: &ApiState) -> Result<&Identity, AdminError> {
    state.try_get_slice::<Identity>().map_err(|e| AdminError::Internal {
        message: e.to_string().into(),
        context: Some("Identity slice not registered".into()),
    })
}

fn require_admin(session: &Session) -> Result<(), AdminError> {
    session
        .require_role(RoleSet::ADMINISTRATOR)
        .map_err(|e| AdminError::Forbidden { message: e.to_string().into(), context: None })
}

fn invite_email(state: &ApiState, invite_id: &str, payload_roles: &RoleSet, subject: Option<&str>, message: Option<&str>) -> OutboundEmail {
    let url = state.config.links.user_invite(invite_id);
    let subject = subject.map_or_else(
        || {
            let role = payload_roles.names().first().copied().unwrap_or("member");
            format!("Atelier | {} invitation", capitalize(role))
        },
        str::to_owned,
    );
    let body = message.map_or_else(
        || format!("You have been invited to Atelier. Register here: {url}"),
        |message| format!("{message}\n\nRegister here: {url}"),
    );
    OutboundEmail::new(String::new(), subject, body)
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().replace('_', " ")
    })
}

#[utoipa::path(
    post,
    path = "/v1/admin/invites",
    request_body = UserInvitePayload,
    responses(
        (status = OK, description = "Invitation created and emailed"),
        (status = CONFLICT, description = "Email already registered"),
    ),
    tag = ADMIN_TAG,
)]
async fn create_invite(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<UserInvitePayload>,
) -> Result<(), AdminError> {
    require_admin(&session)?;
    let admin = admin(&state)?;
    let identity = identity(&state)?;

    atelier_identity::validate_email(&payload.email)
        .map_err(|e| AdminError::Validation { message: e.to_string().into(), context: None })?;
    if payload.organization_name.trim().is_empty() {
        return Err(AdminError::Validation {
            message: "organizationName: required".into(),
            context: None,
        });
    }
    let roles = payload.role_set();
    if roles.is_empty() {
        return Err(AdminError::Validation {
            message: "roles: at least one valid role is required".into(),
            context: None,
        });
    }
    // Multi-role invitations need an explicit message so the invitee
    // understands what they are accepting.
    if roles.count() > 1 && (payload.subject.is_none() || payload.message.is_none()) {
        return Err(AdminError::Validation {
            message: "subject and message are required for multi-role invitations".into(),
            context: None,
        });
    }
    if payload.subject.as_deref().is_some_and(|s| s.chars().count() > MAX_INVITE_SUBJECT_LENGTH) {
        return Err(AdminError::Validation {
            message: format!("subject: must be at most {MAX_INVITE_SUBJECT_LENGTH} characters")
                .into(),
            context: None,
        });
    }
    if payload.message.as_deref().is_some_and(|m| m.chars().count() > MAX_INVITE_MESSAGE_LENGTH) {
        return Err(AdminError::Validation {
            message: format!("message: must be at most {MAX_INVITE_MESSAGE_LENGTH} characters")
                .into(),
            context: None,
        });
    }
    if identity.users().is_email_registered(&payload.email).await.map_err(AdminError::from)? {
        return Err(AdminError::Conflict {
            message: "email: already registered".into(),
            context: None,
        });
    }

    let role_names: Vec<String> = roles.names().iter().map(ToString::to_string).collect();
    let invite_id = admin
        .store()
        .create_user_invite(
            &payload.email,
            &payload.organization_name,
            payload.subject.as_deref(),
            payload.message.as_deref(),
            &role_names,
        )
        .await?;

    let mut email = invite_email(
        &state,
        &invite_id,
        &roles,
        payload.subject.as_deref(),
        payload.message.as_deref(),
    );
    email.to = payload.email.clone();
    if let Err(e) = state.events.publish(email) {
        warn!(error = %e, "Invite email could not be queued");
    }

    info!(invite = invite_id, email = payload.email, "User invitation created");
    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/admin/invites",
    responses((status = OK, description = "Outstanding invitations", body = UserInvitesResponse)),
    tag = ADMIN_TAG,
)]
async fn list_invites(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<UserInvitesResponse>, AdminError> {
    require_admin(&session)?;
    let invites = admin(&state)?.store().list_user_invites().await?;
    Ok(Json(UserInvitesResponse { invites }))
}

#[utoipa::path(
    post,
    path = "/v1/admin/invites/{invite_id}/resend",
    responses(
        (status = OK, description = "Invitation re-emailed"),
        (status = NOT_FOUND, description = "Unknown invitation"),
    ),
    tag = ADMIN_TAG,
)]
async fn resend_invite(
    State(state): State<ApiState>,
    session: Session,
    Path(invite_id): Path<String>,
) -> Result<(), AdminError> {
    require_admin(&session)?;
    let identity = identity(&state)?;

    let invite = identity
        .users()
        .find_user_invite(&invite_id)
        .await
        .map_err(AdminError::from)?
        .ok_or_else(|| {
            warn!(invite_id, "Resend requested for unknown invitation");
            AdminError::NotFound { message: "invitation not found".into(), context: None }
        })?;

    let mut email = invite_email(
        &state,
        &invite.id,
        &invite.role_set(),
        invite.subject.as_deref(),
        invite.message.as_deref(),
    );
    email.to = invite.email.clone();
    if let Err(e) = state.events.publish(email) {
        warn!(error = %e, "Invite email could not be queued");
    }

    Ok(())
}

#[utoipa::path(
    delete,
    path = "/v1/admin/invites/{invite_id}",
    responses((status = OK, description = "Invitation revoked")),
    tag = ADMIN_TAG,
)]
async fn revoke_invite(
    State(state): State<ApiState>,
    session: Session,
    Path(invite_id): Path<String>,
) -> Result<(), AdminError> {
    require_admin(&session)?;
    identity(&state)?.users().delete_user_invite(&invite_id).await.map_err(AdminError::from)
}

#[utoipa::path(
    get,
    path = "/v1/admin/users",
    params(UsersFilter),
    responses((status = OK, description = "Filtered account listing", body = UsersResponse)),
    tag = ADMIN_TAG,
)]
async fn list_users(
    State(state): State<ApiState>,
    session: Session,
    Query(filter): Query<UsersFilter>,
) -> Result<Json<UsersResponse>, AdminError> {
    require_admin(&session)?;
    let (pages_total, users) = admin(&state)?.store().list_users(&filter).await?;
    Ok(Json(UsersResponse { pages_total, users }))
}

#[utoipa::path(
    get,
    path = "/v1/admin/users/{user_id}",
    responses(
        (status = OK, description = "Account with its profiles", body = UserDetailResponse),
        (status = NOT_FOUND, description = "Unknown account"),
    ),
    tag = ADMIN_TAG,
)]
async fn user_detail(
    State(state): State<ApiState>,
    session: Session,
    Path(user_id): Path<String>,
) -> Result<Json<UserDetailResponse>, AdminError> {
    require_admin(&session)?;
    let identity = identity(&state)?;

    let user = identity
        .users()
        .find_by_id(&user_id)
        .await
        .map_err(AdminError::from)?
        .ok_or(AdminError::NotFound { message: "account not found".into(), context: None })?;
    let (artist_id, provider_id) =
        identity.users().profile_ids(&user_id).await.map_err(AdminError::from)?;

    Ok(Json(UserDetailResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        roles: user.roles,
        locked: user.locked,
        artist_id,
        provider_id,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/admin/users/{user_id}/lock",
    request_body = LockRequest,
    responses((status = OK, description = "Lock state updated")),
    tag = ADMIN_TAG,
)]
async fn set_user_lock(
    State(state): State<ApiState>,
    session: Session,
    Path(user_id): Path<String>,
    Json(payload): Json<LockRequest>,
) -> Result<(), AdminError> {
    require_admin(&session)?;
    let identity = identity(&state)?;

    identity.users().set_locked(&user_id, payload.locked).await.map_err(AdminError::from)?;
    identity.invalidate_session(&user_id);

    info!(admin = session.user_id, user = user_id, locked = payload.locked, "Lock state changed");
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/admin/artists/{artist_id}/lock",
    request_body = LockRequest,
    responses(
        (status = OK, description = "Owning account lock state updated"),
        (status = NOT_FOUND, description = "Unknown artist"),
    ),
    tag = ADMIN_TAG,
)]
async fn set_artist_lock(
    State(state): State<ApiState>,
    session: Session,
    Path(artist_id): Path<String>,
    Json(payload): Json<LockRequest>,
) -> Result<(), AdminError> {
    require_admin(&session)?;
    let admin = admin(&state)?;
    let identity = identity(&state)?;

    let user_id = admin.store().artist_user_id(&artist_id).await?.ok_or(AdminError::NotFound {
        message: "artist not found".into(),
        context: None,
    })?;

    identity.users().set_locked(&user_id, payload.locked).await.map_err(AdminError::from)?;
    identity.invalidate_session(&user_id);
    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/admin/artists/{artist_id}/mark",
    request_body = MarkRequest,
    responses((status = OK, description = "Admin mark updated")),
    tag = ADMIN_TAG,
)]
async fn set_artist_mark(
    State(state): State<ApiState>,
    session: Session,
    Path(artist_id): Path<String>,
    Json(payload): Json<MarkRequest>,
) -> Result<(), AdminError> {
    require_admin(&session)?;
    admin(&state)?.store().set_admin_mark(&artist_id, &payload.mark.to_string()).await
}

#[utoipa::path(
    get,
    path = "/v1/admin/dashboard/artists",
    responses((status = OK, description = "Artist-side statistics", body = ArtistDashboard)),
    tag = ADMIN_TAG,
)]
async fn artist_dashboard(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<ArtistDashboard>, AdminError> {
    require_admin(&session)?;
    let store = admin(&state)?.store();

    let now = Utc::now();
    let (this_start, this_end) = month_bounds(now, 0);
    let (last_start, last_end) = month_bounds(now, 1);

    Ok(Json(ArtistDashboard {
        artist_count: store.artist_count().await?,
        project_count: store.visible_project_count().await?,
        open_application_count: store.open_application_count().await?,
        submitted_application_count: store.submitted_application_count().await?,
        artists_by_industry: store.artists_by_industry().await?,
        artists_by_country: store.artists_by_country().await?,
        new_this_month: store.artists_created_between(this_start, this_end).await?,
        new_last_month: store.artists_created_between(last_start, last_end).await?,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/admin/dashboard/providers",
    responses((status = OK, description = "Provider-side statistics", body = ProviderDashboard)),
    tag = ADMIN_TAG,
)]
async fn provider_dashboard(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<ProviderDashboard>, AdminError> {
    require_admin(&session)?;
    let store = admin(&state)?.store();

    Ok(Json(ProviderDashboard {
        provider_count: store.provider_count().await?,
        live_opportunity_count: store.live_opportunity_count().await?,
        opportunities_by_kind: store.opportunities_by_kind().await?,
        outstanding_provider_invites: store.outstanding_provider_invites().await?,
    }))
}
