use crate::error::IdentityError;
use crate::models::{
    AvailabilityResponse, CreateUser, EmailChangeRequest, LandingUrlResponse, LoginRequest,
    OauthExchangeRequest, OauthExchangeResponse, OkResponse, PasswordResetConfirm,
    PasswordResetRequest, RegisterByInviteRequest, SessionUser, TokenResponse,
    UpdatePasswordRequest, UsernameQuery, UserRow,
};
use crate::session::Session;
use crate::{Identity, hash, validate};
use atelier_domain::constants::IDENTITY_TAG;
use atelier_domain::email::OutboundEmail;
use atelier_kernel::security::RecordGuard;
use atelier_kernel::server::ApiState;
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::warn;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(oauth_exchange))
        .routes(routes!(current_session))
        .routes(routes!(username_available))
        .routes(routes!(register_by_invite))
        .routes(routes!(update_password))
        .routes(routes!(request_password_reset))
        .routes(routes!(confirm_password_reset))
        .routes(routes!(request_email_change))
        .routes(routes!(confirm_email_change))
        .routes(routes!(take_landing_url))
}

fn identity(state: &ApiState) -> Result<&Identity, IdentityError> {
    state.try_get_slice::<Identity>().map_err(|e| IdentityError::Internal {
        message: e.to_string().into(),
        context: Some("Identity slice not registered".into()),
    })
}

fn session_user(identity_user: &UserRow, artist: Option<String>, provider: Option<String>) -> SessionUser {
    SessionUser {
        id: identity_user.id.clone(),
        roles: identity_user.role_set().names().iter().map(ToString::to_string).collect(),
        artist_id: artist,
        provider_id: provider,
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = OK, description = "Session issued", body = TokenResponse),
        (status = UNAUTHORIZED, description = "Unknown or locked account"),
    ),
    tag = IDENTITY_TAG,
)]
async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, IdentityError> {
    let identity = identity(&state)?;

    let rejected = || IdentityError::Unauthorized {
        message: "invalid credentials".into(),
        context: None,
    };

    let user = identity.users().find_by_username(&payload.username).await?.ok_or_else(rejected)?;

    // OAuth-linked accounts never authenticate with a password.
    let Some(stored) = user.password.as_deref().filter(|_| user.oauth_external_id.is_none())
    else {
        return Err(rejected());
    };

    if user.locked || !hash::verify_password(&payload.password, stored) {
        return Err(rejected());
    }

    let token = identity.jwt().issue(&user.id)?;
    let (artist, provider) = identity.users().profile_ids(&user.id).await?;

    Ok(Json(TokenResponse { token, user: session_user(&user, artist, provider) }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/oauth",
    request_body = OauthExchangeRequest,
    responses(
        (status = OK, description = "Session issued or registration required", body = OauthExchangeResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Unverified or missing email"),
    ),
    tag = IDENTITY_TAG,
)]
async fn oauth_exchange(
    State(state): State<ApiState>,
    Json(payload): Json<OauthExchangeRequest>,
) -> Result<Json<OauthExchangeResponse>, IdentityError> {
    let identity = identity(&state)?;

    if !payload.email_verified {
        return Err(IdentityError::Validation {
            message: "email: not verified by the provider".into(),
            context: None,
        });
    }

    let external_id = format!("{}:{}", payload.provider, payload.subject);

    // Existing account: issue a session.
    if let Some(user) = identity.users().find_by_oauth(&external_id).await? {
        if user.locked {
            return Err(IdentityError::Unauthorized {
                message: "account locked".into(),
                context: None,
            });
        }
        let token = identity.jwt().issue(&user.id)?;
        let (artist, provider) = identity.users().profile_ids(&user.id).await?;
        return Ok(Json(OauthExchangeResponse {
            status: "ok",
            token: Some(token),
            user: Some(session_user(&user, artist, provider)),
            invite_id: None,
        }));
    }

    // Invitation already linked to this identity: registration pending.
    if let Some(invite_id) = identity.users().find_invite_by_oauth(&external_id).await? {
        return Ok(Json(OauthExchangeResponse {
            status: "registration_required",
            token: None,
            user: None,
            invite_id: Some(invite_id),
        }));
    }

    let Some(email) = payload.email.as_deref() else {
        return Err(IdentityError::Validation {
            message: "email: the provider shared no address".into(),
            context: None,
        });
    };
    validate::email(email)?;

    // Link to an invitation issued for this email, or start a fresh one.
    let invite_id = if identity.users().link_invite_oauth(email, &external_id).await? {
        identity.users().find_invite_by_oauth(&external_id).await?.ok_or_else(|| {
            IdentityError::Internal {
                message: "linked invite not readable".into(),
                context: None,
            }
        })?
    } else {
        identity.users().create_oauth_invite(email, &external_id).await?
    };

    Ok(Json(OauthExchangeResponse {
        status: "registration_required",
        token: None,
        user: None,
        invite_id: Some(invite_id),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses((status = OK, description = "Current session", body = SessionUser)),
    tag = IDENTITY_TAG,
)]
async fn current_session(session: Session) -> Json<SessionUser> {
    Json(SessionUser {
        id: session.user_id.clone(),
        roles: session.roles.names().iter().map(ToString::to_string).collect(),
        artist_id: session.artist_id.clone(),
        provider_id: session.provider_id.clone(),
    })
}

#[utoipa::path(
    get,
    path = "/v1/users/username-available",
    params(UsernameQuery),
    responses((status = OK, description = "Availability flag", body = AvailabilityResponse)),
    tag = IDENTITY_TAG,
)]
async fn username_available(
    State(state): State<ApiState>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<AvailabilityResponse>, IdentityError> {
    let identity = identity(&state)?;
    let available = query.username.is_empty()
        || identity.users().is_username_available(&query.username).await?;
    Ok(Json(AvailabilityResponse { available }))
}

#[utoipa::path(
    post,
    path = "/v1/users/register/{invite_id}",
    request_body = RegisterByInviteRequest,
    responses(
        (status = OK, description = "Account created", body = OkResponse),
        (status = NOT_FOUND, description = "Unknown invitation"),
    ),
    tag = IDENTITY_TAG,
)]
async fn register_by_invite(
    State(state): State<ApiState>,
    session: Option<Session>,
    Path(invite_id): Path<String>,
    Json(payload): Json<RegisterByInviteRequest>,
) -> Result<Json<OkResponse>, IdentityError> {
    if session.is_some() {
        return Err(IdentityError::Forbidden {
            message: "already signed in".into(),
            context: None,
        });
    }

    let identity = identity(&state)?;
    let invite_id = RecordGuard::verify(&invite_id, "user_invite").map_err(|e| {
        IdentityError::Validation { message: e.to_string().into(), context: None }
    })?;

    validate::username(&payload.username)?;
    validate::password(&payload.password)?;

    let invite = identity.users().find_user_invite(&invite_id).await?.ok_or_else(|| {
        warn!(invite_id, "Registration against unknown invitation");
        IdentityError::NotFound { message: "invitation not found".into(), context: None }
    })?;

    identity
        .users()
        .create(CreateUser {
            username: payload.username,
            password: Some(payload.password),
            email: Some(invite.email.clone()),
            oauth_external_id: None,
            roles: invite.role_set(),
            landing_url: Some("/".to_owned()),
        })
        .await?;

    identity.users().delete_user_invite(&invite_id).await?;

    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/v1/users/password",
    request_body = UpdatePasswordRequest,
    responses((status = OK, description = "Password updated", body = OkResponse)),
    tag = IDENTITY_TAG,
)]
async fn update_password(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<OkResponse>, IdentityError> {
    let identity = identity(&state)?;
    validate::password(&payload.password)?;

    let user = identity.users().find_by_id(&session.user_id).await?.ok_or(
        IdentityError::NotFound { message: "account not found".into(), context: None },
    )?;
    if user.oauth_external_id.is_some() {
        return Err(IdentityError::Forbidden {
            message: "password is managed by the identity provider".into(),
            context: None,
        });
    }

    identity.users().set_password(&session.user_id, &payload.password).await?;
    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/v1/users/password-reset",
    request_body = PasswordResetRequest,
    responses(
        (status = OK, description = "Reset link sent", body = OkResponse),
        (status = CONFLICT, description = "Cooldown still running"),
    ),
    tag = IDENTITY_TAG,
)]
async fn request_password_reset(
    State(state): State<ApiState>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<Json<OkResponse>, IdentityError> {
    let identity = identity(&state)?;
    validate::email(&payload.email)?;

    if !identity.users().is_email_registered(&payload.email).await? {
        return Err(IdentityError::Validation {
            message: "email: not registered".into(),
            context: None,
        });
    }

    let cooldown = state.config.security.reset_cooldown_seconds;
    let request = identity.users().create_password_reset(&payload.email, cooldown).await?;

    let url = state.config.links.password_reset(&request.id);
    state
        .events
        .publish(OutboundEmail::new(
            payload.email,
            "Atelier | Password reset",
            format!("A password reset was requested for your account.\n\nReset it here: {url}\n\nIf this was not you, ignore this message."),
        ))
        .map_err(|e| IdentityError::Internal {
            message: e.to_string().into(),
            context: Some("Queueing reset email".into()),
        })?;

    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/v1/users/password-reset/{request_id}",
    request_body = PasswordResetConfirm,
    responses(
        (status = OK, description = "Password replaced", body = OkResponse),
        (status = NOT_FOUND, description = "Unknown or spent request"),
    ),
    tag = IDENTITY_TAG,
)]
async fn confirm_password_reset(
    State(state): State<ApiState>,
    session: Option<Session>,
    Path(request_id): Path<String>,
    Json(payload): Json<PasswordResetConfirm>,
) -> Result<Json<OkResponse>, IdentityError> {
    if session.is_some() {
        return Err(IdentityError::Forbidden {
            message: "already signed in".into(),
            context: None,
        });
    }

    let identity = identity(&state)?;
    validate::password(&payload.password)?;

    let request = identity.users().find_password_reset(&request_id).await?.ok_or_else(|| {
        warn!(request_id, "Password reset against unknown request");
        IdentityError::NotFound { message: "reset request not found".into(), context: None }
    })?;

    let user = identity.users().find_by_email(&request.email).await?.ok_or(
        IdentityError::NotFound { message: "account not found".into(), context: None },
    )?;

    if let Some(stored) = user.password.as_deref() {
        if hash::verify_password(&payload.password, stored) {
            return Err(IdentityError::Validation {
                message: "password: must differ from the current one".into(),
                context: None,
            });
        }
    }

    identity.users().set_password(&user.id, &payload.password).await?;
    identity.users().delete_password_reset(&request.id).await?;
    identity.invalidate_session(&user.id);

    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/v1/users/email-change",
    request_body = EmailChangeRequest,
    responses(
        (status = OK, description = "Verification link sent", body = OkResponse),
        (status = CONFLICT, description = "Address already registered"),
    ),
    tag = IDENTITY_TAG,
)]
async fn request_email_change(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<EmailChangeRequest>,
) -> Result<Json<OkResponse>, IdentityError> {
    let identity = identity(&state)?;
    validate::email(&payload.email)?;

    if identity.users().is_email_registered(&payload.email).await? {
        return Err(IdentityError::Conflict {
            message: "email: already registered".into(),
            context: None,
        });
    }

    let user = identity.users().find_by_id(&session.user_id).await?.ok_or(
        IdentityError::NotFound { message: "account not found".into(), context: None },
    )?;
    let current_email = user.email.ok_or(IdentityError::Forbidden {
        message: "account has no confirmed email".into(),
        context: None,
    })?;

    let request = identity.users().create_email_change(&current_email, &payload.email).await?;

    let url = state.config.links.email_change(&request.id);
    state
        .events
        .publish(OutboundEmail::new(
            payload.email,
            "Atelier | Verify your new address",
            format!("Confirm your new email address by opening this link: {url}"),
        ))
        .map_err(|e| IdentityError::Internal {
            message: e.to_string().into(),
            context: Some("Queueing verification email".into()),
        })?;

    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/v1/users/email-change/{request_id}",
    responses(
        (status = OK, description = "Email replaced", body = OkResponse),
        (status = FORBIDDEN, description = "Request belongs to another account"),
    ),
    tag = IDENTITY_TAG,
)]
async fn confirm_email_change(
    State(state): State<ApiState>,
    session: Session,
    Path(request_id): Path<String>,
) -> Result<Json<OkResponse>, IdentityError> {
    let identity = identity(&state)?;

    let request = identity.users().find_email_change(&request_id).await?.ok_or(
        IdentityError::NotFound { message: "verification request not found".into(), context: None },
    )?;

    let user = identity.users().find_by_id(&session.user_id).await?.ok_or(
        IdentityError::NotFound { message: "account not found".into(), context: None },
    )?;
    if user.email.as_deref() != Some(request.current_email.as_str()) {
        warn!(user = session.user_id, request = request.id, "Email change request mismatch");
        return Err(IdentityError::Forbidden {
            message: "verification link belongs to another account".into(),
            context: None,
        });
    }

    identity.users().set_email(&request.current_email, &request.new_email).await?;
    identity.users().delete_email_change(&request.id).await?;

    Ok(Json(OkResponse::new()))
}

#[utoipa::path(
    post,
    path = "/v1/users/landing-url/take",
    responses((status = OK, description = "One-shot redirect, cleared on read", body = LandingUrlResponse)),
    tag = IDENTITY_TAG,
)]
async fn take_landing_url(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<LandingUrlResponse>, IdentityError> {
    let identity = identity(&state)?;
    let url = identity.users().take_landing_url(&session.user_id).await?;
    Ok(Json(LandingUrlResponse { url }))
}
