use crate::error::ProviderError;
use crate::models::{
    BlockedArtistsResponse, ProviderApplicationRequest, ProviderProfilePayload,
    ProviderProfileResponse, ProviderRegistration,
};
use crate::{Providers, validate};
use atelier_domain::constants::PROVIDERS_TAG;
use atelier_domain::email::OutboundEmail;
use atelier_domain::roles::RoleSet;
use atelier_identity::{CreateUser, Identity, Session};
use atelier_kernel::security::RecordGuard;
use atelier_kernel::server::ApiState;
use axum::Json;
use axum::extract::{Path, State};
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(apply))
        .routes(routes!(register_by_invite))
        .routes(routes!(my_profile))
        .routes(routes!(update_my_profile))
        .routes(routes!(blocked_artists))
        .routes(routes!(unblock_artist))
}

fn providers(state: &ApiState) -> Result<&Providers, ProviderError> {
    state.try_get_slice::<Providers>().map_err(|e| ProviderError::Internal {
        message: e.to_string().into(),
        context: Some("Providers slice not registered".into()),
    })
}

fn identity(state: &ApiState) -> Result<&Identity, ProviderError> {
    state.try_get_slice::<Identity>().map_err(|e| ProviderError::Internal {
        message: e.to_string().into(),
        context: Some("Identity slice not registered".into()),
    })
}

#[utoipa::path(
    post,
    path = "/v1/providers/apply",
    request_body = ProviderApplicationRequest,
    responses(
        (status = OK, description = "Request forwarded to the administrators"),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request"),
    ),
    tag = PROVIDERS_TAG,
)]
async fn apply(
    State(state): State<ApiState>,
    Json(payload): Json<ProviderApplicationRequest>,
) -> Result<(), ProviderError> {
    validate::application(&payload)?;

    if state.config.mail.admin_emails.is_empty() {
        warn!("Provider application received but no admin emails are configured");
        return Err(ProviderError::Internal {
            message: "no administrator addresses configured".into(),
            context: None,
        });
    }

    let body = format!(
        "New opportunity provider application\n\n\
         Email: {}\nOrganization: {}\nRepresentative: {}\nPhone: {}\n\n{}",
        payload.email,
        payload.organization_name.as_deref().unwrap_or("N/D"),
        payload.representative_name.as_deref().unwrap_or("N/D"),
        payload.phone.as_deref().unwrap_or("N/D"),
        payload.information,
    );

    for admin in &state.config.mail.admin_emails {
        state
            .events
            .publish(OutboundEmail::new(
                admin.clone(),
                "Atelier | Provider application",
                body.clone(),
            ))
            .map_err(|e| ProviderError::Internal {
                message: e.to_string().into(),
                context: Some("Queueing admin notification".into()),
            })?;
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/providers/register/{invite_id}",
    request_body = ProviderRegistration,
    responses(
        (status = OK, description = "Provider account created"),
        (status = NOT_FOUND, description = "Unknown invitation"),
        (status = FORBIDDEN, description = "Invitation does not carry the provider role"),
    ),
    tag = PROVIDERS_TAG,
)]
async fn register_by_invite(
    State(state): State<ApiState>,
    session: Option<Session>,
    Path(invite_id): Path<String>,
    Json(payload): Json<ProviderRegistration>,
) -> Result<(), ProviderError> {
    if session.is_some() {
        return Err(ProviderError::Forbidden {
            message: "already signed in".into(),
            context: None,
        });
    }

    let providers = providers(&state)?;
    let identity = identity(&state)?;
    let invite_id = RecordGuard::verify(&invite_id, "user_invite")
        .map_err(|e| ProviderError::Validation { message: e.to_string().into(), context: None })?;

    atelier_identity::validate_username(&payload.account.username).map_err(ProviderError::from)?;
    atelier_identity::validate_password(&payload.account.password).map_err(ProviderError::from)?;
    validate::profile(&payload.professional)?;

    let invite = identity.users().find_user_invite(&invite_id).await?.ok_or_else(|| {
        warn!(invite_id, "Provider registration against unknown invitation");
        ProviderError::NotFound { message: "invitation not found".into(), context: None }
    })?;

    if !invite.role_set().contains(RoleSet::PROVIDER) {
        return Err(ProviderError::Forbidden {
            message: "invitation does not grant the provider role".into(),
            context: None,
        });
    }

    let user = identity
        .users()
        .create(CreateUser {
            username: payload.account.username.clone(),
            password: Some(payload.account.password.clone()),
            email: Some(invite.email.clone()),
            oauth_external_id: None,
            roles: invite.role_set(),
            landing_url: Some("/".to_owned()),
        })
        .await?;

    let provider_id = providers.store().create(&user.id, &payload.professional).await?;
    identity.users().delete_user_invite(&invite_id).await?;

    info!(provider = provider_id, "Provider registered");
    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/providers/me",
    responses((status = OK, description = "Own organization profile", body = ProviderProfileResponse)),
    tag = PROVIDERS_TAG,
)]
async fn my_profile(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<ProviderProfileResponse>, ProviderError> {
    let provider_id = session.provider_id().map_err(ProviderError::from)?;

    let provider = providers(&state)?.store().find_by_id(provider_id).await?.ok_or(
        ProviderError::NotFound { message: "provider not found".into(), context: None },
    )?;

    Ok(Json(provider.into()))
}

#[utoipa::path(
    put,
    path = "/v1/providers/me",
    request_body = ProviderProfilePayload,
    responses((status = OK, description = "Profile updated")),
    tag = PROVIDERS_TAG,
)]
async fn update_my_profile(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<ProviderProfilePayload>,
) -> Result<(), ProviderError> {
    let provider_id = session.provider_id().map_err(ProviderError::from)?;
    validate::profile(&payload)?;
    providers(&state)?.store().update(provider_id, &payload).await
}

#[utoipa::path(
    get,
    path = "/v1/providers/me/blocked-artists",
    responses((status = OK, description = "Artists blocked by this provider", body = BlockedArtistsResponse)),
    tag = PROVIDERS_TAG,
)]
async fn blocked_artists(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<BlockedArtistsResponse>, ProviderError> {
    let provider_id = session.provider_id().map_err(ProviderError::from)?;
    let artists = providers(&state)?.store().blocked_artists(provider_id).await?;
    Ok(Json(BlockedArtistsResponse { artists }))
}

#[utoipa::path(
    post,
    path = "/v1/providers/me/blocked-artists/{artist_id}/unblock",
    responses((status = OK, description = "Artist removed from the block list")),
    tag = PROVIDERS_TAG,
)]
async fn unblock_artist(
    State(state): State<ApiState>,
    session: Session,
    Path(artist_id): Path<String>,
) -> Result<(), ProviderError> {
    let provider_id = session.provider_id().map_err(ProviderError::from)?;
    providers(&state)?.store().unblock_artist(provider_id, &artist_id).await
}
