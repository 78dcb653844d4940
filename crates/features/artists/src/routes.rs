use crate::error::ArtistError;
use crate::models::{
    ArtistProfileResponse, ArtistProfileUpdate, ArtistRegistration, ArtistSearchFilter,
    ArtistSearchResponse, ModerationStateResponse, RegisteredResponse, profile_completeness,
};
use crate::store::Viewer;
use crate::{Artists, validate};
use atelier_domain::constants::ARTISTS_TAG;
use atelier_domain::roles::RoleSet;
use atelier_identity::{CreateUser, Identity, Session};
use atelier_kernel::security::RecordGuard;
use atelier_kernel::server::ApiState;
use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(register_by_invite))
        .routes(routes!(search))
        .routes(routes!(my_profile))
        .routes(routes!(update_my_profile))
        .routes(routes!(submit_for_moderation))
        .routes(routes!(my_moderation_state))
        .routes(routes!(public_profile))
}

fn artists(state: &ApiState) -> Result<&Artists, ArtistError> {
    state.try_get_slice::<Artists>().map_err(|e| ArtistError::Internal {
        message: e.to_string().into(),
        context: Some("Artists slice not registered".into()),
    })
}

fn identity(state: &ApiState) -> Result<&Identity, ArtistError> {
    state.try_get_slice::<Identity>().map_err(|e| ArtistError::Internal {
        message: e.to_string().into(),
        context: Some("Identity slice not registered".into()),
    })
}

#[utoipa::path(
    post,
    path = "/v1/artists/register/{invite_id}",
    request_body = ArtistRegistration,
    responses(
        (status = OK, description = "Artist account created", body = RegisteredResponse),
        (status = NOT_FOUND, description = "Unknown invitation"),
        (status = CONFLICT, description = "Username or email already taken"),
    ),
    tag = ARTISTS_TAG,
)]
async fn register_by_invite(
    State(state): State<ApiState>,
    session: Option<Session>,
    Path(invite_id): Path<String>,
    Json(payload): Json<ArtistRegistration>,
) -> Result<Json<RegisteredResponse>, ArtistError> {
    if session.is_some() {
        return Err(ArtistError::Forbidden {
            message: "already signed in".into(),
            context: None,
        });
    }

    let artists = artists(&state)?;
    let identity = identity(&state)?;
    let invite_id = RecordGuard::verify(&invite_id, "artist_invite")
        .map_err(|e| ArtistError::Validation { message: e.to_string().into(), context: None })?;

    let invite =
        artists.store().find_artist_invite(&invite_id).await?.ok_or_else(|| {
            warn!(invite_id, "Artist registration against unknown invitation");
            ArtistError::NotFound { message: "invitation not found".into(), context: None }
        })?;

    atelier_identity::validate_username(&payload.account.username)
        .map_err(ArtistError::from)?;
    match (&payload.account.password, &invite.oauth_external_id) {
        (Some(password), None) => {
            atelier_identity::validate_password(password).map_err(ArtistError::from)?;
        },
        (None, Some(_)) => {}, // OAuth-linked invite: the provider owns the credential
        (Some(_), Some(_)) => {
            return Err(ArtistError::Validation {
                message: "password: not accepted for OAuth registrations".into(),
                context: None,
            });
        },
        (None, None) => {
            return Err(ArtistError::Validation {
                message: "password: required".into(),
                context: None,
            });
        },
    }
    validate::personal(&payload.personal)?;
    validate::professional(&payload.professional)?;
    validate::profile(&payload.profile)?;

    let pending = artists.store().pending_opportunity_invites(&invite.id).await?;
    let invited_by_provider = !pending.is_empty();
    let landing_url = if invited_by_provider {
        state.config.links.artist_invites_page()
    } else {
        "/".to_owned()
    };

    let user = identity
        .users()
        .create(CreateUser {
            username: payload.account.username.clone(),
            password: payload.account.password.clone(),
            email: Some(invite.email.clone()),
            oauth_external_id: invite.oauth_external_id.clone(),
            roles: RoleSet::ARTIST,
            landing_url: Some(landing_url.clone()),
        })
        .await?;

    let artist_id = artists
        .store()
        .create(&user.id, &payload.personal, &payload.professional, &payload.profile)
        .await?;

    artists.store().consume_artist_invite(&invite.id, &artist_id, &pending).await?;

    info!(artist = artist_id, invited_by_provider, "Artist registered");
    Ok(Json(RegisteredResponse { artist_id, landing_url }))
}

#[utoipa::path(
    get,
    path = "/v1/artists",
    params(ArtistSearchFilter),
    responses((status = OK, description = "Filtered, relevance-ordered artists", body = ArtistSearchResponse)),
    tag = ARTISTS_TAG,
)]
async fn search(
    State(state): State<ApiState>,
    session: Option<Session>,
    Query(filter): Query<ArtistSearchFilter>,
) -> Result<Json<ArtistSearchResponse>, ArtistError> {
    let viewer = session.as_ref().map_or(Viewer::Public, |s| {
        if s.roles.contains(RoleSet::ADMINISTRATOR) {
            Viewer::Admin
        } else if s.provider_id.is_some() {
            Viewer::Provider
        } else {
            Viewer::Public
        }
    });

    let (pages_total, hits) = artists(&state)?.store().search(&filter, viewer).await?;
    Ok(Json(ArtistSearchResponse { pages_total, artists: hits }))
}

#[utoipa::path(
    get,
    path = "/v1/artists/me",
    responses((status = OK, description = "Own profile with aggregates", body = ArtistProfileResponse)),
    tag = ARTISTS_TAG,
)]
async fn my_profile(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<ArtistProfileResponse>, ArtistError> {
    let artists = artists(&state)?;
    let artist_id = session.artist_id().map_err(ArtistError::from)?;

    let artist = artists.store().find_by_id(artist_id).await?.ok_or(ArtistError::NotFound {
        message: "artist not found".into(),
        context: None,
    })?;

    let project_count = artists.store().project_count(artist_id).await?;
    let open_application_count = artists.store().open_application_count(artist_id).await?;

    Ok(Json(ArtistProfileResponse {
        id: artist.id.clone(),
        artist_name: artist.artist_name.clone(),
        first_name: artist.first_name.clone(),
        last_name: artist.last_name.clone(),
        bio: artist.bio.clone(),
        statement: artist.statement.clone(),
        languages: artist.languages.clone(),
        industries: artist.industries.clone(),
        themes: artist.themes.clone(),
        title: artist.title.clone(),
        links: artist.links.clone(),
        profile_complete: profile_completeness(&artist),
        project_count,
        open_application_count,
        moderation: Some(artist.moderation.clone()),
        moderation_comment: Some(artist.moderation_comment),
        admin_mark: None,
    }))
}

#[utoipa::path(
    put,
    path = "/v1/artists/me",
    request_body = ArtistProfileUpdate,
    responses((status = OK, description = "Profile updated; moderation reset to draft")),
    tag = ARTISTS_TAG,
)]
async fn update_my_profile(
    State(state): State<ApiState>,
    session: Session,
    Json(payload): Json<ArtistProfileUpdate>,
) -> Result<(), ArtistError> {
    let artist_id = session.artist_id().map_err(ArtistError::from)?;

    validate::personal(&payload.personal)?;
    validate::professional(&payload.professional)?;
    validate::profile(&payload.profile)?;

    artists(&state)?.store().update_profile(artist_id, &payload).await
}

#[utoipa::path(
    post,
    path = "/v1/artists/me/moderation",
    responses(
        (status = OK, description = "Profile queued for review"),
        (status = CONFLICT, description = "Profile not in a submittable state"),
    ),
    tag = ARTISTS_TAG,
)]
async fn submit_for_moderation(
    State(state): State<ApiState>,
    session: Session,
) -> Result<(), ArtistError> {
    let artist_id = session.artist_id().map_err(ArtistError::from)?;
    artists(&state)?.store().submit_for_moderation(artist_id).await
}

#[utoipa::path(
    get,
    path = "/v1/artists/me/moderation",
    responses((status = OK, description = "Current moderation state", body = ModerationStateResponse)),
    tag = ARTISTS_TAG,
)]
async fn my_moderation_state(
    State(state): State<ApiState>,
    session: Session,
) -> Result<Json<ModerationStateResponse>, ArtistError> {
    let artist_id = session.artist_id().map_err(ArtistError::from)?;

    let artist = artists(&state)?.store().find_by_id(artist_id).await?.ok_or(
        ArtistError::NotFound { message: "artist not found".into(), context: None },
    )?;

    Ok(Json(ModerationStateResponse {
        moderation: artist.moderation,
        moderation_comment: artist.moderation_comment,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/artists/{artist_id}",
    responses(
        (status = OK, description = "Public artist profile", body = ArtistProfileResponse),
        (status = NOT_FOUND, description = "Unknown, unapproved, or locked artist"),
    ),
    tag = ARTISTS_TAG,
)]
async fn public_profile(
    State(state): State<ApiState>,
    session: Option<Session>,
    Path(artist_id): Path<String>,
) -> Result<Json<ArtistProfileResponse>, ArtistError> {
    let artists = artists(&state)?;
    let identity = identity(&state)?;
    let is_admin =
        session.as_ref().is_some_and(|s| s.roles.contains(RoleSet::ADMINISTRATOR));

    let artist = artists.store().find_by_id(&artist_id).await?.ok_or(ArtistError::NotFound {
        message: "artist not found".into(),
        context: None,
    })?;

    if !is_admin {
        let user = identity.users().find_by_id(&artist.user).await?;
        let visible = artist.moderation
            == atelier_domain::status::ModerationStatus::Approved.to_string()
            && user.as_ref().is_some_and(|u| !u.locked);
        if !visible {
            return Err(ArtistError::NotFound {
                message: "artist not found".into(),
                context: None,
            });
        }
    }

    let project_count = artists.store().project_count(&artist.id).await?;
    let open_application_count = artists.store().open_application_count(&artist.id).await?;

    Ok(Json(ArtistProfileResponse {
        id: artist.id.clone(),
        artist_name: artist.artist_name.clone(),
        first_name: artist.first_name.clone(),
        last_name: artist.last_name.clone(),
        bio: artist.bio.clone(),
        statement: artist.statement.clone(),
        languages: artist.languages.clone(),
        industries: artist.industries.clone(),
        themes: artist.themes.clone(),
        title: artist.title.clone(),
        links: artist.links.clone(),
        profile_complete: profile_completeness(&artist),
        project_count,
        open_application_count,
        moderation: is_admin.then(|| artist.moderation.clone()),
        moderation_comment: is_admin.then(|| artist.moderation_comment.clone()),
        admin_mark: is_admin.then(|| artist.admin_mark.clone()),
    }))
}
