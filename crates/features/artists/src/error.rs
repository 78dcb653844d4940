use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::borrow::Cow;
use tracing::error;

/// A specialized [`ArtistError`] enum of this crate.
#[atelier_derive::app_error]
pub enum ArtistError {
    #[error("Validation error{}: {message}", fmt_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unauthorized{}: {message}", fmt_context(context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Forbidden{}: {message}", fmt_context(context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", fmt_context(context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Conflict{}: {message}", fmt_context(context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Query error{}: {source}", fmt_context(context))]
    Query {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Database error{}: {source}", fmt_context(context))]
    Database {
        #[source]
        source: atelier_database::DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Identity error{}: {source}", fmt_context(context))]
    Identity {
        #[source]
        source: atelier_identity::IdentityError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal artist error{}: {message}", fmt_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IntoResponse for ArtistError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation { message, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.to_string())
            },
            Self::Unauthorized { message, .. } => (StatusCode::UNAUTHORIZED, message.to_string()),
            Self::Forbidden { message, .. } => (StatusCode::FORBIDDEN, message.to_string()),
            Self::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.to_string()),
            Self::Conflict { message, .. } => (StatusCode::CONFLICT, message.to_string()),
            Self::Identity { source, .. } => return source_response(source),
            Self::Query { .. } | Self::Database { .. } | Self::Internal { .. } => {
                error!(error = %self, "Artist request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn source_response(source: &atelier_identity::IdentityError) -> Response {
    // Identity failures keep their own status mapping.
    use atelier_identity::IdentityError as E;
    let (status, message) = match source {
        E::Validation { message, .. } => (StatusCode::UNPROCESSABLE_ENTITY, message.to_string()),
        E::Unauthorized { message, .. } => (StatusCode::UNAUTHORIZED, message.to_string()),
        E::Forbidden { message, .. } => (StatusCode::FORBIDDEN, message.to_string()),
        E::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.to_string()),
        E::Conflict { message, .. } => (StatusCode::CONFLICT, message.to_string()),
        _ => {
            error!(error = %source, "Identity call failed inside artist flow");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
        },
    };
    (status, Json(json!({ "error": message }))).into_response()
}
