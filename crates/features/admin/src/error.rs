use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::borrow::Cow;
use tracing::error;

/// A specialized [`AdminError`] enum of this crate.
#[atelier_derive::app_error]
pub enum AdminError {
    #[error("Validation error{}: {message}", fmt_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

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

    #[error("Internal admin error{}: {message}", fmt_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation { message, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.to_string())
            },
            Self::Forbidden { message, .. } => (StatusCode::FORBIDDEN, message.to_string()),
            Self::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.to_string()),
            Self::Conflict { message, .. } => (StatusCode::CONFLICT, message.to_string()),
            Self::Identity { source, .. } => {
                use atelier_identity::IdentityError as E;
                match source {
                    E::Conflict { message, .. } => (StatusCode::CONFLICT, message.to_string()),
                    E::Validation { message, .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, message.to_string())
                    },
                    E::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.to_string()),
                    _ => {
                        error!(error = %source, "Identity call failed inside admin flow");
                        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
                    },
                }
            },
            Self::Query { .. } | Self::Database { .. } | Self::Internal { .. } => {
                error!(error = %self, "Admin request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
