use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::borrow::Cow;
use tracing::error;

/// A specialized [`IdentityError`] enum of this crate.
#[atelier_derive::app_error]
pub enum IdentityError {
    /// Malformed or rule-breaking input.
    #[error("Validation error{}: {message}", fmt_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Missing or unusable credentials/token.
    #[error("Unauthorized{}: {message}", fmt_context(context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The caller is authenticated but not allowed to do this.
    #[error("Forbidden{}: {message}", fmt_context(context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The referenced record does not exist (or is not visible).
    #[error("Not found{}: {message}", fmt_context(context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Uniqueness and cooldown conflicts.
    #[error("Conflict{}: {message}", fmt_context(context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Raw statement failures.
    #[error("Query error{}: {source}", fmt_context(context))]
    Query {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Composed-query and connection failures.
    #[error("Database error{}: {source}", fmt_context(context))]
    Database {
        #[source]
        source: atelier_database::DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal identity error{}: {message}", fmt_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation { message, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.to_string())
            },
            Self::Unauthorized { message, .. } => (StatusCode::UNAUTHORIZED, message.to_string()),
            Self::Forbidden { message, .. } => (StatusCode::FORBIDDEN, message.to_string()),
            Self::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.to_string()),
            Self::Conflict { message, .. } => (StatusCode::CONFLICT, message.to_string()),
            Self::Query { .. } | Self::Database { .. } | Self::Internal { .. } => {
                error!(error = %self, "Identity request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
