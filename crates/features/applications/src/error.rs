use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::borrow::Cow;
use tracing::error;

/// A specialized [`ApplicationError`] enum of this crate.
#[atelier_derive::app_error]
pub enum ApplicationError {
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

    #[error("Media error{}: {source}", fmt_context(context))]
    Media {
        #[source]
        source: atelier_media::MediaError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal application error{}: {message}", fmt_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<atelier_identity::IdentityError> for ApplicationError {
    fn from(err: atelier_identity::IdentityError) -> Self {
        Self::Forbidden { message: err.to_string().into(), context: None }
    }
}

impl From<atelier_opportunities::OpportunityError> for ApplicationError {
    fn from(err: atelier_opportunities::OpportunityError) -> Self {
        Self::Internal { message: err.to_string().into(), context: Some("Opportunity lookup".into()) }
    }
}

impl From<atelier_providers::ProviderError> for ApplicationError {
    fn from(err: atelier_providers::ProviderError) -> Self {
        Self::Internal { message: err.to_string().into(), context: Some("Provider lookup".into()) }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation { message, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.to_string())
            },
            Self::Forbidden { message, .. } => (StatusCode::FORBIDDEN, message.to_string()),
            Self::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.to_string()),
            Self::Conflict { message, .. } => (StatusCode::CONFLICT, message.to_string()),
            Self::Query { .. } | Self::Database { .. } | Self::Media { .. } | Self::Internal { .. } => {
                error!(error = %self, "Application request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
