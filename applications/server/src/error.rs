/// Server error types
use crate::api::envelope::Envelope;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_core::RosterError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Domain(#[from] RosterError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<roster_storage::StorageError> for ServerError {
    fn from(err: roster_storage::StorageError) -> Self {
        // Convert StorageError -> RosterError -> ServerError
        ServerError::Domain(err.into())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Domain(err) => match err {
                RosterError::Validation(_)
                | RosterError::InvalidField(_)
                | RosterError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
                RosterError::DuplicateEmail(_) => StatusCode::CONFLICT,
                RosterError::NotFound(_) => StatusCode::NOT_FOUND,
                RosterError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = match self {
            ServerError::Domain(RosterError::Validation(errors)) => {
                Envelope::failure("Validation failed").with_errors(errors)
            }
            ServerError::Domain(RosterError::DuplicateEmail(_)) => {
                Envelope::failure("Email already exists.")
            }
            ServerError::Domain(RosterError::NotFound(_)) => Envelope::failure("User not found"),
            ServerError::Domain(err @ (RosterError::InvalidField(_) | RosterError::InvalidFilter(_))) => {
                Envelope::failure(err.to_string())
            }
            ServerError::Domain(RosterError::Storage(ref msg)) => {
                tracing::error!("Storage error: {}", msg);
                Envelope::failure("Internal server error")
            }
            ServerError::BadRequest(msg) => Envelope::failure(msg),
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                Envelope::failure("Configuration error")
            }
        };

        (status, Json(envelope)).into_response()
    }
}
