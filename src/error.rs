use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// RepoError
///
/// Failures raised by the persistence collaborator. Every variant is recoverable:
/// the caller may simply retry the same action.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("no row with id {0}")]
    NotFound(Uuid),

    #[error("unknown column `{column}` on table `{table}`")]
    UnknownColumn { table: &'static str, column: String },

    #[error("malformed row: {0}")]
    Malformed(String),

    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// AdminError
///
/// The error taxonomy of the admin back-office. Validation failures are caught
/// before any network call; persistence failures carry the collaborator's message
/// so it can be shown to the user verbatim.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Persistence(#[from] RepoError),

    #[error("not signed in")]
    Unauthenticated { redirect: String },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("a save is already in progress")]
    SaveInProgress,

    #[error("deleting a {0} requires confirmation")]
    ConfirmationRequired(&'static str),

    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: &'static str,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("auth provider error: {0}")]
    AuthProvider(String),
}

impl AdminError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AdminError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AdminError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Persistence(RepoError::NotFound(_)) => StatusCode::NOT_FOUND,
            AdminError::Persistence(RepoError::UnknownColumn { .. }) => StatusCode::BAD_REQUEST,
            AdminError::Persistence(_) => StatusCode::BAD_GATEWAY,
            AdminError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            AdminError::Forbidden(_) => StatusCode::FORBIDDEN,
            AdminError::SaveInProgress => StatusCode::CONFLICT,
            AdminError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            AdminError::Unsupported { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::AuthProvider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// ErrorBody
///
/// JSON shape returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
            field: match &self {
                AdminError::Validation { field, .. } => Some(field.clone()),
                _ => None,
            },
            redirect: match &self {
                AdminError::Unauthenticated { redirect } => Some(redirect.clone()),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type AdminResult<T> = Result<T, AdminError>;
