use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::{ParseRepoKeyError, PolicyError};
use crate::repositories::RepositoryError;
use github_rest::GithubError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                Self::internal("Unexpected error, try again later")
            }
            RepositoryError::NotFound(_) => Self::not_found(err.to_string()),
            RepositoryError::Duplicate(_) => Self::conflict(err.to_string()),
            RepositoryError::UnknownLabel(_) | RepositoryError::WrongLabelKind { .. } => {
                Self::bad_request(err.to_string())
            }
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        Self::forbidden(err.to_string())
    }
}

impl From<ParseRepoKeyError> for ApiError {
    fn from(err: ParseRepoKeyError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<GithubError> for ApiError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::NotFound => Self::not_found("Repository not found at provider"),
            GithubError::RateLimited => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Provider rate limit exceeded, try again later",
            ),
            GithubError::Unauthorized => Self::bad_gateway("Provider rejected our credentials"),
            GithubError::Response(ref e) | GithubError::Parsing(ref e) => {
                tracing::error!("Provider request failed: {}", e);
                Self::bad_gateway("Provider request failed")
            }
        }
    }
}
