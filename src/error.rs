//! Transport-boundary error type.
//!
//! Every handler returns `Result<_, ApiError>`; storage and auth failures are
//! converted into one of these kinds exactly once and rendered as
//! `{"error": {"code", "message"}}`.

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::db::StoreError;

const UNAUTHORIZED_MESSAGE: &str = "Invalid authentication credentials";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Password must be at least 8 characters long")]
    WeakPassword,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("token carries neither subject nor email")]
    MalformedPayload,

    #[error("user referenced by token not found")]
    UserNotFound,

    #[error("account is inactive")]
    AccountInactive,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::WeakPassword => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::InvalidToken
            | ApiError::MalformedPayload
            | ApiError::UserNotFound
            | ApiError::AccountInactive => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Token failures collapse into one text so
    /// callers cannot tell which check rejected them.
    fn public_message(&self) -> String {
        match self {
            ApiError::InvalidToken
            | ApiError::MalformedPayload
            | ApiError::UserNotFound
            | ApiError::AccountInactive => UNAUTHORIZED_MESSAGE.to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(anyhow::Error::new(e))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        ApiError::Validation(r.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(r: FormRejection) -> Self {
        ApiError::Validation(r.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        ApiError::Validation(r.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        ApiError::Validation(r.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(e) = &self {
            tracing::error!(error = ?e, "request failed");
        }
        let body = Json(serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.public_message(),
            }
        }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
