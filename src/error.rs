use log::error;
use rocket::http::Status;
use rocket::request::Outcome;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde_json::json;
use thiserror::Error;

use crate::content::ContentError;
use crate::uploads::UploadError;

/// Error returned by every JSON route. Rendered as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Not authenticated")]
    Unauthorized,
    /// Logged server-side; the client only sees a generic message.
    #[error("{0}")]
    Internal(String),
}

/// Detail left by a failed request guard, rendered by the default catcher.
pub struct GuardDetail(pub Option<String>);

impl ApiError {
    /// Fail a request guard with this error. The catcher renders its detail.
    pub fn fail_guard<S>(self, req: &Request<'_>) -> Outcome<S, ApiError> {
        let detail = self.detail();
        req.local_cache(|| GuardDetail(Some(detail)));
        Outcome::Error((self.status(), self))
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::PayloadTooLarge(_) => Status::PayloadTooLarge,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Unauthorized => Status::Unauthorized,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Storage(msg) => ApiError::Internal(msg),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::TooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            UploadError::Io(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("{} {}: {}", req.method(), req.uri(), self);
        }
        (status, Json(json!({ "detail": self.detail() }))).respond_to(req)
    }
}
