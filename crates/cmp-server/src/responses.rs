//! Response types
//!
//! Success bodies reuse the envelope the persistence client parses, so both
//! sides agree on the wire shape by construction.

use cmp_domain::error::Error;
use cmp_domain::value_objects::ConsentDecision;
use cmp_providers::utils::ApiEnvelope;
use rocket::Request;
use rocket::http::Status;
use rocket::response::{self, Responder, status};
use rocket::serde::json::Json;
use serde::Serialize;
use tracing::warn;

/// `data` of the consent endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentData {
    /// Stored decision, `null` when there is none
    pub consent: Option<ConsentDecision>,
}

/// `data` of the health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    /// Always `healthy` when the service answers
    pub status: String,
    /// Number of stored decisions
    pub stored_decisions: usize,
    /// Seconds since the service started
    pub uptime_seconds: u64,
    /// Service version
    pub version: String,
}

/// JSON success response
pub type ApiResult<T> = Result<Json<ApiEnvelope<T>>, ApiError>;

/// Error rendered as `{ status: "error", message }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status
    pub status: Status,
    /// Description for the caller
    pub message: String,
}

impl ApiError {
    /// `400 Bad Request`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: Status::BadRequest,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = match &error {
            Error::InvalidArgument { .. } => Status::BadRequest,
            Error::NotFound { .. } => Status::NotFound,
            Error::PayloadTooLarge { .. } => Status::PayloadTooLarge,
            Error::StorageUnavailable { .. } => Status::ServiceUnavailable,
            _ => Status::InternalServerError,
        };
        if status.code >= 500 {
            warn!(error = %error, "Request failed");
        }
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        status::Custom(self.status, Json(ApiEnvelope::<()>::error(self.message)))
            .respond_to(request)
    }
}
