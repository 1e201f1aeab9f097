//! HTTP Response Utilities
//!
//! Helpers for reading persistence-service responses. The service wraps
//! every body as `{ "status": .., "data": .. }`.

use cmp_domain::error::{Error, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::{ENVELOPE_ERROR, ENVELOPE_SUCCESS};

/// `{ status, data }` wrapper used by the persistence service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// `success` or `error`
    pub status: String,
    /// Response body
    pub data: Option<T>,
    /// Error description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Successful response carrying `data`
    pub fn success(data: T) -> Self {
        Self {
            status: ENVELOPE_SUCCESS.to_string(),
            data: Some(data),
            message: None,
        }
    }

    /// Error response with a description
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ENVELOPE_ERROR.to_string(),
            data: None,
            message: Some(message.into()),
        }
    }

    /// Whether the service reported success
    pub fn is_success(&self) -> bool {
        self.status == ENVELOPE_SUCCESS
    }
}

/// Utilities for processing HTTP responses
pub struct HttpResponseUtils;

impl HttpResponseUtils {
    /// Check the status code and parse the `{ status, data }` envelope
    ///
    /// `413` becomes [`Error::PayloadTooLarge`] so the caller can retry with a
    /// smaller body. A body that is not the expected shape becomes
    /// [`Error::MalformedResponse`].
    pub async fn check_and_parse<T: DeserializeOwned>(
        response: Response,
        request_size: usize,
    ) -> Result<ApiEnvelope<T>> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::status_error(status, request_size, &error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network_with_source("Failed to read response body", e))?;
        Self::parse_envelope(&body)
    }

    /// Parse an envelope from a raw body
    pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<ApiEnvelope<T>> {
        let envelope: ApiEnvelope<T> = serde_json::from_str(body)
            .map_err(|e| Error::malformed_response(format!("unexpected body: {e}")))?;
        if !envelope.is_success() {
            return Err(Error::malformed_response(format!(
                "service reported status '{}': {}",
                envelope.status,
                envelope.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(envelope)
    }

    fn status_error(status: StatusCode, request_size: usize, details: &str) -> Error {
        let code = status.as_u16();
        match code {
            413 => Error::PayloadTooLarge { size: request_size },
            500..=599 => Error::network(format!("server error ({code}): {details}")),
            _ => Error::network(format!("request failed ({code}): {details}")),
        }
    }
}
