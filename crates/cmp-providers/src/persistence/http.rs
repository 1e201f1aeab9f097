//! HTTP Consent Persistence
//!
//! Client for the persistence service:
//!
//! - `GET  {base}/consent/{siteId}?visitorId=..` answers `{status, data: {consent | null}}`
//! - `POST {base}/consent/{siteId}` with the submission payload answers
//!   `{status, data: {consent}}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use cmp_domain::error::{Error, Result};
use cmp_domain::ports::ConsentPersistence;
use cmp_domain::value_objects::{ConsentDecision, SiteId, SubmissionPayload, VisitorId};

use crate::constants::{
    CONSENT_PATH, CONTENT_TYPE_JSON, ERROR_MSG_REQUEST_TIMEOUT, VISITOR_QUERY_PARAM,
};
use crate::utils::HttpResponseUtils;

/// Persistence service client over HTTP
///
/// Receives the HTTP client via constructor injection.
pub struct HttpConsentPersistence {
    base_url: Url,
    timeout: Duration,
    http_client: Client,
}

impl HttpConsentPersistence {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str, timeout: Duration, http_client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::configuration_with_source("Invalid persistence URL", e))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "Persistence URL cannot be a base: {base_url}"
            )));
        }
        Ok(Self {
            base_url,
            timeout,
            http_client,
        })
    }

    /// Service base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/consent/{site}`
    pub fn consent_url(&self, site: &SiteId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(CONSENT_PATH).push(site.as_str());
        }
        url
    }

    fn request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::network(format!("{ERROR_MSG_REQUEST_TIMEOUT} {:?}", self.timeout))
        } else {
            Error::network_with_source("HTTP request failed", e)
        }
    }
}

/// Extract `data.consent` from a parsed envelope body
fn consent_from_data(data: Option<Value>) -> Result<Option<ConsentDecision>> {
    let data = data.ok_or_else(|| Error::malformed_response("missing data"))?;
    match data.get("consent") {
        None => Err(Error::malformed_response("missing data.consent")),
        Some(Value::Null) => Ok(None),
        Some(consent) => serde_json::from_value(consent.clone())
            .map(Some)
            .map_err(|e| Error::malformed_response(format!("invalid consent record: {e}"))),
    }
}

#[async_trait]
impl ConsentPersistence for HttpConsentPersistence {
    async fn fetch_existing(
        &self,
        site: &SiteId,
        visitor: &VisitorId,
    ) -> Result<Option<ConsentDecision>> {
        let mut url = self.consent_url(site);
        url.query_pairs_mut()
            .append_pair(VISITOR_QUERY_PARAM, visitor.as_str());
        debug!(%url, "Fetching existing decision");

        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let envelope = HttpResponseUtils::check_and_parse::<Value>(response, 0).await?;
        consent_from_data(envelope.data)
    }

    async fn store(&self, site: &SiteId, payload: &SubmissionPayload) -> Result<ConsentDecision> {
        let body = serde_json::to_vec(payload)?;
        let size = body.len();
        let url = self.consent_url(site);
        debug!(%url, size, "Submitting decision");

        let response = self
            .http_client
            .post(url)
            .header("Content-Type", CONTENT_TYPE_JSON)
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let envelope = HttpResponseUtils::check_and_parse::<Value>(response, size).await?;
        consent_from_data(envelope.data)?
            .ok_or_else(|| Error::malformed_response("service stored no decision"))
    }
}

// ============================================================================
// Tests
// ============================================================================
