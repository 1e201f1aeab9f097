//! Route handlers

use cmp_domain::value_objects::{SiteId, SubmissionPayload, VisitorId};
use cmp_providers::utils::ApiEnvelope;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{FromForm, State, get, options, post};
use tracing::debug;

use crate::constants::{ERROR_MISSING_VISITOR, HEALTH_STATUS_HEALTHY};
use crate::responses::{ApiError, ApiResult, ConsentData, HealthData};
use crate::server::ServerState;

/// Query of the existing-decision lookup
#[derive(Debug, FromForm)]
pub struct VisitorQuery {
    /// Visitor to look up
    #[field(name = "visitorId")]
    pub visitor_id: Option<String>,
}

/// `GET /consent/<site_id>?visitorId=..`
#[get("/consent/<site_id>?<query..>")]
pub async fn get_consent(
    state: &State<ServerState>,
    site_id: String,
    query: VisitorQuery,
) -> ApiResult<ConsentData> {
    let visitor = query
        .visitor_id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(ERROR_MISSING_VISITOR))?;

    let consent = state
        .service
        .lookup(&SiteId::new(site_id), &VisitorId::new(visitor))
        .await?;
    debug!(found = consent.is_some(), "Existing decision lookup");
    Ok(Json(ApiEnvelope::success(ConsentData { consent })))
}

/// `POST /consent/<site_id>`
#[post("/consent/<site_id>", format = "json", data = "<payload>")]
pub async fn post_consent(
    state: &State<ServerState>,
    site_id: String,
    payload: Json<SubmissionPayload>,
) -> ApiResult<ConsentData> {
    let decision = state
        .service
        .record(&SiteId::new(site_id), payload.into_inner())
        .await?;
    Ok(Json(ApiEnvelope::success(ConsentData {
        consent: Some(decision),
    })))
}

/// CORS preflight for the consent endpoints
#[options("/consent/<_>")]
pub fn preflight_consent() -> Status {
    Status::NoContent
}

/// `GET /health`
#[get("/health")]
pub async fn health(state: &State<ServerState>) -> ApiResult<HealthData> {
    let stored_decisions = state.service.stored_decisions().await?;
    Ok(Json(ApiEnvelope::success(HealthData {
        status: HEALTH_STATUS_HEALTHY.to_string(),
        stored_decisions,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })))
}
