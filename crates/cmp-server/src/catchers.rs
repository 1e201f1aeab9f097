//! JSON error catchers
//!
//! Rocket's own failures (unknown route, unparsable body, body over the
//! size limit) get the same error envelope as handler errors.

use cmp_providers::utils::ApiEnvelope;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Catcher, Request, catch, catchers};

/// Renders every unhandled status as an error envelope
#[catch(default)]
pub fn json_error(
    status: Status,
    _request: &Request<'_>,
) -> status::Custom<Json<ApiEnvelope<()>>> {
    let message = match status.code {
        400 | 422 => "Malformed request body",
        404 => "Resource not found",
        413 => "Payload too large",
        _ => status.reason().unwrap_or("Request failed"),
    };
    status::Custom(status, Json(ApiEnvelope::error(message)))
}

/// Catchers to register on `/`
pub fn json_catchers() -> Vec<Catcher> {
    catchers![json_error]
}
