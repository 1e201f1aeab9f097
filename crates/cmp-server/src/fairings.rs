//! Response fairings

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};
use tracing::debug;

use crate::constants::{CORS_ALLOWED_HEADERS, CORS_ALLOWED_METHODS};

/// CORS Fairing for Rocket
///
/// The engine calls the service from arbitrary publisher pages, so every
/// response carries the configured allowed origin.
pub struct Cors {
    allowed_origin: String,
}

impl Cors {
    /// Allow the given origin (`*` for any)
    pub fn new(allowed_origin: impl Into<String>) -> Self {
        Self {
            allowed_origin: allowed_origin.into(),
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS Headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new(
            "Access-Control-Allow-Origin",
            self.allowed_origin.clone(),
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            CORS_ALLOWED_METHODS,
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            CORS_ALLOWED_HEADERS,
        ));
    }
}

/// Logs every handled request through `tracing`
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        debug!(
            method = %request.method(),
            uri = %request.uri(),
            status = response.status().code,
            "Request handled"
        );
    }
}
