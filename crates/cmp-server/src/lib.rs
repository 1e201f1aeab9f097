//! # Consent Persistence Service
//!
//! Rocket HTTP API over the consent log service. Exactly one decision is
//! kept per `(visitorId, siteId)`; every `POST` overwrites it.
//!
//! | Method | Path | Body / Query | Response `data` |
//! |--------|------|--------------|-----------------|
//! | `GET` | `/consent/<siteId>` | `?visitorId=..` | `{ consent: decision \| null }` |
//! | `POST` | `/consent/<siteId>` | submission payload | `{ consent: decision }` |
//! | `GET` | `/health` | | service status |
//!
//! Every response, errors included, is wrapped as
//! `{ status: "success" | "error", data, message }`.

pub mod catchers;
pub mod constants;
pub mod fairings;
pub mod handlers;
pub mod responses;
pub mod server;

pub use server::{ConsentServer, ServerState, consent_rocket};
