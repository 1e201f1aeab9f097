//! HTTP client factory

use crate::config::ClientConfig;
use crate::constants::HTTP_CLIENT_USER_AGENT;
use crate::error_ext::ErrorContext;
use cmp_domain::error::Result;
use reqwest::Client;

/// Build the HTTP client used by the persistence client
///
/// The client-level timeout matches the per-request one so a hung
/// connection cannot outlive the request budget.
pub fn create_http_client(config: &ClientConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(HTTP_CLIENT_USER_AGENT)
        .build()
        .network_context("Failed to create HTTP client")
}
