//! Server constants

/// Value reported by the health endpoint
pub const HEALTH_STATUS_HEALTHY: &str = "healthy";

/// Methods allowed by the CORS fairing
pub const CORS_ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Headers allowed by the CORS fairing
pub const CORS_ALLOWED_HEADERS: &str = "Content-Type";

/// Message of a request missing the visitor id
pub const ERROR_MISSING_VISITOR: &str = "visitorId query parameter is required";
