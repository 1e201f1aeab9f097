//! Tests for the domain error type

use cmp_domain::error::Error;

#[test]
fn test_payload_too_large_is_size_related() {
    assert!(Error::PayloadTooLarge { size: 90_000 }.is_size_related());
}

#[test]
fn test_other_errors_are_not_size_related() {
    assert!(!Error::network("connection refused").is_size_related());
    assert!(!Error::network("upstream 4130 reset").is_size_related());
    assert!(!Error::network("HTTP 413 Payload Too Large").is_size_related());
    assert!(!Error::malformed_response("missing data").is_size_related());
    assert!(!Error::ConcurrentSubmission.is_size_related());
}

#[test]
fn test_error_display() {
    let err = Error::storage_unavailable("local", "quota exceeded");
    assert_eq!(err.to_string(), "Storage unavailable (local): quota exceeded");

    let err = Error::BannerNotFound { attempts: 10 };
    assert_eq!(err.to_string(), "Banner not found after 10 attempts");
}

#[test]
fn test_from_string() {
    let err: Error = "boom".into();
    assert!(matches!(err, Error::String(ref s) if s == "boom"));
}
