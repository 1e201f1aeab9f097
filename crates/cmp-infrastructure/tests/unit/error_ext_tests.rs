//! Error context extension tests

use cmp_domain::Error;
use cmp_infrastructure::error_ext::ErrorContext;
use std::io;

fn failing() -> Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
}

#[test]
fn test_context_variants() {
    let err = failing().context("Loading").expect_err("error");
    assert!(matches!(err, Error::Infrastructure { .. }));
    assert!(err.to_string().contains("Loading: missing"));

    assert!(matches!(
        failing().io_context("Reading").expect_err("error"),
        Error::Io { .. }
    ));
    assert!(matches!(
        failing().config_context("Parsing").expect_err("error"),
        Error::Configuration { .. }
    ));
    assert!(matches!(
        failing().network_context("Connecting").expect_err("error"),
        Error::Network { .. }
    ));
}

#[test]
fn test_with_context_is_lazy() {
    let ok: Result<u8, io::Error> = Ok(1);
    let value = ok
        .with_context(|| -> String { panic!("context built for a success") })
        .expect("value");
    assert_eq!(value, 1);

    let err = failing()
        .with_context(|| format!("Attempt {}", 3))
        .expect_err("error");
    assert!(err.to_string().contains("Attempt 3"));
}
