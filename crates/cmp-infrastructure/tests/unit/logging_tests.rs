//! Logging tests

use cmp_domain::Error;
use cmp_infrastructure::logging::parse_log_level;
use tracing::Level;

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").expect("level"), Level::TRACE);
    assert_eq!(parse_log_level("DEBUG").expect("level"), Level::DEBUG);
    assert_eq!(parse_log_level("info").expect("level"), Level::INFO);
    assert_eq!(parse_log_level("warning").expect("level"), Level::WARN);
    assert_eq!(parse_log_level("error").expect("level"), Level::ERROR);
    assert!(matches!(
        parse_log_level("verbose"),
        Err(Error::Configuration { .. })
    ));
}
