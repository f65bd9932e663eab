// Error handling tests
// Author: kelexine (https://github.com/kelexine)

use flymply_cache::error::CacheError;

fn decode_error() -> serde_json::Error {
    serde_json::from_str::<serde_json::Value>("{oops").unwrap_err()
}

#[test]
fn test_error_display_messages() {
    let errors = vec![
        CacheError::StoreUnavailable("medium closed".to_string()),
        CacheError::QuotaExceeded { needed: 10, quota: 5 },
        CacheError::Decode(decode_error()),
        CacheError::Config("bad prefix".to_string()),
        CacheError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")),
    ];

    for error in errors {
        let display = format!("{}", error);
        assert!(!display.is_empty(), "Error should have display message");
    }
}

#[test]
fn test_quota_error_mentions_sizes() {
    let error = CacheError::QuotaExceeded { needed: 5120, quota: 4096 };
    let display = format!("{}", error);
    assert!(display.contains("5120"));
    assert!(display.contains("4096"));
}

#[test]
fn test_decode_error_is_corrupt_entry() {
    let error = CacheError::Decode(decode_error());
    assert!(format!("{}", error).contains("Corrupt cache entry"));
    assert!(!error.is_medium_failure());
}

#[test]
fn test_medium_failures_classified() {
    assert!(CacheError::StoreUnavailable("x".to_string()).is_medium_failure());
    assert!(CacheError::QuotaExceeded { needed: 2, quota: 1 }.is_medium_failure());
    assert!(CacheError::Io(std::io::Error::new(std::io::ErrorKind::Other, "x")).is_medium_failure());
    assert!(!CacheError::Config("x".to_string()).is_medium_failure());
    assert!(!CacheError::Encode(decode_error()).is_medium_failure());
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let error: CacheError = io.into();
    assert!(format!("{}", error).contains("read-only"));
}
