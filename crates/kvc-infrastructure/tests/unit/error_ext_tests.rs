//! Error Extension Tests

use kvc_domain::error::{Error, Result};
use kvc_infrastructure::error_ext::ErrorContext;
use std::io;

#[test]
fn test_context_wraps_as_internal() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

    let result: Result<()> = Err(io_error).context("failed to read file");

    match result {
        Err(Error::Internal { message }) => {
            assert!(message.contains("failed to read file"));
            assert!(message.contains("file not found"));
        }
        other => panic!("Expected Internal error, got {other:?}"),
    }
}

#[test]
fn test_with_context_is_lazy() {
    let ok: std::result::Result<u8, io::Error> = Ok(7);
    let value = ok
        .with_context(|| -> String { panic!("context must not be built on success") })
        .unwrap();
    assert_eq!(value, 7);
}

#[test]
fn test_config_context_keeps_source() {
    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");

    let result: Result<()> = Err(io_error).config_context("cannot open kvc.toml");

    match result {
        Err(Error::Configuration { message, source }) => {
            assert!(message.starts_with("cannot open kvc.toml"));
            assert!(source.is_some());
        }
        other => panic!("Expected Configuration error, got {other:?}"),
    }
}
