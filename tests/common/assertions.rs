//! High-level assertion helpers for common test patterns.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use zkalc_collect::ZkalcError;

/// Asserts that a result file exists and holds exactly `expected`.
pub fn assert_output_eq(path: &Path, expected: &str) {
    let actual = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Expected result file {}: {}", path.display(), e));
    assert_eq!(actual, expected, "Unexpected contents in {}", path.display());
}

/// Asserts that a result file exists and is not empty.
pub fn assert_output_non_empty(path: &Path) {
    let metadata = fs::metadata(path)
        .unwrap_or_else(|e| panic!("Expected result file {}: {}", path.display(), e));
    assert!(metadata.len() > 0, "{} should not be empty", path.display());
}

/// Asserts that an operation failed because a command exited with `code`.
pub fn assert_command_failed<T: std::fmt::Debug>(
    result: Result<T, ZkalcError>,
    expected_code: i32,
) {
    match result {
        Ok(value) => panic!("Expected a command failure, got {:?}", value),
        Err(err) => {
            assert!(
                matches!(
                    err,
                    ZkalcError::CommandFailed { code: Some(c), .. } if c == expected_code
                ),
                "Expected CommandFailed with code {}, got: {}",
                expected_code,
                err
            );
            assert_eq!(err.exit_code(), expected_code);
        }
    }
}

/// Asserts that an error mentions `expected_substring`.
pub fn assert_error_contains<T: std::fmt::Debug>(
    result: Result<T, ZkalcError>,
    expected_substring: &str,
) {
    match result {
        Ok(value) => panic!(
            "Expected an error containing '{}', got {:?}",
            expected_substring, value
        ),
        Err(err) => {
            let message = err.to_string();
            assert!(
                message.contains(expected_substring),
                "Expected error containing '{}', got: {}",
                expected_substring,
                message
            );
        }
    }
}
