//! Path splitting and name validation
//!
//! Multi-segment resolution decomposes a path like `foo/bar` into single
//! lookup steps; this module owns the syntax rules for those segments.

use thiserror::Error;

/// Errors raised by path and name validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Path is empty or syntactically malformed
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Name is not usable as a binding name
    #[error("invalid name: {0:?}")]
    InvalidName(String),
}

/// Splits a path into lookup segments
///
/// Leading and trailing slashes are trimmed; empty, `.`, and `..` segments
/// are rejected.
///
/// # Examples
///
/// ```
/// use namespace_tree::path;
///
/// let segments = path::split("foo/bar").unwrap();
/// assert_eq!(segments, vec!["foo", "bar"]);
/// ```
pub fn split(path: &str) -> Result<Vec<&str>, PathError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(PathError::InvalidPath("empty path".to_string()));
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    for segment in &segments {
        validate_name(segment)?;
    }
    Ok(segments)
}

/// Validates a single binding name
///
/// A name must be non-empty, contain no path separator or NUL, and must not
/// be one of the reserved dot entries.
pub fn validate_name(name: &str) -> Result<(), PathError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\0')
    {
        return Err(PathError::InvalidName(name.to_string()));
    }
    Ok(())
}
