//! Error types for template resolution, parsing and rendering.
//!
//! [`TemplateError`] is the single error type returned by every engine,
//! factory and template operation. It abstracts over the backend's own errors
//! so callers can match on *what* went wrong (nothing found, misconfigured
//! extension, bad syntax, unreadable file) without depending on minijinja.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for template operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// An absolute path does not exist, or no search path / extension
    /// combination resolves a relative one.
    #[error("template not found: {}", path.display())]
    NotFound {
        /// The path as requested by the caller.
        path: PathBuf,
    },

    /// The resolved file's extension has no registered factory and none was
    /// supplied explicitly.
    #[error("can't find a factory that can parse {}", path.display())]
    NoFactoryForPath {
        /// The resolved path.
        path: PathBuf,
    },

    /// The template body is malformed.
    #[error("failed to parse template \"{name}\": {detail}")]
    Parse {
        /// The name the template was being parsed under (empty when anonymous).
        name: String,
        /// Line reported by the backend, if any.
        line: Option<usize>,
        /// The backend's diagnostic.
        detail: String,
    },

    /// The file was resolved but could not be read.
    #[error("failed to read template {}: {source}", path.display())]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The backend failed while executing a template.
    #[error("render error: {0}")]
    Render(String),

    /// Writing rendered output to the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Rendered output was not valid UTF-8.
    #[error("rendered output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl TemplateError {
    /// Builds a [`TemplateError::Parse`] from a backend compile error.
    pub(crate) fn parse(name: &str, err: minijinja::Error) -> Self {
        TemplateError::Parse {
            name: name.to_string(),
            line: err.line(),
            detail: err.to_string(),
        }
    }

    /// Returns true for [`TemplateError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::NotFound { .. })
    }
}

// Render-time backend errors. Compile errors go through `TemplateError::parse`.
impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::WriteFailure => {
                TemplateError::Io(io::Error::new(io::ErrorKind::Other, err.to_string()))
            }
            _ => TemplateError::Render(err.to_string()),
        }
    }
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = TemplateError::NotFound {
            path: PathBuf::from("foo/bar"),
        };
        assert!(err.to_string().contains("template not found"));
        assert!(err.to_string().contains("foo/bar"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_error_keeps_source() {
        let err = TemplateError::Read {
            path: PathBuf::from("/tmp/x.tmpl"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "denied");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_parse_from_minijinja_carries_line() {
        let mut env = minijinja::Environment::new();
        let mj_err = env
            .add_template("bad", "line one\n{{ unclosed")
            .expect_err("syntax error");
        let err = TemplateError::parse("bad", mj_err);
        match err {
            TemplateError::Parse { name, line, .. } => {
                assert_eq!(name, "bad");
                assert!(line.is_some());
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
