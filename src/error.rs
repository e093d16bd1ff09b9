use std::fmt;
use std::path::PathBuf;

use crate::php::PhpError;
use crate::value::{Value, ValuePath};

/// Represents any failure that can occur while exporting a runtime value to
/// source text.
#[derive(Debug)]
pub enum ExportError {
    /// The closure's declaring file is unknown or no longer exists on disk.
    SourceUnavailable { path: PathBuf },
    /// The declaring file exists but is not valid source for the supported
    /// grammar.
    Parse(PhpError),
    /// No function-literal node starts at the recorded line. Recoverable:
    /// line numbers may have shifted between capture and lookup.
    NodeNotFound { path: PathBuf, line: usize },
    /// A value with no source representation (host object, resource handle)
    /// was encountered. Carries the value and where it sits in the container.
    Unexportable {
        type_name: String,
        path: ValuePath,
        value: Value,
    },
    /// Container nesting exceeded the configured maximum depth.
    DepthExceeded { max_depth: usize },
    Io(std::io::Error),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<PhpError> for ExportError {
    fn from(err: PhpError) -> Self {
        ExportError::Parse(err)
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::SourceUnavailable { path } => {
                write!(f, "closure source unavailable: {}", path.display())
            }
            ExportError::Parse(err) => write!(f, "source parse failed: {err}"),
            ExportError::NodeNotFound { path, line } => write!(
                f,
                "no function literal starts on line {line} of {}",
                path.display()
            ),
            ExportError::Unexportable {
                type_name, path, ..
            } => {
                if path.is_root() {
                    write!(f, "value of type {type_name} cannot be exported")
                } else {
                    write!(f, "value of type {type_name} at {path} cannot be exported")
                }
            }
            ExportError::DepthExceeded { max_depth } => {
                write!(f, "maximum nesting depth of {max_depth} exceeded")
            }
            ExportError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Parse(err) => Some(err),
            ExportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
