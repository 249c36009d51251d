use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the I/O entry points.
///
/// Parsing text never fails: malformed lines are skipped.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read `{}`: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid UTF-8 input: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

impl Error {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Whether this error reports a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io(err) | Self::File { source: err, .. } => {
                err.kind() == std::io::ErrorKind::NotFound
            }
            Self::InvalidEncoding(_) => false,
        }
    }
}
