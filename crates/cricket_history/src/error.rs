//! Failures of the history store.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong with a stored game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HistoryErrorKind {
    /// The store directory or a file in it could not be created, opened,
    /// written or removed.
    #[display("storage")]
    Storage,
    /// A record, bundle or metadata file is not valid JSON for its type.
    #[display("corrupt file")]
    Corrupt,
    /// A name that is not a plain record file name inside the store.
    #[display("invalid record name")]
    InvalidName,
    /// A finished game whose winner cannot be determined.
    #[display("no winner")]
    NoWinner,
}

/// A failed store operation, with the place it was raised.
///
/// None of these are fatal to the caller: a failed save can be retried as
/// aborted, a corrupt record can be skipped, and an invalid name comes from
/// user input.
#[derive(Debug, Clone, Display, Error)]
#[display("History {} error: {} at {}:{}", kind, message, file, line)]
pub struct HistoryError {
    /// Kind of failure.
    pub kind: HistoryErrorKind,
    /// What was being attempted and why it failed.
    pub message: String,
    /// Line that raised the error.
    pub line: u32,
    /// Source file that raised the error.
    pub file: &'static str,
}

impl HistoryError {
    /// Creates an error located at the caller.
    #[track_caller]
    #[instrument(level = "debug", skip_all, fields(%kind))]
    pub fn new(kind: HistoryErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The same failure with `context` prefixed to its message.
    #[track_caller]
    pub fn context(self, context: impl AsRef<str>) -> Self {
        Self::new(self.kind, format!("{}: {}", context.as_ref(), self.message))
    }
}

impl From<std::io::Error> for HistoryError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(HistoryErrorKind::Storage, err.to_string())
    }
}

impl From<serde_json::Error> for HistoryError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        let kind = if err.is_io() {
            HistoryErrorKind::Storage
        } else {
            HistoryErrorKind::Corrupt
        };
        Self::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_storage_failures() {
        let err = HistoryError::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(err.kind, HistoryErrorKind::Storage);
        assert!(err.file.ends_with("error.rs"));
    }

    #[test]
    fn test_bad_json_is_corrupt() {
        let err = HistoryError::from(serde_json::from_str::<u32>("[").unwrap_err());
        assert_eq!(err.kind, HistoryErrorKind::Corrupt);
    }

    #[test]
    fn test_context_keeps_kind() {
        let err = HistoryError::new(HistoryErrorKind::InvalidName, "Not a record name: 'x'")
            .context("Cannot load 'x'");
        assert_eq!(err.kind, HistoryErrorKind::InvalidName);
        assert_eq!(err.message, "Cannot load 'x': Not a record name: 'x'");
        assert!(err.to_string().starts_with("History invalid record name error: Cannot load"));
    }
}
