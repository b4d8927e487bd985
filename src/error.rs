//! Error types for shelf2html.

use std::path::PathBuf;

use thiserror::Error;

/// The caller-supplied cookie string could not be turned into credentials.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("cookie string is empty")]
    Empty,

    #[error("malformed cookie pair: {0:?}")]
    Malformed(String),
}

/// Errors surfaced by the remote reading service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service answered with a non-zero `errCode`.
    #[error("service error {code}: {message}")]
    Service { code: i64, message: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status with a body that is not a service envelope.
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors reading or writing the on-disk cache.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cache serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reasons a book download operation aborts.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("failed to fetch book info: {0}")]
    BookInfo(#[source] ApiError),

    #[error("failed to fetch chapter list: {0}")]
    ChapterList(#[source] ApiError),

    #[error("no chapters found")]
    NoChapters,

    #[error("none of the {attempted} chapters could be retrieved")]
    AllChaptersFailed { attempted: usize },

    #[error("failed to write {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
        attempted: usize,
        succeeded: usize,
    },
}

impl DownloadError {
    /// Name of the pipeline stage the operation was aborted in.
    pub fn stage(&self) -> &'static str {
        match self {
            DownloadError::BookInfo(_) => "fetching book info",
            DownloadError::ChapterList(_) | DownloadError::NoChapters => "fetching chapter list",
            DownloadError::AllChaptersFailed { .. } => "downloading",
            DownloadError::Persistence { .. } => "persisting",
        }
    }

    /// `(attempted, succeeded)` chapter counts at the point of failure.
    pub fn counts(&self) -> (usize, usize) {
        match self {
            DownloadError::AllChaptersFailed { attempted } => (*attempted, 0),
            DownloadError::Persistence {
                attempted,
                succeeded,
                ..
            } => (*attempted, *succeeded),
            _ => (0, 0),
        }
    }
}

/// A specialized `Result` type for the download pipeline.
pub type Result<T> = std::result::Result<T, DownloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_failed_reports_zero_successes() {
        let err = DownloadError::AllChaptersFailed { attempted: 3 };
        assert_eq!(err.counts(), (3, 0));
        assert_eq!(err.stage(), "downloading");
        assert_eq!(err.to_string(), "none of the 3 chapters could be retrieved");
    }

    #[test]
    fn service_error_message_carries_code() {
        let err = DownloadError::BookInfo(ApiError::Service {
            code: -2012,
            message: "login timeout".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "failed to fetch book info: service error -2012: login timeout"
        );
        assert_eq!(err.counts(), (0, 0));
        assert_eq!(err.stage(), "fetching book info");
    }
}
