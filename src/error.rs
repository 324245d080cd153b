use thiserror::Error;

/// Crate-level error type.
///
/// Decode failures on individual stream frames are deliberately *not* here:
/// one bad frame never aborts a session, so those surface as
/// [`crate::session::Directive::DecodeError`] instead.
#[derive(Debug, Error)]
pub enum DebateError {
    /// The request never completed or the stream broke mid-flight.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: String,
        source: toml::de::Error,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
