//! Error types for threedi-settings.

use thiserror::Error;

use crate::mapping::ResourceGroup;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while importing legacy settings.
#[derive(Error, Debug)]
pub enum Error {
    /// Source file or addressed row does not exist.
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// Source exists but lacks required sections, tables or columns.
    #[error("Malformed source: {0}")]
    SourceMalformed(String),

    /// A mapped legacy field is absent from the source data.
    #[error("Field '{field}' required for {group} settings is missing from the source")]
    MissingField {
        /// Group whose conversion failed.
        group: ResourceGroup,
        /// Legacy field name that was looked up.
        field: String,
    },

    /// Resource group name not known to the mapping table.
    #[error("Unknown settings group '{0}' (expected general, time_step, numerical or aggregation)")]
    UnknownGroup(String),

    /// Remote API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body as reported by the server.
        body: String,
    },

    /// Converted record does not fit the API model.
    #[error("Invalid payload for {model}: {message}")]
    Payload {
        /// API model name.
        model: &'static str,
        /// Serde error message.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error ends the whole import run rather than one group or item.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::SourceNotFound(_)
                | Error::SourceMalformed(_)
                | Error::Config(_)
                | Error::Io(_)
                | Error::Sqlite(_)
        )
    }
}
