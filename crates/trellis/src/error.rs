//! Error types for the grid engine, session log store and settings.

use std::path::PathBuf;

use trellis_core::{MetaError, RelayError};

/// Result type alias for Trellis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A sort, filter or summary field does not exist on the row type.
    #[error("'{field}' is not a readable field of {type_name}")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    /// A page request literal was neither a keyword nor a page number.
    #[error("invalid page request '{0}', expected next, previous, first, last or a page number")]
    InvalidPageRequest(String),
}

impl From<MetaError> for GridError {
    fn from(err: MetaError) -> Self {
        match err {
            MetaError::UnknownField { type_name, field } => Self::UnknownField { type_name, field },
        }
    }
}

/// Errors raised while applying a display format string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// The format string is not one this crate understands.
    #[error("format specifier '{0}' is invalid")]
    InvalidSpecifier(String),

    /// The precision digits after the specifier letter are out of range.
    #[error("precision in format specifier '{0}' is out of range")]
    PrecisionOutOfRange(String),

    /// An integer-only specifier (`D`) was applied to a fractional value.
    #[error("format specifier '{format}' requires an integral value, got {value}")]
    IntegralRequired { format: String, value: f64 },

    /// A numeric specifier was applied to a timestamp, or the other way round.
    #[error("format specifier '{format}' cannot be applied to a {kind} value")]
    KindMismatch { format: String, kind: &'static str },
}

impl FormatError {
    pub(crate) fn invalid(format: &str) -> Self {
        Self::InvalidSpecifier(format.to_string())
    }
}

/// Errors raised by the session log store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database could not be opened at `path`.
    #[error("failed to open session log '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed.
    #[error("session log query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors raised while loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File I/O error.
    #[error("failed to access settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML for the settings schema.
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl SettingsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Any error Trellis can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[cfg(feature = "networking")]
    #[error(transparent)]
    Network(#[from] trellis_net::NetworkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_error_converts_to_grid_error() {
        let err: GridError = MetaError::UnknownField {
            type_name: "Item",
            field: "missing".into(),
        }
        .into();
        assert!(matches!(err, GridError::UnknownField { type_name: "Item", .. }));
        assert_eq!(err.to_string(), "'missing' is not a readable field of Item");
    }

    #[test]
    fn test_format_error_display() {
        assert_eq!(
            FormatError::invalid("Q3").to_string(),
            "format specifier 'Q3' is invalid"
        );
    }

    #[test]
    fn test_aggregate_is_transparent() {
        let err: Error = GridError::InvalidPageRequest("sideways".into()).into();
        assert!(err.to_string().starts_with("invalid page request 'sideways'"));
    }
}
