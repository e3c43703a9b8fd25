//! Error types for Trellis core.

use std::fmt;

/// Boxed error returned by relay handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for Trellis core operations.
#[derive(Debug)]
pub enum CoreError {
    /// Field metadata error.
    Meta(MetaError),
    /// Relay dispatch error.
    Relay(RelayError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meta(err) => write!(f, "Metadata error: {err}"),
            Self::Relay(err) => write!(f, "Relay error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Meta(err) => Some(err),
            Self::Relay(err) => Some(err),
        }
    }
}

impl From<MetaError> for CoreError {
    fn from(err: MetaError) -> Self {
        Self::Meta(err)
    }
}

impl From<RelayError> for CoreError {
    fn from(err: RelayError) -> Self {
        Self::Relay(err)
    }
}

/// Field metadata errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaError {
    /// The named field is not declared on the row type.
    UnknownField {
        /// Row type name.
        type_name: &'static str,
        /// Requested field name.
        field: String,
    },
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { type_name, field } => {
                write!(f, "'{field}' is not a readable field of {type_name}")
            }
        }
    }
}

impl std::error::Error for MetaError {}

/// Relay dispatch errors.
#[derive(Debug)]
pub enum RelayError {
    /// A subscribed handler failed while processing a message.
    ///
    /// Dispatch stops at the failing handler; later subscribers are not invoked.
    Handler {
        /// Type name of the published message.
        message_type: &'static str,
        /// The handler's error.
        source: HandlerError,
    },
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler {
                message_type,
                source,
            } => write!(f, "handler for {message_type} failed: {source}"),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Handler { source, .. } => Some(source.as_ref()),
        }
    }
}

/// A specialized Result type for Trellis core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
