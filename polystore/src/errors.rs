use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for polystore operations.
///
/// Reads through a [Document](crate::document::Document) never produce an
/// error: absent or uncoercible values degrade to a zero value or a caller
/// supplied default. Everything else that can go wrong falls in one of these
/// categories.
///
/// # Examples
///
/// ```rust
/// use polystore::errors::{ErrorKind, PolyError, PolyResult};
///
/// fn example() -> PolyResult<()> {
///     Err(PolyError::new("Database is not connected", ErrorKind::ConnectionState))
/// }
/// assert!(example().is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// An operation was attempted while the database handle was in the wrong
    /// lifecycle state (for example a query while disconnected).
    ConnectionState,
    /// The underlying driver or transport failed. The original failure is
    /// kept as the cause.
    BackendExecution,
    /// A read-only or null-object document was mutated, or a backend was
    /// asked for something it cannot express.
    UnsupportedOperation,
    /// The operation is not valid with the given arguments.
    InvalidOperation,
    /// Error encoding or decoding serialized documents.
    EncodingError,
    /// The supplied configuration is incomplete or malformed.
    ConfigurationError,
    /// Internal error (usually indicates a bug).
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConnectionState => write!(f, "Connection state error"),
            ErrorKind::BackendExecution => write!(f, "Backend execution error"),
            ErrorKind::UnsupportedOperation => write!(f, "Unsupported operation"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom polystore error type.
///
/// `PolyError` carries a message, a kind and an optional cause, so that
/// backend failures can be surfaced to the caller without losing the
/// driver's original error.
///
/// # Examples
///
/// ```rust
/// use polystore::errors::{ErrorKind, PolyError};
///
/// let cause = PolyError::new("socket closed", ErrorKind::BackendExecution);
/// let err = PolyError::new_with_cause("Failed to execute query", ErrorKind::BackendExecution, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct PolyError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<PolyError>>,
    backtrace: Atomic<Backtrace>,
}

impl PolyError {
    /// Creates a new `PolyError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        PolyError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `PolyError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: PolyError) -> Self {
        PolyError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Wraps an arbitrary driver error as a [ErrorKind::BackendExecution] error.
    ///
    /// The driver error becomes the cause so that it is still visible through
    /// [Error::source] and the `Debug` output.
    pub fn backend<E: Display>(message: &str, err: E) -> Self {
        PolyError::wrap(message, ErrorKind::BackendExecution, err)
    }

    /// Wraps a foreign error of the given kind, keeping it as the cause.
    pub fn wrap<E: Display>(message: &str, error_kind: ErrorKind, err: E) -> Self {
        let cause = PolyError::new(&err.to_string(), error_kind.clone());
        PolyError::new_with_cause(message, error_kind, cause)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&PolyError> {
        self.cause.as_deref()
    }
}

impl Display for PolyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for PolyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for PolyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for polystore operations.
pub type PolyResult<T> = Result<T, PolyError>;

impl From<std::io::Error> for PolyError {
    fn from(err: std::io::Error) -> Self {
        PolyError::backend("IO error", err)
    }
}

impl From<serde_json::Error> for PolyError {
    fn from(err: serde_json::Error) -> Self {
        PolyError::wrap("JSON encoding error", ErrorKind::EncodingError, err)
    }
}

impl From<std::fmt::Error> for PolyError {
    fn from(err: std::fmt::Error) -> Self {
        PolyError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poly_error_new_creates_error() {
        let error = PolyError::new("An error occurred", ErrorKind::BackendExecution);
        assert_eq!(error.message(), "An error occurred");
        assert_eq!(error.kind(), &ErrorKind::BackendExecution);
        assert!(error.cause().is_none());
    }

    #[test]
    fn poly_error_new_with_cause_creates_error() {
        let cause = PolyError::new("connection reset", ErrorKind::BackendExecution);
        let error = PolyError::new_with_cause("Query failed", ErrorKind::BackendExecution, cause);
        assert_eq!(error.message(), "Query failed");
        assert_eq!(error.cause().map(|c| c.message()), Some("connection reset"));
    }

    #[test]
    fn poly_error_backend_wraps_driver_error() {
        let driver = std::io::Error::other("broken pipe");
        let error = PolyError::backend("Failed to insert", driver);
        assert_eq!(error.kind(), &ErrorKind::BackendExecution);
        assert!(error.source().is_some());
        assert!(format!("{:?}", error).contains("broken pipe"));
    }

    #[test]
    fn poly_error_display_formats_message_only() {
        let error = PolyError::new("Document is read only", ErrorKind::UnsupportedOperation);
        assert_eq!(format!("{}", error), "Document is read only");
    }

    #[test]
    fn poly_error_debug_formats_with_cause() {
        let cause = PolyError::new("inner", ErrorKind::BackendExecution);
        let error = PolyError::new_with_cause("outer", ErrorKind::BackendExecution, cause);
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("outer"));
        assert!(formatted.contains("Caused by:"));
    }

    #[test]
    fn poly_error_source_returns_none_when_no_cause() {
        let error = PolyError::new("An error occurred", ErrorKind::InternalError);
        assert!(error.source().is_none());
    }

    #[test]
    fn serde_json_error_maps_to_encoding_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: PolyError = err.into();
        assert_eq!(error.kind(), &ErrorKind::EncodingError);
        assert!(error.source().is_some());
    }

    #[test]
    fn io_error_is_kept_as_source() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.properties missing");
        let error: PolyError = err.into();
        assert_eq!(error.kind(), &ErrorKind::BackendExecution);
        assert_eq!(error.message(), "IO error");
        let source = error.source().unwrap();
        assert_eq!(source.to_string(), "config.properties missing");
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::ConnectionState.to_string(), "Connection state error");
        assert_eq!(ErrorKind::UnsupportedOperation.to_string(), "Unsupported operation");
    }
}
