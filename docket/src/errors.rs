use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Reason an infrastructure failure happened.
///
/// Carried by [`ErrorKind::InfrastructureError`] so callers can tell a deadline
/// expiry from a refused connection or an engine-side rejection without
/// parsing messages.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InfrastructureCause {
    /// The operation did not finish before its deadline.
    Timeout,
    /// The engine could not be reached.
    Connection,
    /// The engine answered with a failure status.
    Status(u16),
    /// The engine answered with something that is not a valid response.
    Protocol,
}

impl Display for InfrastructureCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InfrastructureCause::Timeout => write!(f, "timeout"),
            InfrastructureCause::Connection => write!(f, "connection failure"),
            InfrastructureCause::Status(status) => write!(f, "status {}", status),
            InfrastructureCause::Protocol => write!(f, "protocol failure"),
        }
    }
}

/// Error kinds for Docket operations
///
/// Every failure a repository call can surface is one of these kinds. Callers
/// get either a result or one of them, never a partially populated result.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::errors::{DocketError, ErrorKind, DocketResult};
///
/// fn example() -> DocketResult<()> {
///     Err(DocketError::new("unsupported operator LIKE", ErrorKind::InvalidCriteria))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The criteria could not be translated into a native query
    InvalidCriteria,
    /// The target collection does not exist at the engine.
    ///
    /// Only raised between the store and the query executor, which turns it
    /// into an empty result.
    CollectionAbsent,
    /// A stored document could not be turned back into an aggregate
    MalformedDocument,
    /// Connectivity, timeout or unclassified engine failure
    InfrastructureError(InfrastructureCause),
    /// A configuration value is unusable
    InvalidConfiguration,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidCriteria => write!(f, "Invalid criteria"),
            ErrorKind::CollectionAbsent => write!(f, "Collection absent"),
            ErrorKind::MalformedDocument => write!(f, "Malformed document"),
            ErrorKind::InfrastructureError(cause) => write!(f, "Infrastructure error ({})", cause),
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
        }
    }
}

/// Custom Docket error type.
///
/// `DocketError` holds the error message, its kind, the collection it relates to
/// (when there is one) and an optional cause, so an error surfaced from a search
/// can be diagnosed without re-running it.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::errors::{DocketError, ErrorKind, InfrastructureCause};
///
/// let err = DocketError::new("search timed out", ErrorKind::InfrastructureError(InfrastructureCause::Timeout))
///     .with_collection("courses");
/// assert!(err.is_timeout());
/// ```
#[derive(Clone)]
pub struct DocketError {
    message: String,
    error_kind: ErrorKind,
    collection: Option<String>,
    cause: Option<Box<DocketError>>,
    backtrace: Backtrace,
}

impl DocketError {
    /// Creates a new `DocketError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocketError {
            message: message.to_string(),
            error_kind,
            collection: None,
            cause: None,
            backtrace: Backtrace::new_unresolved(),
        }
    }

    /// Creates a new `DocketError` with a cause error.
    ///
    /// The cause is preserved and reported through [`Error::source`].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DocketError) -> Self {
        DocketError {
            message: message.to_string(),
            error_kind,
            collection: None,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new_unresolved(),
        }
    }

    /// Attaches the collection the failing operation targeted.
    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = Some(collection.to_string());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn cause(&self) -> Option<&DocketError> {
        self.cause.as_deref()
    }

    /// Returns the resolved backtrace captured when the error was created.
    pub fn backtrace(&self) -> Backtrace {
        let mut backtrace = self.backtrace.clone();
        backtrace.resolve();
        backtrace
    }

    /// Returns true if the error is an infrastructure failure caused by a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        self.error_kind == ErrorKind::InfrastructureError(InfrastructureCause::Timeout)
    }

    /// Returns the engine status code, if the engine reported one.
    pub fn status(&self) -> Option<u16> {
        match self.error_kind {
            ErrorKind::InfrastructureError(InfrastructureCause::Status(status)) => Some(status),
            _ => None,
        }
    }
}

impl Display for DocketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.collection {
            Some(collection) => write!(f, "{} [collection: {}]", self.message, collection),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Debug for DocketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_kind, self)?;
        if let Some(cause) = &self.cause {
            write!(f, "\nCaused by: {:?}", cause)?;
        }
        Ok(())
    }
}

impl Error for DocketError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|cause| cause.as_ref() as &(dyn Error + 'static))
    }
}

/// Result type for Docket operations.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::errors::{DocketResult, DocketError, ErrorKind};
///
/// fn decode_name(doc: &Document) -> DocketResult<String> {
///     doc.get("name")
///         .and_then(|v| v.as_string().cloned())
///         .ok_or_else(|| DocketError::new("name is missing", ErrorKind::MalformedDocument))
/// }
/// ```
pub type DocketResult<T> = Result<T, DocketError>;

impl From<serde_json::Error> for DocketError {
    fn from(err: serde_json::Error) -> Self {
        DocketError::new(
            &format!("JSON error: {}", err),
            ErrorKind::MalformedDocument,
        )
    }
}

impl From<tokio::time::error::Elapsed> for DocketError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        DocketError::new(
            "Operation deadline elapsed",
            ErrorKind::InfrastructureError(InfrastructureCause::Timeout),
        )
    }
}
