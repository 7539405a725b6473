//! Error types for the crate.
//!
//! Internally, functions return `Res<T>`, an `anyhow` result that accumulates context as it
//! bubbles up. At public seams the error is classified with an `ErrorType` so that callers (the CLI
//! or any other front end) can tell a rejected record from a missing one, or a damaged ledger file
//! from a full disk.

use crate::model::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A record was rejected before any state changed, e.g. its amount was not strictly positive.
    Validation,
    /// A record id does not exist in the store.
    NotFound,
    /// The ledger file exists but cannot be understood.
    CorruptData,
    /// Reading or writing a file failed.
    Io,
    /// The configuration or home directory is missing or invalid.
    Config,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type. It wraps an `anyhow::Error`, which holds the message and context chain,
/// together with an `ErrorType`.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub(crate) fn validation(message: impl Display) -> Self {
        Self::new(ErrorType::Validation, anyhow::anyhow!("{message}"))
    }

    pub(crate) fn not_found(id: RecordId) -> Self {
        Self::new(
            ErrorType::NotFound,
            anyhow::anyhow!("Record not found: {id}"),
        )
    }

    pub(crate) fn corrupt(message: impl Display) -> Self {
        Self::new(ErrorType::CorruptData, anyhow::anyhow!("{message}"))
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Adds a layer of context to the underlying error without changing its `ErrorType`.
    pub(crate) fn context(self, context: impl Display + Send + Sync + 'static) -> Self {
        Self {
            error_type: self.error_type,
            inner: self.inner.context(context),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("error_type", &self.error_type)
            .field("inner", &self.inner)
            .finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&*self.inner)
    }
}

/// Converts an internal result into the public `Result` by attaching an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}
