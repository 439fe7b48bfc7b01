// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the cellflow dataflow engine
//!
//! Waits in cellflow (lock acquisition, pipe transfers, value lookups) can end in a
//! small number of ways besides success. [`CellflowError`] names each of them so
//! callers can tell a cancelled wait from a sequence that simply finished.
//!
//! # Examples
//!
//! ```
//! use cellflow_core::{CellflowError, Result};
//!
//! fn next_reading() -> Result<u32> {
//!     Err(CellflowError::timeout("sensor did not report"))
//! }
//!
//! assert!(next_reading().unwrap_err().is_timeout());
//! ```

/// Root error type for all cellflow operations
#[derive(Debug, thiserror::Error)]
pub enum CellflowError {
    /// An in-flight wait was cancelled through its token.
    ///
    /// Propagated to the immediate caller, never retried.
    #[error("Operation cancelled")]
    Cancelled,

    /// An [`AsyncPipe`](https://docs.rs/cellflow-exec) reached its end marker.
    ///
    /// This is the normal termination of a sequence and is distinct from `Cancelled`.
    #[error("Channel ended")]
    ChannelEnded,

    /// A timed wait elapsed before it was satisfied
    #[error("Timeout error: {context}")]
    Timeout {
        /// Context about the timeout (e.g. what was being waited for)
        context: String,
    },

    /// Several concurrent operations failed
    ///
    /// Produced by helpers that run a batch of futures and collect every failure.
    #[error("Multiple errors occurred: {count} errors")]
    MultipleErrors {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors
        errors: Vec<CellflowError>,
    },

    /// Custom error from user code
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CellflowError {
    /// Create a timeout error with the given context
    pub fn timeout(context: impl Into<String>) -> Self {
        Self::Timeout {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Aggregate several errors into a `MultipleErrors` variant.
    ///
    /// # Examples
    ///
    /// ```
    /// use cellflow_core::CellflowError;
    ///
    /// let error = CellflowError::aggregate(vec![
    ///     CellflowError::Cancelled,
    ///     CellflowError::timeout("slow"),
    /// ]);
    /// assert!(matches!(error, CellflowError::MultipleErrors { count: 2, .. }));
    /// ```
    pub fn aggregate(errors: Vec<CellflowError>) -> Self {
        Self::MultipleErrors {
            count: errors.len(),
            errors,
        }
    }

    /// Aggregate multiple user errors into a `MultipleErrors` variant
    pub fn from_user_errors<E>(errors: Vec<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::aggregate(errors.into_iter().map(Self::user_error).collect())
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub const fn is_channel_ended(&self) -> bool {
        matches!(self, Self::ChannelEnded)
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error indicates the end of a sequence rather than a failure
    ///
    /// Cancellation and channel end both terminate a consumer loop normally.
    #[must_use]
    pub const fn is_termination(&self) -> bool {
        matches!(self, Self::Cancelled | Self::ChannelEnded)
    }
}

/// Specialized Result type for cellflow operations
pub type Result<T> = std::result::Result<T, CellflowError>;

/// Extension trait for converting errors into `CellflowError`
///
/// Automatically implemented for all types that implement
/// `std::error::Error + Send + Sync + 'static`.
pub trait IntoCellflowError {
    /// Convert this error into a `CellflowError` with additional context
    fn into_cellflow_error(self, context: &str) -> CellflowError;

    /// Convert this error into a `CellflowError` without additional context
    fn into_cellflow(self) -> CellflowError
    where
        Self: Sized,
    {
        self.into_cellflow_error("")
    }
}

impl<E: std::error::Error + Send + Sync + 'static> IntoCellflowError for E {
    fn into_cellflow_error(self, context: &str) -> CellflowError {
        if context.is_empty() {
            CellflowError::user_error(self)
        } else {
            CellflowError::UserError(format!("{context}: {self}").into())
        }
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// Timeouts get the context prepended, user errors get it as a prefix of their
    /// message. Cancellation and channel end pass through untouched.
    ///
    /// # Errors
    /// Returns `Err(CellflowError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(CellflowError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

fn attach_context(error: CellflowError, context: String) -> CellflowError {
    match error {
        CellflowError::UserError(inner) => {
            CellflowError::UserError(format!("{context}: {inner}").into())
        }
        CellflowError::Timeout { context: inner } => CellflowError::Timeout {
            context: format!("{context}: {inner}"),
        },
        other => other,
    }
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CellflowError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| attach_context(e.into(), context.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| attach_context(e.into(), f()))
    }
}

impl Clone for CellflowError {
    fn clone(&self) -> Self {
        match self {
            Self::Cancelled => Self::Cancelled,
            Self::ChannelEnded => Self::ChannelEnded,
            Self::Timeout { context } => Self::Timeout {
                context: context.clone(),
            },
            Self::MultipleErrors { count, errors } => Self::MultipleErrors {
                count: *count,
                errors: errors.clone(),
            },
            // The boxed source cannot be cloned, keep its message
            Self::UserError(e) => Self::UserError(e.to_string().into()),
        }
    }
}
