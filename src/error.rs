//! Error types for reactive publishers and the person store.

use thiserror::Error;

/// Root error type for crate operations.
#[derive(Error, Debug)]
pub enum ReactiveError {
    /// Errors signalled through a publisher's error channel
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Errors raised while building a record store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors delivered through the error channel of a `Mono` or `Flux`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// `single()` saw a source that completed without emitting
    #[error("Source was empty")]
    NoSuchElement,

    /// `single()` saw a source that emitted more than one item
    #[error("Source emitted more than one item")]
    TooManyElements,

    /// A blocking wait exceeded its deadline
    #[error("Timeout on blocking read for {0}ms")]
    Timeout(u64),

    /// A blocking read was attempted on a Tokio runtime worker thread
    #[error("block() is not supported inside an async runtime, await the publisher instead")]
    BlockingInAsyncContext,

    /// The runtime used to drive a publisher could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// A subscriber callback panicked. The subscription fails with this error
    /// whether it ran on a task or on the calling thread
    #[error("Callback failed: {0}")]
    Callback(String),

    /// Error raised by user code through `Mono::error` or a sink
    #[error("{0}")]
    Other(String),
}

/// Errors that can occur while assembling a store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Two records share the same id
    #[error("Duplicate record id: {0}")]
    DuplicateId(i32),
}

/// A publisher did not behave as a [`StepVerifier`](crate::StepVerifier) expected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// A value arrived but failed its expectation
    #[error("expectation failed at signal #{index}: {message}")]
    Mismatch { index: usize, message: String },

    /// The publisher completed while something else was expected
    #[error("expected {expected} at signal #{index}, but the publisher completed")]
    UnexpectedComplete { index: usize, expected: String },

    /// The publisher failed while something else was expected
    #[error("expected {expected} at signal #{index}, but got error: {error}")]
    UnexpectedError {
        index: usize,
        expected: String,
        error: StreamError,
    },

    /// The publisher emitted a value where a terminal signal was expected
    #[error("expected a terminal signal at #{index}, but got onNext({value})")]
    UnexpectedNext { index: usize, value: String },
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Runtime(err.to_string())
    }
}

impl From<String> for StreamError {
    fn from(msg: String) -> Self {
        StreamError::Other(msg)
    }
}

impl From<&str> for StreamError {
    fn from(msg: &str) -> Self {
        StreamError::Other(msg.to_string())
    }
}

/// Result type alias for publisher signals.
pub type StreamResult<T> = Result<T, StreamError>;

/// Result type alias for store construction.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for general crate operations.
pub type ReactiveResult<T> = Result<T, ReactiveError>;
