//! Error types for foldstream.
//!
//! The stream machinery is generic over its error channel `E`; nothing in
//! the crate forces a particular error type. `StreamError` is the concrete
//! error most callers reach for when they have no domain error of their own.

use crate::queue::QueueError;

/// Default error type for stream pipelines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// A queue backing a concurrent combinator failed.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    /// The pipeline was cancelled before completion.
    #[error("stream cancelled")]
    Cancelled,
    /// Element production failed.
    #[error("source error: {0}")]
    Source(String),
    /// Custom error with message.
    #[error("stream error: {0}")]
    Custom(String),
}

/// Result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;
