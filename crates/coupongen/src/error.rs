//! Error types for coupon generation.
//!
//! Most failure modes of a generation run are never surfaced as values: a run
//! that times out or is cancelled is observed through its progress and result
//! count. [`Error`] covers the cases that do cross an API boundary, plus the
//! internal run outcomes that are logged before being mapped onto progress.
//!
//! ## Error Cases
//! - `InvalidRequest`: The generation request is malformed (e.g. a target
//!   count of zero).
//! - `ChannelError`: The producer or consumer side of a run went away.
//! - `Timeout`: Model data did not arrive within the configured duration.
//! - `Cancelled`: The run was cancelled by the caller.

use core::time::Duration;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for coupon generation.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The request was invalid or exceeded constraints.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Internal channel send/receive failure (e.g. the producer stopped).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// Inclusion pools and exclusion set were not both available in time.
    #[error("Model data not available after {after:?}")]
    Timeout { after: Duration },

    /// The caller cancelled the run.
    #[error("Run cancelled")]
    Cancelled,
}
