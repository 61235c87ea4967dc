//! Transport layer errors.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Protocol error from the session engine. These are fatal to the
    /// session; the connection should be dropped.
    #[error("Protocol error: {0}")]
    Protocol(#[from] uqconn_core::Error),

    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
