//! Error types for protocol operations.

use thiserror::Error;

/// Result type alias for protocol operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Protocol operation errors.
///
/// Every protocol error is fatal to the session that raised it: the session
/// moves to its failed state and answers [`Error::SessionFailed`] from then
/// on. The kinds are reported for diagnostics only.
#[derive(Debug, Error)]
pub enum Error {
    /// The pinned server RSA public key did not parse.
    #[error("Unparseable server RSA key: {0}")]
    BadKey(String),

    /// Version byte mismatch in the server hello.
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    ProtocolVersion {
        /// Version this client speaks.
        expected: u8,
        /// Version byte received from the server.
        actual: u8,
    },

    /// RSA-PSS verification of the server hello failed.
    #[error("Server hello signature verification failed")]
    BadSignature,

    /// HMAC mismatch on an inbound record.
    #[error("Record authentication failed")]
    BadMac,

    /// Frame plaintext could not be parsed, or lengths are inconsistent.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Snappy refused the compressed payload.
    #[error("Decompression failed: {0}")]
    Decompress(String),

    /// A cryptographic primitive signalled an unexpected failure.
    #[error("Crypto backend error: {0}")]
    Crypto(#[from] uqconn_crypto::Error),

    /// The session is in the terminal failed state.
    #[error("Session has failed and must not be reused")]
    SessionFailed,

    /// The operation is not valid in the session's current phase.
    #[error("Operation not valid in the current session phase")]
    InvalidState,

    /// Encoding produced an empty frame.
    #[error("Encoded command is empty")]
    EmptyFrame,

    /// The encoded command does not fit the u16 record length field.
    #[error("Encoded command of {0} bytes exceeds the record size limit")]
    FrameTooLarge(usize),
}
