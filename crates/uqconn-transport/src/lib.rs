//! Transport layer for the uqconn session protocol.
//!
//! The protocol engine in `uqconn-core` is a pure transform: it publishes
//! exact-length read hints and consumes/produces opaque buffers. This crate
//! supplies the byte-stream side: a tokio TCP client that runs the handshake
//! and then moves whole records with `read_exact`/`write_all`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpClient;
