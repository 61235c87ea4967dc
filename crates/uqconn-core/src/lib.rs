//! Core protocol engine for the uqconn secure messaging client.
//!
//! Implements the wire-level cryptographic session protocol:
//! - Command codec: compact framing with optional Snappy compression and
//!   block padding
//! - Record layer: AES-128-CTR encrypt-then-MAC with HMAC-SHA256
//! - Session state machine: Diffie-Hellman + RSA-PSS handshake, then a duplex
//!   record stream with one-time directional keying material
//!
//! The engine performs no I/O: every operation is a synchronous transform on
//! caller-supplied buffers, and the session publishes exact-length read hints
//! so a transport can feed it with `read_exact`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod command;
pub mod error;
pub mod record;
pub mod session;

pub use command::{Command, Message};
pub use error::{Error, Result};
pub use session::{Phase, Session};
