//! The application command carried inside each record.
//!
//! A command is a small tagged structure: a one-byte type, a handful of
//! positional parameters, and a message of ordered header pairs plus a body.
//! All strings are opaque byte sequences; the engine never interprets them.

/// Maximum number of positional parameters (4-bit count on the wire).
pub const MAX_PARAMS: usize = 15;

/// Maximum number of header pairs (16-bit count on the wire).
pub const MAX_HEADERS: usize = 65535;

/// Message payload of a command: ordered header pairs and a raw body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Ordered (key, value) header pairs. Keys and values must not contain
    /// NUL bytes; the wire encoding is NUL-terminated.
    pub headers: Vec<(Vec<u8>, Vec<u8>)>,
    /// Raw body bytes, may contain anything.
    pub body: Vec<u8>,
}

/// One application command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    /// Command type tag.
    pub cmd_type: u8,
    /// Positional parameters, at most [`MAX_PARAMS`], NUL-free.
    pub params: Vec<Vec<u8>>,
    /// The message payload.
    pub message: Message,
}

impl Command {
    /// Create an empty command with the given type tag.
    pub fn new(cmd_type: u8) -> Self {
        Self {
            cmd_type,
            ..Self::default()
        }
    }
}
