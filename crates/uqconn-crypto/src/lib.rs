//! Cryptographic primitives for the uqconn session protocol.
//!
//! This crate implements the cryptographic foundations the protocol engine
//! builds on:
//! - SHA-256 and single-shot HMAC-SHA256 (record and handshake authentication)
//! - AES-128-CTR with a little-endian 128-bit counter block (record encryption)
//! - Finite-field Diffie-Hellman over RFC 3526 group 14 (handshake key agreement)
//! - RSA-PSS/SHA-256 signature verification (server authentication)
//! - Session key derivation (MGF1-SHA256 expansion feeding HMAC labels)
//!
//! Security conventions:
//! - No unsafe code
//! - Derived secrets use `Zeroizing` wrappers
//! - Constant-time tag comparison via the `subtle` crate
//! - No logging of key material

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ctr;
pub mod dh;
pub mod error;
pub mod hash;
pub mod kdf;
pub mod pss;

pub use error::{Error, Result};
