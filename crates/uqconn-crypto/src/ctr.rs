//! AES-128-CTR keystream with a little-endian counter block.
//!
//! The protocol runs AES-128 in counter mode with the entire 16-byte counter
//! block treated as a 128-bit **little-endian** integer, starting from zero.
//! This matches the peer; a big-endian counter interoperates for the first
//! block only and silently diverges afterwards.
//!
//! One `Aes128Ctr` value is one directional keystream: the counter and the
//! position inside the current block persist across calls, so consecutive
//! records continue the stream exactly where the previous one stopped.

use aes::Aes128;
use ctr::cipher::generic_array::GenericArray;
use ctr::cipher::{KeyIvInit, StreamCipher};

/// AES-128 key length in bytes.
pub const KEY_LEN: usize = 16;

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

type Inner = ctr::Ctr128LE<Aes128>;

/// One direction's AES-128-CTR keystream state.
///
/// Encryption and decryption are the same XOR; `Clone` snapshots the counter
/// position, so a copy replays the keystream from the same point.
///
/// # Example
/// ```
/// use uqconn_crypto::ctr::Aes128Ctr;
///
/// let mut enc = Aes128Ctr::new(&[0x42; 16]);
/// let mut dec = enc.clone();
///
/// let mut buf = *b"sixteen byte msg";
/// enc.xor(&mut buf);
/// dec.xor(&mut buf);
/// assert_eq!(&buf, b"sixteen byte msg");
/// ```
#[derive(Clone)]
pub struct Aes128Ctr {
    inner: Inner,
}

impl Aes128Ctr {
    /// Create a fresh keystream for `key` with the counter block at zero.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let iv = [0u8; BLOCK_LEN];
        Self {
            inner: Inner::new(
                GenericArray::from_slice(key),
                GenericArray::from_slice(&iv),
            ),
        }
    }

    /// XOR the next keystream bytes into `buf` in place.
    ///
    /// The counter advances by exactly `buf.len()` keystream bytes; partial
    /// blocks carry over into the next call.
    pub fn xor(&mut self, buf: &mut [u8]) {
        self.inner.apply_keystream(buf);
    }
}
