//! SHA-256 and single-shot HMAC-SHA256.
//!
//! These two primitives carry all authentication in the protocol: the server
//! hello signature is verified over a SHA-256 digest, and every record (plus
//! the client hello) is tagged with a full-width HMAC-SHA256.

use crate::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// SHA-256 digest length in bytes.
pub const DIGEST_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LEN] {
    Sha256::digest(data).into()
}

/// Compute a single-shot HMAC-SHA256 tag over `message`.
///
/// # Example
/// ```
/// use uqconn_crypto::hash::hmac_sha256;
///
/// let tag = hmac_sha256(b"key", b"message").unwrap();
/// assert_eq!(tag.len(), 32);
/// ```
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; DIGEST_LEN]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| Error::Mac("HMAC-SHA256 rejected the key".into()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

/// Verify an HMAC-SHA256 tag in constant time.
///
/// Returns `Ok(false)` on mismatch, including a wrong-length `tag`; the
/// comparison itself does not leak where the tags differ.
pub fn hmac_sha256_verify(key: &[u8], message: &[u8], tag: &[u8]) -> Result<bool> {
    let computed = hmac_sha256(key, message)?;
    Ok(computed[..].ct_eq(tag).into())
}
