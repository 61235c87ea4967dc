//! Session key derivation.
//!
//! Turns the Diffie-Hellman shared secret and the server nonce into the four
//! directional session keys:
//! 1. `seed = secret || nonce`
//! 2. `mkey = MGF1-SHA256(seed, 48)`
//! 3. One HMAC-SHA256 per key, keyed by `mkey`, over a fixed ASCII label.
//!
//! The auth keys are full 32-byte HMAC outputs; the encryption keys are the
//! first 16 bytes of theirs (AES-128). All outputs are wrapped in `Zeroizing`
//! and owned by the session for its lifetime.

use crate::hash::{hmac_sha256, sha256, DIGEST_LEN};
use crate::Result;
use zeroize::Zeroizing;

/// Length of the MGF1-expanded master key.
pub const MASTER_KEY_LEN: usize = 48;

/// Length of each directional authentication key (full HMAC-SHA256 width).
pub const AUTH_KEY_LEN: usize = 32;

/// Length of each directional encryption key (AES-128).
pub const ENC_KEY_LEN: usize = 16;

const LABEL_CLIENT_AUTH: &[u8] = b"ClientAuth";
const LABEL_CLIENT_ENCR: &[u8] = b"ClientEncr";
const LABEL_SERVER_AUTH: &[u8] = b"ServerAuth";
const LABEL_SERVER_ENCR: &[u8] = b"ServerEncr";

/// The four directional session keys.
///
/// Immutable once derived; dropped (and zeroed) with the session.
pub struct SessionKeys {
    /// Authenticates client-to-server records and the client hello.
    pub client_auth: Zeroizing<[u8; AUTH_KEY_LEN]>,
    /// Encrypts client-to-server records.
    pub client_enc: Zeroizing<[u8; ENC_KEY_LEN]>,
    /// Authenticates server-to-client records.
    pub server_auth: Zeroizing<[u8; AUTH_KEY_LEN]>,
    /// Encrypts server-to-client records.
    pub server_enc: Zeroizing<[u8; ENC_KEY_LEN]>,
}

/// MGF1 with SHA-256 per PKCS#1: concatenate `SHA256(seed || BE32(counter))`
/// for counter = 0, 1, ... and truncate to `output_len`.
pub fn mgf1_sha256(seed: &[u8], output_len: usize) -> Zeroizing<Vec<u8>> {
    let mut output = Zeroizing::new(Vec::with_capacity(output_len + DIGEST_LEN));
    let mut counter: u32 = 0;
    while output.len() < output_len {
        let mut block = Zeroizing::new(Vec::with_capacity(seed.len() + 4));
        block.extend_from_slice(seed);
        block.extend_from_slice(&counter.to_be_bytes());
        output.extend_from_slice(&sha256(&block));
        counter += 1;
    }
    output.truncate(output_len);
    output
}

/// Derive the four session keys from the DH shared secret and server nonce.
pub fn derive_session_keys(secret: &[u8], nonce: &[u8]) -> Result<SessionKeys> {
    let mut seed = Zeroizing::new(Vec::with_capacity(secret.len() + nonce.len()));
    seed.extend_from_slice(secret);
    seed.extend_from_slice(nonce);

    let mkey = mgf1_sha256(&seed, MASTER_KEY_LEN);

    let client_auth = hmac_sha256(&mkey, LABEL_CLIENT_AUTH)?;
    let server_auth = hmac_sha256(&mkey, LABEL_SERVER_AUTH)?;

    let mut client_enc = [0u8; ENC_KEY_LEN];
    client_enc.copy_from_slice(&hmac_sha256(&mkey, LABEL_CLIENT_ENCR)?[..ENC_KEY_LEN]);
    let mut server_enc = [0u8; ENC_KEY_LEN];
    server_enc.copy_from_slice(&hmac_sha256(&mkey, LABEL_SERVER_ENCR)?[..ENC_KEY_LEN]);

    Ok(SessionKeys {
        client_auth: Zeroizing::new(client_auth),
        client_enc: Zeroizing::new(client_enc),
        server_auth: Zeroizing::new(server_auth),
        server_enc: Zeroizing::new(server_enc),
    })
}
