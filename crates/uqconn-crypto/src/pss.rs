//! RSA-PSS/SHA-256 server signature verification.
//!
//! The server authenticates its hello by signing `version || server DH public
//! key` with RSASSA-PSS. The public key is pinned out-of-band and delivered to
//! the engine in PKCS#1 DER (`RSAPublicKey`) form. SHA-256 is both the message
//! hash and the MGF1 hash; the salt is 32 bytes.

use crate::{Error, Result};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPublicKey};
use sha2::{Digest, Sha256};

/// PSS salt length in bytes, fixed by the protocol.
pub const SALT_LEN: usize = 32;

/// A parsed RSA public key for PSS verification.
///
/// Parsing once up front keeps the unparseable-key failure separate from
/// signature failures, and makes the modulus size (the on-wire signature
/// length) available before any bytes are read.
pub struct PssPublicKey {
    key: RsaPublicKey,
}

impl PssPublicKey {
    /// Parse a PKCS#1 DER-encoded `RSAPublicKey`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPublicKey`] if the DER does not parse.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let key = RsaPublicKey::from_pkcs1_der(der)
            .map_err(|e| Error::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Modulus size in bytes; signatures are exactly this long on the wire.
    pub fn modulus_len(&self) -> usize {
        self.key.size()
    }

    /// Verify an RSASSA-PSS signature over `message`.
    ///
    /// Returns `false` for any verification failure; the caller decides what a
    /// failed signature means for the session.
    pub fn verify_pss_sha256(&self, message: &[u8], signature: &[u8]) -> bool {
        let digest = Sha256::digest(message);
        self.key
            .verify(Pss::new_with_salt::<Sha256>(SALT_LEN), &digest, signature)
            .is_ok()
    }
}
