//! Finite-field Diffie-Hellman over RFC 3526 group 14.
//!
//! The handshake agrees on a shared secret with classic modular-exponentiation
//! Diffie-Hellman in the 2048-bit MODP group (generator 2). Group 14 is fixed
//! protocol-wide; both sides must use it for the wire layout to line up.
//!
//! Public keys and shared secrets are unsigned big-endian big-integer byte
//! strings with no leading-zero padding; the session layer pads the public key
//! to [`PUB_KEY_LEN`] bytes before it goes on the wire.

use crate::{Error, Result};
use num_bigint_dig::{BigUint, RandBigInt};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Group identifier shared with the peer (RFC 3526 2048-bit MODP group).
pub const GROUP_ID: u8 = 14;

/// Byte length of a group element, and of the public key on the wire.
pub const PUB_KEY_LEN: usize = 256;

/// RFC 3526 §3 prime for the 2048-bit MODP group, big-endian.
const MODP_2048_PRIME: [u8; PUB_KEY_LEN] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xc9, 0x0f, 0xda, 0xa2, 0x21, 0x68, 0xc2, 0x34,
    0xc4, 0xc6, 0x62, 0x8b, 0x80, 0xdc, 0x1c, 0xd1, 0x29, 0x02, 0x4e, 0x08, 0x8a, 0x67, 0xcc, 0x74,
    0x02, 0x0b, 0xbe, 0xa6, 0x3b, 0x13, 0x9b, 0x22, 0x51, 0x4a, 0x08, 0x79, 0x8e, 0x34, 0x04, 0xdd,
    0xef, 0x95, 0x19, 0xb3, 0xcd, 0x3a, 0x43, 0x1b, 0x30, 0x2b, 0x0a, 0x6d, 0xf2, 0x5f, 0x14, 0x37,
    0x4f, 0xe1, 0x35, 0x6d, 0x6d, 0x51, 0xc2, 0x45, 0xe4, 0x85, 0xb5, 0x76, 0x62, 0x5e, 0x7e, 0xc6,
    0xf4, 0x4c, 0x42, 0xe9, 0xa6, 0x37, 0xed, 0x6b, 0x0b, 0xff, 0x5c, 0xb6, 0xf4, 0x06, 0xb7, 0xed,
    0xee, 0x38, 0x6b, 0xfb, 0x5a, 0x89, 0x9f, 0xa5, 0xae, 0x9f, 0x24, 0x11, 0x7c, 0x4b, 0x1f, 0xe6,
    0x49, 0x28, 0x66, 0x51, 0xec, 0xe4, 0x5b, 0x3d, 0xc2, 0x00, 0x7c, 0xb8, 0xa1, 0x63, 0xbf, 0x05,
    0x98, 0xda, 0x48, 0x36, 0x1c, 0x55, 0xd3, 0x9a, 0x69, 0x16, 0x3f, 0xa8, 0xfd, 0x24, 0xcf, 0x5f,
    0x83, 0x65, 0x5d, 0x23, 0xdc, 0xa3, 0xad, 0x96, 0x1c, 0x62, 0xf3, 0x56, 0x20, 0x85, 0x52, 0xbb,
    0x9e, 0xd5, 0x29, 0x07, 0x70, 0x96, 0x96, 0x6d, 0x67, 0x0c, 0x35, 0x4e, 0x4a, 0xbc, 0x98, 0x04,
    0xf1, 0x74, 0x6c, 0x08, 0xca, 0x18, 0x21, 0x7c, 0x32, 0x90, 0x5e, 0x46, 0x2e, 0x36, 0xce, 0x3b,
    0xe3, 0x9e, 0x77, 0x2c, 0x18, 0x0e, 0x86, 0x03, 0x9b, 0x27, 0x83, 0xa2, 0xec, 0x07, 0xa2, 0x8f,
    0xb5, 0xc5, 0x5d, 0xf0, 0x6f, 0x4c, 0x52, 0xc9, 0xde, 0x2b, 0xcb, 0xf6, 0x95, 0x58, 0x17, 0x18,
    0x39, 0x95, 0x49, 0x7c, 0xea, 0x95, 0x6a, 0xe5, 0x15, 0xd2, 0x26, 0x18, 0x98, 0xfa, 0x05, 0x10,
    0x15, 0x72, 0x8e, 0x5a, 0x8a, 0xac, 0xaa, 0x68, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

fn group_prime() -> BigUint {
    BigUint::from_bytes_be(&MODP_2048_PRIME)
}

/// Diffie-Hellman keypair in group 14.
///
/// The private exponent lives only inside this value and is dropped with it.
pub struct DhKeyPair {
    private: BigUint,
    public: BigUint,
}

impl DhKeyPair {
    /// Generate a keypair with a uniformly random private exponent in
    /// `[2, p-2)`.
    ///
    /// # Errors
    ///
    /// Does not fail under normal circumstances; returns a `Result` for
    /// consistency with the other key-material constructors.
    pub fn generate() -> Result<Self> {
        let p = group_prime();
        let g = BigUint::from(2u32);
        let two = BigUint::from(2u32);

        let mut rng = OsRng;
        let private = rng.gen_biguint_range(&two, &(&p - &two));
        let public = g.modpow(&private, &p);

        Ok(Self { private, public })
    }

    /// The public key as unsigned big-endian bytes, unpadded.
    ///
    /// At most [`PUB_KEY_LEN`] bytes; shorter encodings are possible and the
    /// wire layer left-zero-pads them.
    pub fn public_bytes(&self) -> Vec<u8> {
        self.public.to_bytes_be()
    }

    /// Compute the shared secret with the peer's public key.
    ///
    /// `peer_public` is an unsigned big-endian group element (padded or not).
    /// The result is the unsigned big-endian secret, unpadded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] for an encoding longer than a group
    /// element, and [`Error::KeyExchange`] if the peer value is outside
    /// `(1, p-1)`, which covers the identity and order-2 elements an attacker
    /// could substitute to force a predictable secret.
    pub fn compute_secret(&self, peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if peer_public.len() > PUB_KEY_LEN {
            return Err(Error::InvalidLength {
                expected: PUB_KEY_LEN,
                actual: peer_public.len(),
            });
        }
        let p = group_prime();
        let peer = BigUint::from_bytes_be(peer_public);

        let one = BigUint::from(1u32);
        if peer <= one || peer >= &p - &one {
            return Err(Error::KeyExchange(
                "peer public key is not a valid group element".into(),
            ));
        }

        let secret = peer.modpow(&self.private, &p);
        Ok(Zeroizing::new(secret.to_bytes_be()))
    }
}
