//! Shared test support: a simulated server for driving the client handshake.
#![allow(dead_code)]

use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::{Pss, RsaPrivateKey};
use sha2::{Digest, Sha256};
use uqconn_core::session::{DH_PUB_KEY_LEN, NONCE_LEN, PROTOCOL_VERSION};
use uqconn_crypto::dh::DhKeyPair;
use uqconn_crypto::kdf::{derive_session_keys, SessionKeys};
use uqconn_crypto::pss::SALT_LEN;

// Small modulus keeps key generation fast; PSS with a 32-byte salt fits
// comfortably in the 128-byte encoding.
const TEST_KEY_BITS: usize = 1024;

/// The server side of the handshake, driven by hand from the tests.
pub struct SimulatedServer {
    private: RsaPrivateKey,
    pub rsa_der: Vec<u8>,
    keypair: DhKeyPair,
    pub nonce: [u8; NONCE_LEN],
}

impl SimulatedServer {
    pub fn new() -> Self {
        let private = RsaPrivateKey::new(&mut OsRng, TEST_KEY_BITS).unwrap();
        let rsa_der = private
            .to_public_key()
            .to_pkcs1_der()
            .unwrap()
            .as_bytes()
            .to_vec();
        let keypair = DhKeyPair::generate().unwrap();
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        Self {
            private,
            rsa_der,
            keypair,
            nonce,
        }
    }

    /// Build a valid server hello:
    /// `version || serverDHPub(256) || PSS(version || serverDHPub) || nonce`.
    pub fn server_hello(&self) -> Vec<u8> {
        let mut hello = vec![PROTOCOL_VERSION];
        let public = self.keypair.public_bytes();
        hello.resize(1 + DH_PUB_KEY_LEN - public.len(), 0);
        hello.extend_from_slice(&public);

        let digest = Sha256::digest(&hello);
        let signature = self
            .private
            .sign_with_rng(&mut OsRng, Pss::new_with_salt::<Sha256>(SALT_LEN), &digest)
            .unwrap();
        hello.extend_from_slice(&signature);
        hello.extend_from_slice(&self.nonce);
        hello
    }

    /// Derive the session keys the server would hold after reading the
    /// client hello.
    pub fn keys_for(&self, client_hello: &[u8]) -> SessionKeys {
        let client_pub = &client_hello[1..1 + DH_PUB_KEY_LEN];
        let secret = self.keypair.compute_secret(client_pub).unwrap();
        derive_session_keys(&secret, &self.nonce).unwrap()
    }
}
