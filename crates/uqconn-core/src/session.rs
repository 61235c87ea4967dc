//! Session state machine: handshake, then the duplex record stream.
//!
//! A session is created awaiting the server hello, answers it with a client
//! hello, and from then on seals outbound commands and opens inbound records.
//! Any protocol error is terminal: the session moves to [`Phase::Failed`] and
//! every later call answers [`Error::SessionFailed`].
//!
//! Wire layouts (multi-byte integers little-endian unless noted):
//!
//! ```text
//! server hello: version(1) || serverDHPub(256) || rsaPssSig(modulus) || nonce(32)
//! client hello: version(1) || clientDHPub(256) || hmac(32)
//! record:       cmdLen(u16 LE) || ciphertext(cmdLen) || hmac(32)
//! ```
//!
//! The server signs `version || serverDHPub`; the client hello HMAC covers
//! `version || clientDHPub` keyed by the derived client auth key.
//!
//! The session does no I/O. The `bytes_to_read_for_*` hints give the
//! transport exact lengths for `read_exact`, so a cancelled read never leaves
//! a partially consumed record behind.

use crate::codec;
use crate::command::Command;
use crate::record::{RecordLayer, LEN_PREFIX, TAG_LEN};
use crate::{Error, Result};
use uqconn_crypto::{dh, hash, kdf, pss};

/// Protocol version this engine speaks.
pub const PROTOCOL_VERSION: u8 = 1;

/// Server nonce length in the server hello.
pub const NONCE_LEN: usize = 32;

/// On-wire Diffie-Hellman public key length (group 14 element).
pub const DH_PUB_KEY_LEN: usize = dh::PUB_KEY_LEN;

/// Protocol phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, handshake not yet run.
    AwaitingServerHello,
    /// Handshake complete, record stream active.
    Established,
    /// Terminal: a protocol error occurred. Sticky.
    Failed,
}

/// One connection's cryptographic context, handshake to termination.
///
/// A session is a mutable state machine (cipher counters, phase) and is not
/// internally synchronized; callers must serialize operations on it.
/// Independent sessions are unrelated and may run in parallel.
pub struct Session {
    keypair: dh::DhKeyPair,
    record: Option<RecordLayer>,
    phase: Phase,
}

impl Session {
    /// Create a session with a fresh Diffie-Hellman keypair, awaiting the
    /// server hello.
    pub fn new() -> Result<Self> {
        Ok(Self {
            keypair: dh::DhKeyPair::generate().map_err(Error::Crypto)?,
            record: None,
            phase: Phase::AwaitingServerHello,
        })
    }

    /// Current protocol phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the handshake has completed successfully.
    pub fn is_established(&self) -> bool {
        self.phase == Phase::Established
    }

    /// Exact size of the server hello for the given pinned RSA public key
    /// (PKCS#1 DER): version, DH public key, signature, nonce.
    ///
    /// # Errors
    ///
    /// [`Error::BadKey`] if the key does not parse.
    pub fn bytes_to_read_for_server_hello(rsa_der: &[u8]) -> Result<usize> {
        let key = parse_server_key(rsa_der)?;
        Ok(1 + DH_PUB_KEY_LEN + key.modulus_len() + NONCE_LEN)
    }

    /// Size of a record's length prefix.
    pub const fn bytes_to_read_for_record_length() -> usize {
        LEN_PREFIX
    }

    /// Remaining size of a record once its length prefix has been read.
    pub const fn bytes_to_read_for_next_record(cmd_len: u16) -> usize {
        cmd_len as usize + TAG_LEN
    }

    /// Process the server hello and produce the client hello to send back.
    ///
    /// Verifies the version byte and the RSA-PSS signature, computes the
    /// shared secret, derives the four session keys, and moves to
    /// [`Phase::Established`]. Any failure is terminal.
    ///
    /// # Errors
    ///
    /// [`Error::BadKey`], [`Error::MalformedFrame`], [`Error::ProtocolVersion`],
    /// [`Error::BadSignature`], or a crypto backend error; afterwards the
    /// session only answers [`Error::SessionFailed`].
    pub fn reply_to_server_hello(&mut self, buf: &[u8], rsa_der: &[u8]) -> Result<Vec<u8>> {
        match self.phase {
            Phase::AwaitingServerHello => {}
            Phase::Failed => return Err(Error::SessionFailed),
            Phase::Established => return Err(Error::InvalidState),
        }
        match self.process_server_hello(buf, rsa_der) {
            Ok(hello) => {
                self.phase = Phase::Established;
                Ok(hello)
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    fn process_server_hello(&mut self, buf: &[u8], rsa_der: &[u8]) -> Result<Vec<u8>> {
        let key = parse_server_key(rsa_der)?;
        let expected_len = 1 + DH_PUB_KEY_LEN + key.modulus_len() + NONCE_LEN;
        if buf.len() != expected_len {
            return Err(Error::MalformedFrame(format!(
                "server hello is {} bytes, expected {}",
                buf.len(),
                expected_len
            )));
        }

        let version = buf[0];
        if version != PROTOCOL_VERSION {
            return Err(Error::ProtocolVersion {
                expected: PROTOCOL_VERSION,
                actual: version,
            });
        }

        let signed = &buf[..1 + DH_PUB_KEY_LEN];
        let server_pub = &buf[1..1 + DH_PUB_KEY_LEN];
        let signature = &buf[1 + DH_PUB_KEY_LEN..expected_len - NONCE_LEN];
        let nonce = &buf[expected_len - NONCE_LEN..];

        if !key.verify_pss_sha256(signed, signature) {
            return Err(Error::BadSignature);
        }

        let secret = self.keypair.compute_secret(server_pub)?;
        let keys = kdf::derive_session_keys(&secret, nonce)?;
        let record = RecordLayer::new(keys);

        let mut hello = Vec::with_capacity(1 + DH_PUB_KEY_LEN + TAG_LEN);
        hello.push(PROTOCOL_VERSION);
        let public = self.keypair.public_bytes();
        // Left-zero-pad the public key to the fixed group element length.
        hello.resize(1 + DH_PUB_KEY_LEN - public.len(), 0);
        hello.extend_from_slice(&public);
        let tag = hash::hmac_sha256(record.client_auth_key(), &hello)?;
        hello.extend_from_slice(&tag);

        self.record = Some(record);
        Ok(hello)
    }

    /// Encode, encrypt, and frame an outbound command.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] before the handshake, [`Error::SessionFailed`]
    /// after a failure; codec and size errors are terminal.
    pub fn write_command(&mut self, cmd: &Command, compress: bool) -> Result<Vec<u8>> {
        self.check_established()?;
        match self.try_write_command(cmd, compress) {
            Ok(rec) => Ok(rec),
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    fn try_write_command(&mut self, cmd: &Command, compress: bool) -> Result<Vec<u8>> {
        let frame = codec::encode(cmd, compress)?;
        let record = self.record.as_mut().ok_or(Error::InvalidState)?;
        record.seal(frame)
    }

    /// Authenticate, decrypt, and decode an inbound record.
    ///
    /// `buf` is `ciphertext || tag`; its length comes from the record's own
    /// length prefix via [`Session::bytes_to_read_for_next_record`].
    ///
    /// # Errors
    ///
    /// [`Error::BadMac`] on a forged or corrupted record (decrypt counter
    /// untouched), codec errors on garbage plaintext; all terminal.
    pub fn read_record(&mut self, buf: &[u8]) -> Result<Command> {
        self.check_established()?;
        match self.try_read_record(buf) {
            Ok(cmd) => Ok(cmd),
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    fn try_read_record(&mut self, buf: &[u8]) -> Result<Command> {
        let record = self.record.as_mut().ok_or(Error::InvalidState)?;
        let plain = record.open(buf)?;
        codec::decode(&plain)
    }

    fn check_established(&self) -> Result<()> {
        match self.phase {
            Phase::Established => Ok(()),
            Phase::Failed => Err(Error::SessionFailed),
            Phase::AwaitingServerHello => Err(Error::InvalidState),
        }
    }
}

fn parse_server_key(rsa_der: &[u8]) -> Result<pss::PssPublicKey> {
    pss::PssPublicKey::from_pkcs1_der(rsa_der).map_err(|e| Error::BadKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_awaits_server_hello() {
        let session = Session::new().unwrap();
        assert_eq!(session.phase(), Phase::AwaitingServerHello);
        assert!(!session.is_established());
    }

    #[test]
    fn test_record_length_hints() {
        assert_eq!(Session::bytes_to_read_for_record_length(), 2);
        assert_eq!(Session::bytes_to_read_for_next_record(0), TAG_LEN);
        assert_eq!(Session::bytes_to_read_for_next_record(48), 48 + TAG_LEN);
    }

    #[test]
    fn test_bad_rsa_key_is_reported() {
        let result = Session::bytes_to_read_for_server_hello(&[0x01, 0x02]);
        assert!(matches!(result, Err(Error::BadKey(_))));
    }

    #[test]
    fn test_record_ops_invalid_before_handshake() {
        let mut session = Session::new().unwrap();

        let write = session.write_command(&Command::new(0x01), false);
        assert!(matches!(write, Err(Error::InvalidState)));

        let read = session.read_record(&[0u8; 64]);
        assert!(matches!(read, Err(Error::InvalidState)));

        // Misuse is not a protocol failure; the handshake is still possible.
        assert_eq!(session.phase(), Phase::AwaitingServerHello);
    }

    #[test]
    fn test_bad_key_during_handshake_is_terminal() {
        let mut session = Session::new().unwrap();
        let result = session.reply_to_server_hello(&[0u8; 64], &[0xFF; 4]);
        assert!(matches!(result, Err(Error::BadKey(_))));
        assert_eq!(session.phase(), Phase::Failed);

        // Sticky: every later call answers SessionFailed.
        assert!(matches!(
            session.reply_to_server_hello(&[0u8; 64], &[0xFF; 4]),
            Err(Error::SessionFailed)
        ));
        assert!(matches!(
            session.write_command(&Command::new(0x01), false),
            Err(Error::SessionFailed)
        ));
        assert!(matches!(
            session.read_record(&[0u8; 64]),
            Err(Error::SessionFailed)
        ));
    }
}
