//! Encrypt-then-MAC record layer.
//!
//! One record on the wire, either direction:
//!
//! ```text
//! cmdLen (u16 LE) || ciphertext (cmdLen bytes) || tag (32 bytes)
//! ```
//!
//! The tag is HMAC-SHA256 over `cmdLen || ciphertext`, keyed by the sender's
//! auth key. Ciphertext is the AES-128-CTR stream for that direction, so
//! records must be sealed and opened in transmission order.
//!
//! The layer holds no protocol phase: [`crate::session::Session`] wraps it
//! and adds the sticky failure state machine on top.

use crate::{Error, Result};
use uqconn_crypto::ctr::Aes128Ctr;
use uqconn_crypto::hash;
use uqconn_crypto::kdf::SessionKeys;
use zeroize::Zeroizing;

/// Record length prefix size on the wire.
pub const LEN_PREFIX: usize = 2;

/// Record authentication tag size (full HMAC-SHA256 output).
pub const TAG_LEN: usize = 32;

/// Directional record cipher/MAC state for one established session.
pub struct RecordLayer {
    keys: SessionKeys,
    enc_state: Aes128Ctr,
    dec_state: Aes128Ctr,
}

impl RecordLayer {
    /// Build the two directional cipher states from freshly derived keys.
    ///
    /// Both counters start at zero; they only ever advance on a successful
    /// seal or open.
    pub fn new(keys: SessionKeys) -> Self {
        let enc_state = Aes128Ctr::new(&keys.client_enc);
        let dec_state = Aes128Ctr::new(&keys.server_enc);
        Self {
            keys,
            enc_state,
            dec_state,
        }
    }

    /// Seal an outbound plaintext frame into a full record.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyFrame`] for an empty frame and [`Error::FrameTooLarge`]
    /// when the frame does not fit the u16 length field; in both cases the
    /// encrypt counter is untouched.
    pub fn seal(&mut self, mut frame: Vec<u8>) -> Result<Vec<u8>> {
        if frame.is_empty() {
            return Err(Error::EmptyFrame);
        }
        if frame.len() > u16::MAX as usize {
            return Err(Error::FrameTooLarge(frame.len()));
        }
        let cmd_len = frame.len() as u16;

        self.enc_state.xor(&mut frame);

        let mut record = Vec::with_capacity(LEN_PREFIX + frame.len() + TAG_LEN);
        record.extend_from_slice(&cmd_len.to_le_bytes());
        record.extend_from_slice(&frame);
        let tag = hash::hmac_sha256(&*self.keys.client_auth, &record)?;
        record.extend_from_slice(&tag);
        Ok(record)
    }

    /// Open an inbound `ciphertext || tag` buffer (the length prefix has
    /// already been consumed by the transport to size this read).
    ///
    /// The tag is checked first, in constant time; on [`Error::BadMac`] the
    /// decrypt counter is untouched, so an attacker cannot desynchronize the
    /// stream by injecting garbage.
    pub fn open(&mut self, buf: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if buf.len() <= TAG_LEN {
            return Err(Error::MalformedFrame(format!(
                "record of {} bytes has no room for a ciphertext and tag",
                buf.len()
            )));
        }
        let (ciphertext, tag) = buf.split_at(buf.len() - TAG_LEN);
        if ciphertext.len() > u16::MAX as usize {
            return Err(Error::MalformedFrame(format!(
                "ciphertext of {} bytes exceeds the u16 length field",
                ciphertext.len()
            )));
        }
        let cmd_len = ciphertext.len() as u16;

        let mut authed = Vec::with_capacity(LEN_PREFIX + ciphertext.len());
        authed.extend_from_slice(&cmd_len.to_le_bytes());
        authed.extend_from_slice(ciphertext);
        if !hash::hmac_sha256_verify(&*self.keys.server_auth, &authed, tag)? {
            return Err(Error::BadMac);
        }

        let mut plain = Zeroizing::new(ciphertext.to_vec());
        self.dec_state.xor(&mut plain);
        Ok(plain)
    }

    /// The client auth key, used once to tag the client hello.
    pub(crate) fn client_auth_key(&self) -> &[u8] {
        &self.keys.client_auth[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uqconn_crypto::kdf::derive_session_keys;

    /// Keys where both directions match, so one layer's output can be fed
    /// back into itself as inbound traffic.
    fn loopback_keys() -> SessionKeys {
        let keys = derive_session_keys(&[0x77u8; 256], &[0x88u8; 32]).unwrap();
        SessionKeys {
            client_auth: keys.server_auth.clone(),
            client_enc: keys.server_enc.clone(),
            server_auth: keys.server_auth,
            server_enc: keys.server_enc,
        }
    }

    fn frame(fill: u8) -> Vec<u8> {
        vec![fill; 32]
    }

    #[test]
    fn test_seal_layout() {
        let mut layer = RecordLayer::new(loopback_keys());
        let record = layer.seal(frame(0xAB)).unwrap();

        assert_eq!(record.len(), LEN_PREFIX + 32 + TAG_LEN);
        assert_eq!(u16::from_le_bytes([record[0], record[1]]), 32);
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let mut layer = RecordLayer::new(loopback_keys());
        let record = layer.seal(frame(0xAB)).unwrap();
        let plain = layer.open(&record[LEN_PREFIX..]).unwrap();
        assert_eq!(&*plain, &frame(0xAB));
    }

    /// Same keys and same (cmdLen, ciphertext) always produce the same tag.
    #[test]
    fn test_mac_determinism() {
        let mut a = RecordLayer::new(loopback_keys());
        let mut b = RecordLayer::new(loopback_keys());
        assert_eq!(a.seal(frame(0x01)).unwrap(), b.seal(frame(0x01)).unwrap());
    }

    #[test]
    fn test_empty_frame_rejected() {
        let mut layer = RecordLayer::new(loopback_keys());
        assert!(matches!(layer.seal(Vec::new()), Err(Error::EmptyFrame)));
    }

    #[test]
    fn test_oversized_frame_rejected_without_counter_advance() {
        let mut layer = RecordLayer::new(loopback_keys());
        let too_big = vec![0u8; u16::MAX as usize + 1];
        assert!(matches!(
            layer.seal(too_big),
            Err(Error::FrameTooLarge(_))
        ));

        // The rejected frame must not have consumed keystream.
        let mut fresh = RecordLayer::new(loopback_keys());
        assert_eq!(
            layer.seal(frame(0x05)).unwrap(),
            fresh.seal(frame(0x05)).unwrap()
        );
    }

    /// Flipping any bit in the ciphertext or the tag fails authentication,
    /// and the decrypt counter stays put: the untampered record still opens,
    /// and the record after it decrypts against the right keystream.
    #[test]
    fn test_tamper_detection_preserves_counter() {
        let mut sender = RecordLayer::new(loopback_keys());
        let first = sender.seal(frame(0x10)).unwrap();
        let second = sender.seal(frame(0x20)).unwrap();

        let mut receiver = RecordLayer::new(loopback_keys());

        let mut tampered_cipher = first[LEN_PREFIX..].to_vec();
        tampered_cipher[0] ^= 0x80;
        assert!(matches!(
            receiver.open(&tampered_cipher),
            Err(Error::BadMac)
        ));

        let mut tampered_tag = first[LEN_PREFIX..].to_vec();
        let last = tampered_tag.len() - 1;
        tampered_tag[last] ^= 0x01;
        assert!(matches!(receiver.open(&tampered_tag), Err(Error::BadMac)));

        // Counter unchanged: the original stream still opens in order.
        assert_eq!(
            &*receiver.open(&first[LEN_PREFIX..]).unwrap(),
            &frame(0x10)
        );
        assert_eq!(
            &*receiver.open(&second[LEN_PREFIX..]).unwrap(),
            &frame(0x20)
        );
    }

    #[test]
    fn test_records_continue_the_keystream() {
        let mut sender = RecordLayer::new(loopback_keys());
        let first = sender.seal(frame(0x00)).unwrap();
        let second = sender.seal(frame(0x00)).unwrap();

        // Identical plaintext, different keystream positions.
        assert_ne!(first[LEN_PREFIX..34], second[LEN_PREFIX..34]);

        let mut receiver = RecordLayer::new(loopback_keys());
        assert_eq!(&*receiver.open(&first[LEN_PREFIX..]).unwrap(), &frame(0x00));
        assert_eq!(
            &*receiver.open(&second[LEN_PREFIX..]).unwrap(),
            &frame(0x00)
        );
    }

    #[test]
    fn test_open_rejects_short_buffer() {
        let mut layer = RecordLayer::new(loopback_keys());
        assert!(matches!(
            layer.open(&[0u8; TAG_LEN]),
            Err(Error::MalformedFrame(_))
        ));
    }
}
