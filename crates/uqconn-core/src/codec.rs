//! Command codec: flag byte, meta header, optional Snappy, block padding.
//!
//! Wire layout of an encoded command (the record-layer plaintext):
//!
//! ```text
//! flag(1) || payload || padding        total length multiple of 16
//! ```
//!
//! `flag` bit 0 marks Snappy compression; bits 3..7 carry the padding length.
//! The payload (before compression) is:
//!
//! ```text
//! type(1) || (numParams & 0x0F) << 4 (1) || numHeaders BE16 (2)
//! param bytes || 0x00                      for each param, in order
//! key bytes || 0x00 || value bytes || 0x00 for each header, in order
//! body bytes                               no terminator
//! ```
//!
//! Compression covers everything after the flag byte, meta header included.

use crate::command::{Command, Message, MAX_HEADERS, MAX_PARAMS};
use crate::{Error, Result};

/// Flag bit marking a Snappy-compressed payload.
pub const CMDFLAG_COMPRESS: u8 = 0x01;

/// Cipher block length; encoded commands are padded to a multiple of this.
pub const BLK_LEN: usize = 16;

/// Padding length is stored in flag bits 3..7.
const PADDING_SHIFT: u8 = 3;

/// Fixed meta header size: type, param count nibble, header count.
const META_LEN: usize = 4;

/// Encode a command into a padded, optionally compressed frame.
///
/// The result is never empty and always a multiple of [`BLK_LEN`] bytes.
///
/// # Errors
///
/// [`Error::MalformedFrame`] if the command exceeds the wire limits
/// ([`MAX_PARAMS`], [`MAX_HEADERS`]) or a param/header contains a NUL byte,
/// which the NUL-terminated encoding cannot represent.
pub fn encode(cmd: &Command, compress: bool) -> Result<Vec<u8>> {
    if cmd.params.len() > MAX_PARAMS {
        return Err(Error::MalformedFrame(format!(
            "{} params exceed the limit of {}",
            cmd.params.len(),
            MAX_PARAMS
        )));
    }
    if cmd.message.headers.len() > MAX_HEADERS {
        return Err(Error::MalformedFrame(format!(
            "{} headers exceed the limit of {}",
            cmd.message.headers.len(),
            MAX_HEADERS
        )));
    }

    let mut payload = Vec::with_capacity(META_LEN + cmd.message.body.len());
    payload.push(cmd.cmd_type);
    payload.push(((cmd.params.len() as u8) & 0x0F) << 4);
    payload.extend_from_slice(&(cmd.message.headers.len() as u16).to_be_bytes());

    for param in &cmd.params {
        push_nul_terminated(&mut payload, param, "param")?;
    }
    for (key, value) in &cmd.message.headers {
        push_nul_terminated(&mut payload, key, "header key")?;
        push_nul_terminated(&mut payload, value, "header value")?;
    }
    payload.extend_from_slice(&cmd.message.body);

    let mut flag = 0u8;
    if compress {
        payload = snap::raw::Encoder::new()
            .compress_vec(&payload)
            .map_err(|e| Error::MalformedFrame(format!("compression failed: {e}")))?;
        flag |= CMDFLAG_COMPRESS;
    }

    let num_padding = (BLK_LEN - (1 + payload.len()) % BLK_LEN) % BLK_LEN;
    flag |= (num_padding as u8) << PADDING_SHIFT;

    let mut out = Vec::with_capacity(1 + payload.len() + num_padding);
    out.push(flag);
    out.extend_from_slice(&payload);
    out.resize(out.len() + num_padding, 0);
    Ok(out)
}

/// Decode a frame produced by [`encode`].
///
/// # Errors
///
/// [`Error::MalformedFrame`] if the padding length exceeds the content, the
/// meta header is truncated, or a NUL terminator is missing;
/// [`Error::Decompress`] if Snappy rejects a compressed payload.
pub fn decode(bytes: &[u8]) -> Result<Command> {
    let flag = *bytes
        .first()
        .ok_or_else(|| Error::MalformedFrame("empty frame".into()))?;
    let num_padding = (flag >> PADDING_SHIFT) as usize;
    if 1 + num_padding > bytes.len() {
        return Err(Error::MalformedFrame(format!(
            "padding of {} bytes exceeds frame of {}",
            num_padding,
            bytes.len()
        )));
    }
    let payload = &bytes[1..bytes.len() - num_padding];

    let decompressed;
    let payload: &[u8] = if flag & CMDFLAG_COMPRESS != 0 {
        decompressed = snap::raw::Decoder::new()
            .decompress_vec(payload)
            .map_err(|e| Error::Decompress(e.to_string()))?;
        &decompressed
    } else {
        payload
    };

    if payload.len() < META_LEN {
        return Err(Error::MalformedFrame(format!(
            "payload of {} bytes is shorter than the meta header",
            payload.len()
        )));
    }
    let cmd_type = payload[0];
    let num_params = (payload[1] >> 4) as usize;
    let num_headers = u16::from_be_bytes([payload[2], payload[3]]) as usize;

    let mut pos = META_LEN;
    let mut params = Vec::with_capacity(num_params);
    for _ in 0..num_params {
        params.push(take_nul_terminated(payload, &mut pos)?.to_vec());
    }
    let mut headers = Vec::with_capacity(num_headers);
    for _ in 0..num_headers {
        let key = take_nul_terminated(payload, &mut pos)?.to_vec();
        let value = take_nul_terminated(payload, &mut pos)?.to_vec();
        headers.push((key, value));
    }
    let body = payload[pos..].to_vec();

    Ok(Command {
        cmd_type,
        params,
        message: Message { headers, body },
    })
}

fn push_nul_terminated(payload: &mut Vec<u8>, value: &[u8], what: &str) -> Result<()> {
    if value.contains(&0) {
        return Err(Error::MalformedFrame(format!(
            "{what} contains a NUL byte"
        )));
    }
    payload.extend_from_slice(value);
    payload.push(0);
    Ok(())
}

fn take_nul_terminated<'a>(payload: &'a [u8], pos: &mut usize) -> Result<&'a [u8]> {
    let rest = &payload[*pos..];
    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::MalformedFrame("missing NUL terminator".into()))?;
    *pos += nul + 1;
    Ok(&rest[..nul])
}
