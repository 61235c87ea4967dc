//! TCP client transport.
//!
//! Connects, performs the handshake, and then exchanges records. Every read
//! uses an exact length from the session's hints, so a cancelled or timed-out
//! read never leaves the record stream half-consumed. Log events carry sizes
//! and command types only, never key material or plaintext.

use crate::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info};
use uqconn_core::{Command, Session};

/// A connected, established client session over TCP.
pub struct TcpClient {
    stream: TcpStream,
    session: Session,
}

impl TcpClient {
    /// Connect to `addr` and run the handshake.
    ///
    /// `server_rsa_der` is the pinned server RSA public key in PKCS#1 DER
    /// form; it sizes the server hello read and authenticates its signature.
    pub async fn connect<A: ToSocketAddrs>(addr: A, server_rsa_der: &[u8]) -> Result<Self> {
        let hello_len = Session::bytes_to_read_for_server_hello(server_rsa_der)?;
        let mut stream = TcpStream::connect(addr).await?;
        let mut session = Session::new()?;

        let mut server_hello = vec![0u8; hello_len];
        stream.read_exact(&mut server_hello).await?;
        let client_hello = session.reply_to_server_hello(&server_hello, server_rsa_der)?;
        stream.write_all(&client_hello).await?;

        info!(server_hello_len = hello_len, "session established");
        Ok(Self { stream, session })
    }

    /// Encode, encrypt, and send one command.
    pub async fn send(&mut self, cmd: &Command, compress: bool) -> Result<()> {
        let record = self.session.write_command(cmd, compress)?;
        self.stream.write_all(&record).await?;
        debug!(
            cmd_type = cmd.cmd_type,
            record_len = record.len(),
            "record sent"
        );
        Ok(())
    }

    /// Receive, authenticate, and decode the next command.
    pub async fn recv(&mut self) -> Result<Command> {
        let mut len_buf = [0u8; Session::bytes_to_read_for_record_length()];
        self.stream.read_exact(&mut len_buf).await?;
        let cmd_len = u16::from_le_bytes(len_buf);

        let mut record = vec![0u8; Session::bytes_to_read_for_next_record(cmd_len)];
        self.stream.read_exact(&mut record).await?;

        let cmd = self.session.read_record(&record)?;
        debug!(
            cmd_type = cmd.cmd_type,
            record_len = record.len(),
            "record received"
        );
        Ok(cmd)
    }

    /// The underlying session, e.g. to inspect its phase.
    pub fn session(&self) -> &Session {
        &self.session
    }
}
