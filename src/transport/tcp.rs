//! TCP connection to a GrowCube device.
//!
//! Reads are byte-at-a-time so that `0x00` padding between frames can be
//! dropped and the delimiter-less short frames can be recognized. Every
//! socket operation is bounded by the session's [`TimeoutBudget`].

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout_at;

use super::budget::TimeoutBudget;
use crate::codec::{self, Frame, DELIMITER};
use crate::error::{GrowcubeError, Result};

/// Padding byte the device sends between frames
pub const PADDING: u8 = 0x00;

/// Longest header token accepted before a delimiter
pub const MAX_TOKEN_LEN: usize = 16;

/// Upper bound for a graceful shutdown in [`Connection::close`], further
/// limited by the remaining budget
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// A framed connection to the device.
///
/// Generic over the underlying stream so the same code runs over TCP and
/// in-memory pipes.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    stream: Option<S>,
    peer: String,
}

impl Connection<TcpStream> {
    /// Open a TCP connection.
    ///
    /// The attempt is bounded by the smaller of `connect_timeout` and what is
    /// left of `budget`.
    pub async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        budget: &TimeoutBudget,
    ) -> Result<Self> {
        let peer = format!("{host}:{port}");
        tracing::debug!("Connecting to {}", peer);

        let deadline = budget.deadline_capped(connect_timeout);
        let stream = match timeout_at(deadline, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::error!("Connection error: {}. Connecting to: {}", e, peer);
                return Err(GrowcubeError::Connection(format!(
                    "failed to connect to {peer}: {e}"
                )));
            },
            Err(_) => {
                tracing::error!("Connection timed out connecting to: {}", peer);
                return Err(GrowcubeError::Connection(format!(
                    "timed out connecting to {peer}"
                )));
            },
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Could not set TCP_NODELAY on {}: {}", peer, e);
        }

        tracing::info!("Connected to {}", peer);
        Ok(Self::from_stream(stream, peer))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected stream.
    pub fn from_stream(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream: Some(stream),
            peer: peer.into(),
        }
    }

    /// Peer description used in logs.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Whether the connection has not been closed yet.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Write one frame.
    pub async fn send(&mut self, frame: &Frame, budget: &TimeoutBudget) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(not_open)?;
        let wire = frame.to_wire();
        tracing::info!(
            "SENDING {}: {}. {}",
            frame.message_type(),
            frame.content(),
            String::from_utf8_lossy(&wire)
        );

        let write = async {
            stream.write_all(&wire).await?;
            stream.flush().await
        };

        match timeout_at(budget.deadline(), write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(GrowcubeError::Connection(format!(
                "error sending {}: {e}",
                frame.message_type()
            ))),
            Err(_) => {
                tracing::warn!(
                    "Timed out sending {}. Timeout={:?}, elapsed={:?}",
                    frame.message_type(),
                    budget.limit(),
                    budget.elapsed()
                );
                Err(GrowcubeError::Timeout(format!(
                    "sending {} did not complete",
                    frame.message_type()
                )))
            },
        }
    }

    /// Read the next frame.
    ///
    /// Bytes read before a timeout or disconnect are discarded.
    pub async fn receive(&mut self, budget: &TimeoutBudget) -> Result<Frame> {
        let stream = self.stream.as_mut().ok_or_else(not_open)?;

        let type_token = read_token(stream, budget).await?;
        if codec::is_short_frame(&type_token) {
            let frame = codec::decode(&type_token)?;
            tracing::info!("RECEIVED {}", frame);
            return Ok(frame);
        }

        let type_text = std::str::from_utf8(&type_token).map_err(|_| {
            GrowcubeError::FrameFormat(format!("type token is not text: {:?}", type_token))
        })?;
        let code = codec::parse_type_token(type_text)?;
        if !codec::expects_content(code) {
            let frame = Frame::empty(code);
            tracing::info!("RECEIVED {}", frame);
            return Ok(frame);
        }

        let length_token = read_token(stream, budget).await?;
        let length_text = std::str::from_utf8(&length_token).map_err(|_| {
            GrowcubeError::FrameFormat(format!("length token is not text: {:?}", length_token))
        })?;
        let length = codec::parse_content_length(length_text)?;

        let mut body = read_exact(stream, length + 1, budget).await?;
        match body.pop() {
            Some(DELIMITER) => {},
            other => tracing::warn!(
                "Unexpected content at end of message. Expecting #, got {:?}",
                other.map(char::from)
            ),
        }

        let mut wire = Vec::with_capacity(type_token.len() + length_token.len() + body.len() + 3);
        wire.extend_from_slice(&type_token);
        wire.push(DELIMITER);
        wire.extend_from_slice(&length_token);
        wire.push(DELIMITER);
        wire.extend_from_slice(&body);
        wire.push(DELIMITER);

        let frame = codec::decode(&wire)?;
        tracing::info!("RECEIVED {}", frame);
        Ok(frame)
    }

    /// Shut the connection down. Safe to call more than once.
    ///
    /// The stream is released even if the budget is already exhausted.
    pub async fn close(&mut self, budget: &TimeoutBudget) {
        if let Some(mut stream) = self.stream.take() {
            match timeout_at(budget.deadline_capped(CLOSE_TIMEOUT), stream.shutdown()).await {
                Ok(Ok(())) => tracing::debug!("Closed connection to {}", self.peer),
                Ok(Err(e)) => tracing::debug!("Error closing connection to {}: {}", self.peer, e),
                Err(_) => tracing::debug!("Timed out closing connection to {}", self.peer),
            }
        }
    }
}

fn not_open() -> GrowcubeError {
    GrowcubeError::Connection("connection is not open".to_string())
}

/// Read up to the next frame boundary.
///
/// A boundary is either a `#` (not included in the token) or six
/// accumulated bytes starting with `ele5`. Padding bytes are skipped.
async fn read_token<S>(stream: &mut S, budget: &TimeoutBudget) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut data = Vec::with_capacity(MAX_TOKEN_LEN);
    loop {
        let byte = read_byte(stream, budget, &data).await?;
        if byte == DELIMITER {
            break;
        }
        if byte == PADDING {
            continue;
        }

        data.push(byte);
        if codec::is_short_frame(&data) {
            break;
        }
        if data.len() > MAX_TOKEN_LEN {
            return Err(GrowcubeError::FrameFormat(format!(
                "no delimiter within {} bytes: {:?}",
                MAX_TOKEN_LEN,
                String::from_utf8_lossy(&data)
            )));
        }
    }

    tracing::debug!("Read token {:?}", String::from_utf8_lossy(&data));
    Ok(data)
}

async fn read_byte<S>(stream: &mut S, budget: &TimeoutBudget, partial: &[u8]) -> Result<u8>
where
    S: AsyncRead + Unpin,
{
    if budget.is_exhausted() {
        return Err(timed_out(budget, partial));
    }

    let mut buf = [0u8; 1];
    match timeout_at(budget.deadline(), stream.read(&mut buf)).await {
        Ok(Ok(0)) => Err(GrowcubeError::Connection(
            "connection closed by device".to_string(),
        )),
        Ok(Ok(_)) => Ok(buf[0]),
        Ok(Err(e)) => Err(GrowcubeError::Connection(format!("error reading data: {e}"))),
        Err(_) => Err(timed_out(budget, partial)),
    }
}

async fn read_exact<S>(stream: &mut S, len: usize, budget: &TimeoutBudget) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    if budget.is_exhausted() {
        return Err(timed_out(budget, &[]));
    }

    let mut buf = vec![0u8; len];
    match timeout_at(budget.deadline(), stream.read_exact(&mut buf)).await {
        Ok(Ok(_)) => Ok(buf),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(
            GrowcubeError::Connection("connection closed by device mid-frame".to_string()),
        ),
        Ok(Err(e)) => Err(GrowcubeError::Connection(format!("error reading data: {e}"))),
        Err(_) => Err(timed_out(budget, &[])),
    }
}

fn timed_out(budget: &TimeoutBudget, partial: &[u8]) -> GrowcubeError {
    tracing::warn!(
        "Timed out waiting for data. Timeout={:?}, elapsed={:?}. Received: {:?}",
        budget.limit(),
        budget.elapsed(),
        String::from_utf8_lossy(partial)
    );
    GrowcubeError::Timeout(format!(
        "no complete frame within {:?}",
        budget.limit()
    ))
}
