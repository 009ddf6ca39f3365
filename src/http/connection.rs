use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::router::Router;

const READ_CHUNK: usize = 1024;

/// Serves exactly one request on one stream, then closes it.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    router: Arc<Router>,
    peer: String,
    state: ConnectionState,
}

pub enum ConnectionState {
    Parsing,
    Routing(Request),
    Responding(ResponseWriter),
    Closed,
}

/// What reading from the socket produced.
enum ReadOutcome {
    Request(Request),
    Rejected(ParseError),
    Eof,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, peer: impl Into<String>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            router,
            peer: peer.into(),
            state: ConnectionState::Parsing,
        }
    }

    /// Drives the connection to `Closed`. The stream is shut down on every
    /// path, including errors; bytes the client sent after the first
    /// request are never read.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        let _ = self.stream.shutdown().await;
        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Parsing => match self.read_request().await? {
                    ReadOutcome::Request(req) => ConnectionState::Routing(req),
                    ReadOutcome::Rejected(err) => {
                        info!(peer = %self.peer, error = %err, status = 400, "Rejected request");
                        ConnectionState::Responding(ResponseWriter::new(Response::bad_request()))
                    }
                    ReadOutcome::Eof => ConnectionState::Closed,
                },

                ConnectionState::Routing(req) => {
                    let response = self.router.handle(&req).await;
                    info!(
                        peer = %self.peer,
                        method = %req.method,
                        path = %req.path,
                        status = response.status.as_u16(),
                        "Handled request"
                    );
                    ConnectionState::Responding(ResponseWriter::new(response))
                }

                ConnectionState::Responding(mut writer) => {
                    if let Err(e) = writer.write_to_stream(&mut self.stream).await {
                        warn!(peer = %self.peer, error = %e, "Failed to write response");
                        if writer.bytes_written() == 0 {
                            let mut fallback = ResponseWriter::new(Response::bad_request());
                            let _ = fallback.write_to_stream(&mut self.stream).await;
                        }
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, _consumed)) => return Ok(ReadOutcome::Request(request)),

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Ok(ReadOutcome::Rejected(e)),
            }

            let mut temp = [0u8; READ_CHUNK];
            let n = self.stream.read(&mut temp).await?;

            if n == 0 {
                if !self.buffer.is_empty() {
                    debug!(peer = %self.peer, buffered = self.buffer.len(), "Client closed mid-request");
                }
                return Ok(ReadOutcome::Eof);
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }
}
