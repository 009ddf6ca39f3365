use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Framing, Response};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Block size used when streaming bodies; also the largest chunk emitted.
pub const CHUNK_SIZE: usize = 1024;

const TERMINAL_CHUNK: &[u8] = b"0\r\n\r\n";

fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes one response: the serialized head, then the body in the framing
/// the response asks for.
pub struct ResponseWriter {
    head: Vec<u8>,
    body: Body,
    framing: Framing,
    written: u64,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        Self {
            head: serialize_head(&response),
            body: response.body,
            framing: response.framing,
            written: 0,
        }
    }

    /// Bytes handed to the stream so far, framing included.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let head = std::mem::take(&mut self.head);
        self.write_raw(stream, &head).await?;

        let body = std::mem::replace(&mut self.body, Body::Empty);
        match (self.framing, body) {
            (Framing::Fixed, Body::Empty) => {}
            (Framing::Fixed, Body::Bytes(bytes)) => self.write_raw(stream, &bytes).await?,
            // Never send more than the length already announced
            (Framing::Fixed, Body::File { file, len }) => {
                self.copy_from(stream, file.take(len)).await?
            }
            (Framing::Chunked, Body::Empty) => self.write_raw(stream, TERMINAL_CHUNK).await?,
            (Framing::Chunked, Body::Bytes(bytes)) => {
                for chunk in bytes.chunks(CHUNK_SIZE) {
                    self.write_chunk(stream, chunk).await?;
                }
                self.write_raw(stream, TERMINAL_CHUNK).await?;
            }
            (Framing::Chunked, Body::File { file, len }) => {
                self.write_chunked_from(stream, file.take(len)).await?;
                self.write_raw(stream, TERMINAL_CHUNK).await?;
            }
        }

        stream.flush().await?;
        Ok(())
    }

    async fn copy_from<W, R>(&mut self, stream: &mut W, mut source: R) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
        R: AsyncRead + Unpin,
    {
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = source.read(&mut buf).await?;
            if n == 0 {
                return Ok(());
            }
            self.write_raw(stream, &buf[..n]).await?;
        }
    }

    async fn write_chunked_from<W, R>(&mut self, stream: &mut W, mut source: R) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
        R: AsyncRead + Unpin,
    {
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = source.read(&mut buf).await?;
            if n == 0 {
                return Ok(());
            }
            self.write_chunk(stream, &buf[..n]).await?;
        }
    }

    /// `<size in hex>\r\n<data>\r\n`
    async fn write_chunk<W>(&mut self, stream: &mut W, data: &[u8]) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let size_line = format!("{:x}\r\n", data.len());
        self.write_raw(stream, size_line.as_bytes()).await?;
        self.write_raw(stream, data).await?;
        self.write_raw(stream, b"\r\n").await
    }

    async fn write_raw<W>(&mut self, stream: &mut W, mut data: &[u8]) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while !data.is_empty() {
            let n = stream.write(data).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n as u64;
            data = &data[n..];
        }

        Ok(())
    }
}
