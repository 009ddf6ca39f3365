//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use docroot::config::ServerConfig;
use docroot::http::parser::parse_http_request;
use docroot::http::request::Request;
use docroot::http::response::Response;
use docroot::http::writer::ResponseWriter;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// A scratch document root removed on drop.
pub struct TempRoot {
    path: PathBuf,
}

impl TempRoot {
    pub fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "docroot-test-{}-{}",
            std::process::id(),
            id
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let file = self.path.join(rel);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, contents).unwrap();
        file
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let dir = self.path.join(rel);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn config(&self, max_threads: usize) -> ServerConfig {
        ServerConfig::from_yaml_str(&format!(
            "port: 8080\nmaxThreads: {}\nroot: \"{}\"\ndefaultPage: index.html\n",
            max_threads,
            self.path.display()
        ))
        .unwrap()
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Bytes with every value 0..=255 repeated, long enough to span several
/// chunks.
pub fn binary_fixture(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

pub fn request(raw: &str) -> Request {
    parse_http_request(raw.as_bytes()).unwrap().0
}

/// Serializes a response exactly as it would go on the wire.
pub async fn render(response: Response) -> Vec<u8> {
    let mut out = Vec::new();
    ResponseWriter::new(response)
        .write_to_stream(&mut out)
        .await
        .unwrap();
    out
}

/// A response read back from raw bytes.
#[derive(Debug)]
pub struct Parsed {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub raw_body: Vec<u8>,
}

impl Parsed {
    pub fn status(&self) -> u16 {
        self.status_line
            .split(' ')
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_chunked(&self) -> bool {
        self.header("Transfer-Encoding") == Some("chunked")
    }

    /// Body with chunk framing removed when present.
    pub fn body(&self) -> Vec<u8> {
        if self.is_chunked() {
            decode_chunked(&self.raw_body)
        } else {
            self.raw_body.clone()
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body()).unwrap()
    }
}

pub fn parse_response(bytes: &[u8]) -> Parsed {
    let split = bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response head terminator");
    let head = std::str::from_utf8(&bytes[..split]).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let headers = lines
        .map(|line| {
            let (k, v) = line.split_once(": ").unwrap();
            (k.to_string(), v.to_string())
        })
        .collect();

    Parsed {
        status_line,
        headers,
        raw_body: bytes[split + 4..].to_vec(),
    }
}

/// Reassembles a chunked body, asserting the framing is well formed and
/// ends with the zero-length chunk.
pub fn decode_chunked(mut raw: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        let line_end = raw
            .windows(2)
            .position(|w| w == b"\r\n")
            .expect("chunk size line");
        let size_text = std::str::from_utf8(&raw[..line_end]).unwrap();
        let size = usize::from_str_radix(size_text, 16).unwrap();
        raw = &raw[line_end + 2..];

        if size == 0 {
            assert_eq!(raw, b"\r\n", "terminal chunk must be followed by CRLF only");
            return body;
        }

        body.extend_from_slice(&raw[..size]);
        assert_eq!(&raw[size..size + 2], b"\r\n");
        raw = &raw[size + 2..];
    }
}
