use tokio::fs::File;

/// HTTP status codes the server answers with.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request, or a failed write
/// - `Forbidden` (403): Target resolves outside the document root
/// - `NotFound` (404): No regular file at the target
/// - `InternalServerError` (500): Unexpected failure while routing
/// - `NotImplemented` (501): Method other than GET, POST, HEAD or TRACE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use docroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// How the body is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `Content-Length` header, then the body verbatim
    Fixed,
    /// `Transfer-Encoding: chunked`, body split into hex-sized chunks
    Chunked,
}

/// Response payload.
#[derive(Debug)]
pub enum Body {
    /// No bytes follow the head
    Empty,
    /// Payload already in memory
    Bytes(Vec<u8>),
    /// An open file, streamed as raw bytes
    File { file: File, len: u64 },
}

impl Body {
    /// Number of payload bytes.
    pub fn len(&self) -> u64 {
        match self {
            Body::Empty => 0,
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Headers are kept in the order they are written to the wire.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers as ordered name/value pairs
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Body,
    /// Body framing
    pub framing: Framing,
}

impl Response {
    /// Looks up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Creates a 200 OK response carrying `body` with the given content type.
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .body(Body::Bytes(body.into()))
            .build()
    }

    /// Plain-text error response whose body is `"<code> <reason>"`.
    pub fn error(status: StatusCode) -> Self {
        let body = format!("{} {}", status.as_u16(), status.reason_phrase());
        ResponseBuilder::new(status)
            .header("Content-Type", "text/plain")
            .body(Body::Bytes(body.into_bytes()))
            .build()
    }

    pub fn bad_request() -> Self {
        Self::error(StatusCode::BadRequest)
    }

    pub fn forbidden() -> Self {
        Self::error(StatusCode::Forbidden)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NotFound)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::error(StatusCode::InternalServerError)
    }

    pub fn not_implemented() -> Self {
        Self::error(StatusCode::NotImplemented)
    }
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body(Body::Bytes(b"<p>hi</p>".to_vec()))
///     .chunked(true)
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Body,
    framing: Framing,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
            framing: Framing::Fixed,
        }
    }

    /// Adds a header, or replaces the value of one with the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Selects chunked framing when `chunked` is true, fixed-length otherwise.
    pub fn chunked(mut self, chunked: bool) -> Self {
        self.framing = if chunked { Framing::Chunked } else { Framing::Fixed };
        self
    }

    /// Builds the final Response.
    ///
    /// Fixed framing gets a Content-Length from the body size unless one was
    /// set explicitly. Chunked framing drops any Content-Length and puts
    /// `Transfer-Encoding: chunked` first.
    pub fn build(mut self) -> Response {
        match self.framing {
            Framing::Fixed => {
                let has_length = self
                    .headers
                    .iter()
                    .any(|(k, _)| k.eq_ignore_ascii_case("Content-Length"));
                if !has_length {
                    self.headers
                        .push(("Content-Length".to_string(), self.body.len().to_string()));
                }
            }
            Framing::Chunked => {
                self.headers.retain(|(k, _)| {
                    !k.eq_ignore_ascii_case("Content-Length")
                        && !k.eq_ignore_ascii_case("Transfer-Encoding")
                });
                self.headers
                    .insert(0, ("Transfer-Encoding".to_string(), "chunked".to_string()));
            }
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
            framing: self.framing,
        }
    }
}
