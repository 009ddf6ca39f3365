use std::fmt;

/// HTTP request methods.
///
/// The server implements GET, POST, HEAD and TRACE. Anything else is kept
/// verbatim in `Other` and answered with 501 Not Implemented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit form parameters
    POST,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// TRACE - Echo the received request back
    TRACE,
    /// Any other token from the request line
    Other(String),
}

impl Method {
    /// Parses an HTTP method from a request-line token.
    ///
    /// Matching is case-sensitive, so `get` ends up as `Method::Other`.
    ///
    /// # Example
    ///
    /// ```
    /// # use docroot::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("PUT"), Method::Other("PUT".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "HEAD" => Method::HEAD,
            "TRACE" => Method::TRACE,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::HEAD => "HEAD",
            Method::TRACE => "TRACE",
            Method::Other(s) => s,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Method::Other(_))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered parameter map. Re-inserting a key replaces its value
/// in place, so the last write wins without moving the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Inserts every entry of `other`, overriding values on key collision.
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Request headers in the order they were received.
///
/// Names keep the case the client sent; lookups ignore case. A repeated
/// header is kept as a separate entry and lookups see the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Represents a parsed HTTP request from a client.
///
/// A `Request` is produced once by the parser and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target exactly as sent, query string included
    pub target: String,
    /// Decoded URL path with `/../` sequences removed
    pub path: String,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Parameters decoded from the query string
    pub query_params: Params,
    /// Parameters decoded from a POST body
    pub body_params: Params,
    /// Request headers
    pub headers: Headers,
    /// Value of the Content-Length header, 0 when absent
    pub content_length: usize,
    /// Client asked for a chunked response through the `Chunked: yes` header
    pub use_chunked_response: bool,
    /// Path ends in a known image extension
    pub is_image: bool,
}

impl Request {
    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Query parameters followed by body parameters; a body value wins
    /// over a query value with the same key.
    pub fn parameters(&self) -> Params {
        let mut params = self.query_params.clone();
        params.merge(&self.body_params);
        params
    }

    /// The request line as received, without the trailing CRLF.
    pub fn request_line(&self) -> String {
        format!("{} {} {}", self.method, self.target, self.version)
    }
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    query_params: Params,
    body_params: Params,
    headers: Headers,
    use_chunked_response: bool,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            query_params: Params::new(),
            body_params: Params::new(),
            headers: Headers::new(),
            use_chunked_response: false,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key, value);
        self
    }

    pub fn body_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body_params.insert(key, value);
        self
    }

    pub fn chunked(mut self, chunked: bool) -> Self {
        self.use_chunked_response = chunked;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let path = self.path.ok_or("path missing")?;
        let content_length = self
            .headers
            .get("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        Ok(Request {
            method: self.method.ok_or("method missing")?,
            target: path.clone(),
            is_image: crate::http::parser::is_image_path(&path),
            path,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            query_params: self.query_params,
            body_params: self.body_params,
            headers: self.headers,
            content_length,
            use_chunked_response: self.use_chunked_response,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
