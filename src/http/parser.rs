use crate::http::request::{Headers, Method, Params, Request};
use percent_encoding::percent_decode_str;

/// Custom protocol extension: a client sending `Chunked: yes` asks for the
/// response body in chunked transfer-encoding. This is not a standard HTTP
/// header and has no effect on how the request itself is framed.
pub const CHUNKED_HINT_HEADER: &str = "chunked";

/// Largest request head (request line plus headers) accepted.
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Largest POST body accepted.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".bmp", ".gif", ".png"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("request is incomplete")]
    Incomplete,
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("malformed header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("request head is too large")]
    HeadersTooLarge,
    #[error("request body is too large")]
    BodyTooLarge,
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
}

/// Parses one request from the start of `buf`.
///
/// Returns the request and the number of bytes it occupied. While the head
/// (or, for a POST, the body) is not fully buffered yet the result is
/// `ParseError::Incomplete` and the caller should read more.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let (head_len, body_start) = match find_headers_end(buf) {
        Some(found) => found,
        None if buf.len() > MAX_HEADER_BYTES => return Err(ParseError::HeadersTooLarge),
        None => return Err(ParseError::Incomplete),
    };

    if head_len > MAX_HEADER_BYTES {
        return Err(ParseError::HeadersTooLarge);
    }

    let head = std::str::from_utf8(&buf[..head_len]).map_err(|_| ParseError::InvalidEncoding)?;
    let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    // Request line
    let request_line = lines.next().ok_or(ParseError::MalformedRequestLine)?;
    let (method, target, version) = parse_request_line(request_line)?;

    let (raw_path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };
    let path = clean_path(&decode_path(raw_path));
    let query_params = query.map(parse_params).unwrap_or_default();

    // Headers
    let mut headers = Headers::new();
    let mut content_length = 0;
    let mut use_chunked_response = false;

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() {
            return Err(ParseError::InvalidHeader);
        }

        if key.eq_ignore_ascii_case("content-length") {
            content_length = parse_content_length(value)?;
        } else if key.eq_ignore_ascii_case(CHUNKED_HINT_HEADER) {
            use_chunked_response = value.eq_ignore_ascii_case("yes");
        }

        headers.insert(key, value);
    }

    // Body, only ever read for POST
    let mut consumed = body_start;
    let mut body_params = Params::new();

    if method == Method::POST && content_length > 0 {
        if content_length > MAX_BODY_BYTES {
            return Err(ParseError::BodyTooLarge);
        }

        let available = &buf[body_start..];
        if available.len() < content_length {
            return Err(ParseError::Incomplete);
        }

        let body = String::from_utf8_lossy(&available[..content_length]);
        body_params = parse_params(&body);
        consumed += content_length;
    }

    let request = Request {
        method,
        target: target.to_string(),
        is_image: is_image_path(&path),
        path,
        version: version.to_string(),
        query_params,
        body_params,
        headers,
        content_length,
        use_chunked_response,
    };

    Ok((request, consumed))
}

/// Splits `METHOD SP TARGET SP VERSION`. Anything other than exactly three
/// non-empty tokens is rejected.
fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    let mut parts = line.split(' ');

    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version), None)
            if !method.is_empty() && !target.is_empty() && !version.is_empty() =>
        {
            Ok((Method::parse(method), target, version))
        }
        _ => Err(ParseError::MalformedRequestLine),
    }
}

/// Digits only; `usize::from_str` alone would also take a leading `+`.
fn parse_content_length(value: &str) -> Result<usize, ParseError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidContentLength);
    }
    value.parse().map_err(|_| ParseError::InvalidContentLength)
}

/// Returns `(head_len, body_start)`: the head is `buf[..head_len]` and the
/// body begins at `body_start`. Accepts CRLF as well as bare LF.
fn find_headers_end(buf: &[u8]) -> Option<(usize, usize)> {
    buf.iter().enumerate().find_map(|(i, b)| {
        if *b != b'\n' {
            return None;
        }
        let rest = &buf[i + 1..];
        if rest.starts_with(b"\r\n") {
            Some((i, i + 3))
        } else if rest.starts_with(b"\n") {
            Some((i, i + 2))
        } else {
            None
        }
    })
}

/// Strips every literal `/../` until none is left.
///
/// This is only a cheap first filter. It does not resolve a trailing `/..`
/// or symlinks, so the router still checks containment against the
/// document root before touching the filesystem.
pub fn clean_path(path: &str) -> String {
    let mut cleaned = path.to_string();
    while cleaned.contains("/../") {
        cleaned = cleaned.replace("/../", "/");
    }
    cleaned
}

fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Decodes `key=value&key=value` form data.
///
/// Keys and values are percent-decoded with `+` read as a space. A pair
/// without exactly one `=` is dropped; a repeated key keeps the last value.
pub fn parse_params(input: &str) -> Params {
    let mut params = Params::new();

    for pair in input.split('&') {
        let mut kv = pair.split('=');
        if let (Some(key), Some(value), None) = (kv.next(), kv.next(), kv.next()) {
            params.insert(decode_form_component(key), decode_form_component(value));
        }
    }

    params
}

fn decode_form_component(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_decode_str(&s).decode_utf8_lossy().into_owned()
}

/// Case-insensitive suffix match against the image extensions.
pub fn is_image_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
