//! Responses synthesized from the request itself, without touching disk.

use crate::http::request::Request;
use crate::http::response::{Body, Response, ResponseBuilder, StatusCode};

/// Lists every submitted parameter, query first and then body, as an HTML
/// unordered list.
pub fn params_info(request: &Request) -> Response {
    let mut html = String::from("<html><body><h1>Submitted Parameters:</h1><ul>");

    for (key, value) in request.parameters().iter() {
        html.push_str("<li>");
        html.push_str(&escape_html(key));
        html.push_str(": ");
        html.push_str(&escape_html(value));
        html.push_str("</li>");
    }

    html.push_str("</ul></body></html>");

    ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/html")
        .body(Body::Bytes(html.into_bytes()))
        .chunked(request.use_chunked_response)
        .build()
}

/// Echoes the request line and every received header as `message/http`.
pub fn trace(request: &Request) -> Response {
    let mut echo = request.request_line();
    echo.push_str("\r\n");

    for (name, value) in request.headers.iter() {
        echo.push_str(name);
        echo.push_str(": ");
        echo.push_str(value);
        echo.push_str("\r\n");
    }
    echo.push_str("\r\n");

    ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "message/http")
        .body(Body::Bytes(echo.into_bytes()))
        .chunked(request.use_chunked_response)
        .build()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
