use docroot::http::parser::{
    MAX_BODY_BYTES, ParseError, clean_path, parse_http_request, parse_params,
};
use docroot::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.target, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert_eq!(parsed.content_length, 0);
    assert!(!parsed.use_chunked_response);
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_header_lookup_is_case_insensitive() {
    let req = b"GET / HTTP/1.1\r\nUser-Agent:   test-client  \r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("user-agent"), Some("test-client"));
    assert_eq!(parsed.header("USER-AGENT"), Some("test-client"));
}

#[test]
fn test_parse_header_value_may_contain_colons() {
    let req = b"GET / HTTP/1.1\r\nReferer: http://example.com:8080/a\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("referer"), Some("http://example.com:8080/a"));
}

#[test]
fn test_parse_query_string_is_split_from_path() {
    let req = b"GET /search?q=rust&lang=en HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/search");
    assert_eq!(parsed.target, "/search?q=rust&lang=en");
    assert_eq!(parsed.query_params.get("q"), Some("rust"));
    assert_eq!(parsed.query_params.get("lang"), Some("en"));
    assert!(parsed.body_params.is_empty());
}

#[test]
fn test_parse_query_values_are_decoded() {
    let req = b"GET /p?name=John+Doe&city=S%C3%A3o%20Paulo HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.query_params.get("name"), Some("John Doe"));
    assert_eq!(parsed.query_params.get("city"), Some("São Paulo"));
}

#[test]
fn test_parse_params_drops_pairs_without_exactly_one_equals() {
    let params = parse_params("a=1&flag&c=2=3&d=&=e");

    assert_eq!(params.get("a"), Some("1"));
    assert_eq!(params.get("flag"), None);
    assert_eq!(params.get("c"), None);
    assert_eq!(params.get("d"), Some(""));
    assert_eq!(params.get(""), Some("e"));
    assert_eq!(params.len(), 3);
}

#[test]
fn test_parse_params_last_write_wins() {
    let params = parse_params("a=1&b=2&a=3");

    assert_eq!(params.get("a"), Some("3"));
    let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn test_parse_post_request_with_body_params() {
    let req = b"POST /params_info.html HTTP/1.1\r\nContent-Length: 7\r\n\r\na=1&b=2";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.content_length, 7);
    assert_eq!(parsed.body_params.get("a"), Some("1"));
    assert_eq!(parsed.body_params.get("b"), Some("2"));
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_post_reads_exactly_content_length() {
    let req = b"POST /x HTTP/1.1\r\nContent-Length: 3\r\n\r\na=1&b=2";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body_params.get("a"), Some("1"));
    assert_eq!(parsed.body_params.get("b"), None);
    assert_eq!(consumed, req.len() - 4);
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";

    assert_eq!(parse_http_request(req).err(), Some(ParseError::Incomplete));
}

#[test]
fn test_parse_incomplete_request_partial_body() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";

    assert_eq!(parse_http_request(req).err(), Some(ParseError::Incomplete));
}

#[test]
fn test_parse_body_ignored_for_get() {
    let head = b"GET /api HTTP/1.1\r\nContent-Length: 10\r\n\r\n";
    let (parsed, consumed) = parse_http_request(head).unwrap();

    assert_eq!(parsed.content_length, 10);
    assert!(parsed.body_params.is_empty());
    assert_eq!(consumed, head.len());
}

#[test]
fn test_parse_invalid_content_length() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: ten\r\n\r\n";

    assert_eq!(
        parse_http_request(req).err(),
        Some(ParseError::InvalidContentLength)
    );
}

#[test]
fn test_parse_signed_content_length_is_rejected() {
    for value in ["+5", "-5", " ", "5 5"] {
        let req = format!("POST /api HTTP/1.1\r\nContent-Length: {}\r\n\r\nhello", value);
        assert_eq!(
            parse_http_request(req.as_bytes()).err(),
            Some(ParseError::InvalidContentLength),
            "Content-Length {:?}",
            value
        );
    }
}

#[test]
fn test_parse_oversized_body() {
    let req = format!(
        "POST /params_info.html HTTP/1.1\r\nContent-Length: {}\r\n\r\na=1",
        MAX_BODY_BYTES + 1
    );

    assert_eq!(
        parse_http_request(req.as_bytes()).err(),
        Some(ParseError::BodyTooLarge)
    );
}

#[test]
fn test_parse_body_at_limit_waits_for_more() {
    let req = format!(
        "POST /params_info.html HTTP/1.1\r\nContent-Length: {}\r\n\r\na=1",
        MAX_BODY_BYTES
    );

    assert_eq!(
        parse_http_request(req.as_bytes()).err(),
        Some(ParseError::Incomplete)
    );
}

#[test]
fn test_parse_malformed_request_line() {
    for line in ["GET /", "GET / HTTP/1.1 extra", "GARBAGE", "GET  / HTTP/1.1"] {
        let req = format!("{}\r\n\r\n", line);
        assert_eq!(
            parse_http_request(req.as_bytes()).err(),
            Some(ParseError::MalformedRequestLine),
            "request line {:?}",
            line
        );
    }
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n";

    assert_eq!(parse_http_request(req).err(), Some(ParseError::InvalidHeader));
}

#[test]
fn test_parse_oversized_head() {
    let mut req = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
    req.extend(std::iter::repeat_n(b'a', 70 * 1024));

    assert_eq!(parse_http_request(&req).err(), Some(ParseError::HeadersTooLarge));
}

#[test]
fn test_parse_other_methods_are_kept_verbatim() {
    for method in ["PUT", "DELETE", "OPTIONS", "PATCH", "get"] {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method);
        let (parsed, _) = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, Method::Other(method.to_string()));
    }
}

#[test]
fn test_parse_supported_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("HEAD", Method::HEAD),
        ("TRACE", Method::TRACE),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let (parsed, _) = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, expected_method);
    }
}

#[test]
fn test_parse_accepts_bare_lf_line_endings() {
    let req = b"GET /index.html HTTP/1.1\nHost: example.com\n\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/index.html");
    assert_eq!(parsed.header("host"), Some("example.com"));
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_removes_traversal_sequences() {
    let req = b"GET /a/../../etc/passwd HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/a/etc/passwd");
    assert!(!parsed.path.contains("/../"));
}

#[test]
fn test_parse_removes_encoded_traversal_sequences() {
    let req = b"GET /%2e%2e/%2E%2E/etc/passwd HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/etc/passwd");
}

#[test]
fn test_clean_path_leaves_trailing_parent_for_router() {
    assert_eq!(clean_path("/.."), "/..");
    assert_eq!(clean_path("/a/b"), "/a/b");
}

#[test]
fn test_parse_chunked_hint() {
    let (yes, _) = parse_http_request(b"GET / HTTP/1.1\r\nChunked: yes\r\n\r\n").unwrap();
    let (upper, _) = parse_http_request(b"GET / HTTP/1.1\r\nCHUNKED: YES\r\n\r\n").unwrap();
    let (no, _) = parse_http_request(b"GET / HTTP/1.1\r\nchunked: no\r\n\r\n").unwrap();

    assert!(yes.use_chunked_response);
    assert!(upper.use_chunked_response);
    assert!(!no.use_chunked_response);
}

#[test]
fn test_parse_standard_transfer_encoding_is_not_the_hint() {
    let req = b"GET / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert!(!parsed.use_chunked_response);
}

#[test]
fn test_parse_image_detection() {
    let (png, _) = parse_http_request(b"GET /img/Logo.PNG HTTP/1.1\r\n\r\n").unwrap();
    let (jpg, _) = parse_http_request(b"GET /a.jpg?size=2 HTTP/1.1\r\n\r\n").unwrap();
    let (html, _) = parse_http_request(b"GET /index.html HTTP/1.1\r\n\r\n").unwrap();

    assert!(png.is_image);
    assert!(jpg.is_image);
    assert!(!html.is_image);
}

#[test]
fn test_parse_headers_keep_arrival_order() {
    let req = b"GET / HTTP/1.1\r\nHost: a\r\nAccept: */*\r\nX-Trace: 1\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    let names: Vec<&str> = parsed.headers.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Host", "Accept", "X-Trace"]);
}
