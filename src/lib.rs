//! docroot - a minimal HTTP/1.1 static file server
//!
//! Each TCP connection carries exactly one request. Files are served from a
//! configured document root; `params_info.html` and TRACE are answered from
//! the request itself.

pub mod config;
pub mod http;
pub mod router;
pub mod server;
