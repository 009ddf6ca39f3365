//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 side of the server. Every connection
//! carries exactly one request and is closed once the response is out.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation, parameter and header maps
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes responses with fixed-length or chunked framing
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Parsing   │ ← Read until a full request is buffered
//!        └──────┬──────┘
//!               │ Request parsed        (malformed → 400 response)
//!               ▼
//!        ┌──────────────────┐
//!        │    Routing       │ ← Pick file / params page / TRACE / error
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Send head and body
//!        └──────┬───────────┘
//!               │ Always
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docroot::http::connection::Connection;
//! use docroot::router::Router;
//! use tokio::net::TcpListener;
//!
//! let router = Arc::new(Router::new(&cfg));
//! let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//! loop {
//!     let (socket, addr) = listener.accept().await?;
//!     let router = Arc::clone(&router);
//!     tokio::spawn(async move {
//!         let mut conn = Connection::new(socket, router, addr.to_string());
//!         if let Err(e) = conn.run().await {
//!             eprintln!("Connection error: {}", e);
//!         }
//!     });
//! }
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
