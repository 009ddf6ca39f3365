//! Request routing
//!
//! Maps a parsed request onto one action: serve a file from the document
//! root, list submitted parameters, echo a TRACE, or answer with an error.

pub mod pages;
pub mod target;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::File;

use crate::config::ServerConfig;
use crate::http::mime::content_type_for;
use crate::http::request::{Method, Request};
use crate::http::response::{Body, Response, ResponseBuilder, StatusCode};
use target::{ensure_contained, join_under_root};

/// File name answered from the submitted parameters instead of from disk.
pub const PARAMS_INFO_PAGE: &str = "params_info.html";

/// Read-only routing state shared by every connection.
#[derive(Debug, Clone)]
pub struct Router {
    /// Canonical document root
    root: PathBuf,
    default_page: String,
}

impl Router {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            root: config.document_root.clone(),
            default_page: config.default_page.clone(),
        }
    }

    /// Produces the response for `request`. Failures while routing become
    /// a 500 response; they never escape to the connection.
    pub async fn handle(&self, request: &Request) -> Response {
        match self.route(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    method = %request.method,
                    path = %request.path,
                    error = %format!("{e:#}"),
                    "Failed to handle request"
                );
                Response::internal_error()
            }
        }
    }

    async fn route(&self, request: &Request) -> Result<Response> {
        match request.method {
            Method::TRACE => Ok(pages::trace(request)),
            Method::GET | Method::POST | Method::HEAD => self.serve(request).await,
            Method::Other(_) => Ok(Response::not_implemented()),
        }
    }

    async fn serve(&self, request: &Request) -> Result<Response> {
        let Ok(mut target) = join_under_root(&self.root, &request.path) else {
            return Ok(Response::forbidden());
        };
        let Ok(mut resolved) = ensure_contained(&self.root, target.clone()).await else {
            return Ok(Response::forbidden());
        };

        let wants_body = request.method != Method::HEAD;

        if wants_body && target.file_name().is_some_and(|name| name == PARAMS_INFO_PAGE) {
            return Ok(pages::params_info(request));
        }

        if is_dir(&resolved).await {
            target.push(&self.default_page);
            let Ok(page) = ensure_contained(&self.root, target.clone()).await else {
                return Ok(Response::forbidden());
            };
            resolved = page;
        }

        let metadata = match tokio::fs::metadata(&resolved).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(Response::not_found()),
            Err(e) => {
                return match e.kind() {
                    io::ErrorKind::NotFound
                    | io::ErrorKind::NotADirectory
                    | io::ErrorKind::InvalidInput => Ok(Response::not_found()),
                    io::ErrorKind::PermissionDenied => Ok(Response::forbidden()),
                    _ => Err(e).with_context(|| format!("stat {}", resolved.display())),
                };
            }
        };

        let builder = ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type_for(&target));

        if !wants_body {
            return Ok(builder
                .header("Content-Length", metadata.len().to_string())
                .build());
        }

        let file = File::open(&resolved)
            .await
            .with_context(|| format!("open {}", resolved.display()))?;

        Ok(builder
            .body(Body::File {
                file,
                len: metadata.len(),
            })
            .chunked(request.use_chunked_response)
            .build())
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
