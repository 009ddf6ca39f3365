//! MIME type detection based on file extensions.

use std::path::Path;

/// Served for any extension not in the table below.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type for a file name, judged by the text after its last `.`.
///
/// # Example
///
/// ```
/// # use docroot::http::mime::content_type_for_name;
/// assert_eq!(content_type_for_name("logo.PNG"), "image/png");
/// assert_eq!(content_type_for_name("notes.txt"), "application/octet-stream");
/// ```
pub fn content_type_for_name(name: &str) -> &'static str {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        "html" => "text/html",
        "jpg" => "image/jpg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

pub fn content_type_for(path: &Path) -> &'static str {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(content_type_for_name)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
