//! Static file serving.
//!
//! # Responsibilities
//! - Resolve the request path below the static root (403 on escape)
//! - Check existence at serve time (404 for missing files and directories)
//! - Derive Content-Type from the extension table
//! - Stream the file without reading it into memory

use std::path::Path;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::config::StaticConfig;
use crate::error::RelayError;
use crate::security;

/// Fallback for extensions missing from [`MIME_TYPES`].
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Extension (lowercase, without dot) to Content-Type.
pub const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("js", "application/javascript"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("webp", "image/webp"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    ("ogg", "audio/ogg"),
    ("txt", "text/plain"),
    ("lrc", "text/plain"),
];

pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MIME;
    };
    let ext = ext.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

/// Serve `request_path` from the static root.
pub async fn serve_static(request_path: &str, config: &StaticConfig) -> Result<Response, RelayError> {
    let path = security::resolve(request_path, &config.root, &config.default_document)?;

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Err(RelayError::NotFound(path)),
    };

    let file = File::open(&path).await.map_err(|source| RelayError::FileRead {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), size = metadata.len(), "Serving static file");

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&path)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn site() -> (tempfile::TempDir, StaticConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("music.html"), "<html>player</html>").unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/style.CSS"), "body{}").unwrap();
        let config = StaticConfig {
            root: dir.path().to_path_buf(),
            default_document: "music.html".into(),
        };
        (dir, config)
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("a/music.html")), "text/html");
        assert_eq!(content_type_for(Path::new("song.MP3")), "audio/mpeg");
        assert_eq!(content_type_for(Path::new("archive.tar.gz")), DEFAULT_MIME);
        assert_eq!(content_type_for(Path::new("Makefile")), DEFAULT_MIME);
    }

    #[tokio::test]
    async fn test_serves_default_document() {
        let (_dir, config) = site();
        let response = serve_static("/", &config).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/html");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-cache");
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "19");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"<html>player</html>");
    }

    #[tokio::test]
    async fn test_nested_file_with_uppercase_extension() {
        let (_dir, config) = site();
        let response = serve_static("/css/style.CSS", &config).await.unwrap();
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "text/css");
    }

    #[tokio::test]
    async fn test_missing_file_and_directory_are_not_found() {
        let (_dir, config) = site();
        assert!(matches!(
            serve_static("/nope.js", &config).await,
            Err(RelayError::NotFound(_))
        ));
        assert!(matches!(
            serve_static("/css", &config).await,
            Err(RelayError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden_even_if_target_exists() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
        let root: PathBuf = outer.path().join("public");
        std::fs::create_dir(&root).unwrap();

        let config = StaticConfig {
            root,
            default_document: "music.html".into(),
        };
        assert!(matches!(
            serve_static("/../secret.txt", &config).await,
            Err(RelayError::Forbidden(_))
        ));
    }
}
