use std::io;
use std::path::Path;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::DownloadError;

/// Streams `source_dir/source_file_name` back to the client as a forced
/// download saved under `display_file_name`.
///
/// Sets `Content-Length` to the exact size on disk and a
/// `Content-Disposition: attachment` header. A missing source file is a
/// [`DownloadError::NotFound`] (404); write errors after the response is
/// handed to the framework are not surfaced.
pub async fn download_static_file(
    source_dir: impl AsRef<Path>,
    source_file_name: &str,
    display_file_name: &str,
) -> Result<Response, DownloadError> {
    let path = source_dir.as_ref().join(source_file_name);

    let file = File::open(&path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DownloadError::NotFound,
        _ => DownloadError::Io(e),
    })?;
    let size = file.metadata().await?.len();

    debug!(path = %path.display(), size, display_file_name, "serving file download");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", display_file_name),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| DownloadError::Http(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = download_static_file(dir.path(), "absent.bin", "x.bin")
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::NotFound));
    }

    #[tokio::test]
    async fn sets_exact_length_and_disposition() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("image.png"), vec![0u8; 15980]).unwrap();

        let response = download_static_file(dir.path(), "image.png", "person.png")
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_LENGTH],
            HeaderValue::from_static("15980")
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            HeaderValue::from_static("attachment; filename=\"person.png\"")
        );
    }

    #[tokio::test]
    async fn control_characters_in_display_name_fail_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), b"x").unwrap();

        let err = download_static_file(dir.path(), "f", "a\nb")
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Http(_)));
    }
}
