use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

const BINARY_EXTENSION: &str = ".bin";

/// Serves every file below `directory`. Unknown paths yield `404 Not Found`.
pub fn router(directory: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(directory))
        .layer(middleware::from_fn(octet_stream_for_binaries))
        .layer(TraceLayer::new_for_http())
}

/// Binds `0.0.0.0:<port>` and serves `directory` until the process is terminated.
#[instrument(skip(directory), fields(directory = %directory.display()))]
pub async fn serve(directory: &Path, port: u16) -> Result<(), HostError> {
    if !directory.is_dir() {
        return Err(HostError::NotADirectory(directory.to_path_buf()));
    }

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| HostError::Bind { source, port })?;

    info!("📦 Serving firmware at http://0.0.0.0:{}/firmware.bin", port);
    info!("Use in SteVe: http://<YOUR_IP>:{}/firmware.bin", port);

    axum::serve(listener, router(directory)).await.map_err(HostError::Serve)
}

// Firmware must reach the charger's HTTP client as a raw byte stream.
async fn octet_stream_for_binaries(request: Request, next: Next) -> Response {
    let is_binary = request.uri().path().ends_with(BINARY_EXTENSION);

    let mut response = next.run(request).await;
    if is_binary && response.status().is_success() {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    }
    response
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("unable to bind port {port}: {source}")]
    Bind { source: io::Error, port: u16 },
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use std::env::temp_dir;
    use tokio::fs;
    use tower::ServiceExt;

    async fn firmware_directory(name: &str) -> io::Result<PathBuf> {
        let directory = temp_dir().join(name);
        fs::create_dir_all(directory.join("nested")).await?;
        fs::write(directory.join("firmware.bin"), [0x00, 0xE9, 0xFF, 0x10]).await?;
        fs::write(directory.join("nested").join("other.bin"), b"nested").await?;
        fs::write(directory.join("notes.txt"), b"release notes").await?;
        Ok(directory)
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let request = axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, content_type, body.to_vec())
    }

    #[tokio::test]
    async fn serves_firmware_as_an_octet_stream() -> io::Result<()> {
        let directory = firmware_directory("steve_ota_host_firmware").await?;

        let (status, content_type, body) = get(router(&directory), "/firmware.bin").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(body, vec![0x00, 0xE9, 0xFF, 0x10]);

        fs::remove_dir_all(directory).await
    }

    #[tokio::test]
    async fn serves_nested_files() -> io::Result<()> {
        let directory = firmware_directory("steve_ota_host_nested").await?;

        let (status, content_type, body) = get(router(&directory), "/nested/other.bin").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(body, b"nested".to_vec());

        fs::remove_dir_all(directory).await
    }

    #[tokio::test]
    async fn keeps_the_guessed_content_type_of_other_files() -> io::Result<()> {
        let directory = firmware_directory("steve_ota_host_text").await?;

        let (status, content_type, _) = get(router(&directory), "/notes.txt").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.is_some_and(|c| c.starts_with("text/plain")));

        fs::remove_dir_all(directory).await
    }

    #[tokio::test]
    async fn responds_not_found_for_unknown_files() -> io::Result<()> {
        let directory = firmware_directory("steve_ota_host_missing").await?;

        let (status, content_type, _) = get(router(&directory), "/missing.bin").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_ne!(content_type.as_deref(), Some("application/octet-stream"));

        fs::remove_dir_all(directory).await
    }

    #[tokio::test]
    async fn serve_rejects_a_missing_directory() {
        let result = serve(&temp_dir().join("steve_ota_host_does_not_exist"), 0).await;

        assert!(matches!(result, Err(HostError::NotADirectory(_))));
    }

    #[tokio::test]
    async fn serve_fails_when_the_port_is_taken() -> io::Result<()> {
        let taken = std::net::TcpListener::bind(("0.0.0.0", 0))?;
        let port = taken.local_addr()?.port();

        let result = serve(&temp_dir(), port).await;

        assert!(matches!(result, Err(HostError::Bind { port: p, .. }) if p == port));
        Ok(())
    }
}
