//! HTTP Server for the reconciliation API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/compare`    | Upload two datasets and reconcile    |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, CompareResponse};
use crate::config::ServerConfig;
use crate::error::{LoadError, PipelineError, ServerError, ServerResult};
use crate::models::ComparisonOptions;
use crate::reconcile::reconcile_bytes_limited;

type ApiError = (StatusCode, Json<Value>);

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(config.clone());

    eprintln!("🚀 csvreconcile server running on http://localhost:{}", config.port);
    eprintln!("   POST /api/compare - Upload left + right datasets");
    eprintln!("   GET  /api/logs    - SSE log stream");
    eprintln!("   GET  /health      - Health check");
    eprintln!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
pub fn router(config: ServerConfig) -> Router {
    // Permissive CORS for browser clients
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    // two files plus multipart overhead
    let body_limit = config.max_upload_bytes.saturating_mul(2).saturating_add(64 * 1024);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/compare", post(compare_upload))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(config)
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "csvreconcile",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "compare": "POST /api/compare",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // lagged receivers skip the dropped entries
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// One uploaded file.
struct Upload {
    name: Option<String>,
    bytes: Vec<u8>,
}

/// Compare endpoint: multipart `left`, `right` and optional `options`.
async fn compare_upload(
    State(config): State<ServerConfig>,
    mut multipart: Multipart,
) -> Result<Json<CompareResponse>, ApiError> {
    let mut left: Option<Upload> = None;
    let mut right: Option<Upload> = None;
    let mut options = ComparisonOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject(upload_error(e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(|s| s.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| reject(upload_error(e)))?;

        match name.as_str() {
            "left" => left = Some(Upload { name: file_name, bytes: bytes.to_vec() }),
            "right" => right = Some(Upload { name: file_name, bytes: bytes.to_vec() }),
            "options" => {
                let text = String::from_utf8_lossy(&bytes);
                options = ComparisonOptions::from_json(&text)
                    .map_err(|e| reject(PipelineError::from(e).into()))?;
            }
            _ => {}
        }
    }

    let left = left.ok_or_else(|| reject(ServerError::BadRequest("No left file provided".into())))?;
    let right = right.ok_or_else(|| reject(ServerError::BadRequest("No right file provided".into())))?;

    log_info(format!(
        "📄 New comparison: {} ({} bytes) vs {} ({} bytes)",
        left.name.as_deref().unwrap_or("left"),
        left.bytes.len(),
        right.name.as_deref().unwrap_or("right"),
        right.bytes.len()
    ));

    let limit = config.max_upload_bytes;
    let (left_bytes, right_bytes) = (left.bytes, right.bytes);
    let report = tokio::task::spawn_blocking(move || reconcile_bytes_limited(&left_bytes, &right_bytes, options, limit))
        .await
        .map_err(|e| reject(ServerError::Io(std::io::Error::other(e))))?
        .map_err(|e| reject(e.into()))?;

    Ok(Json(CompareResponse::from_report(report, left.name, right.name)))
}

/// Keeps the status axum assigns, e.g. 413 once the body limit is hit.
fn upload_error(err: MultipartError) -> ServerError {
    ServerError::Upload {
        status: err.status().as_u16(),
        message: err.body_text(),
    }
}

fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Upload { status, .. } => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
        ServerError::Pipeline(PipelineError::Left(e) | PipelineError::Right(e)) => match e {
            LoadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            LoadError::EmptyFile => StatusCode::BAD_REQUEST,
            LoadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ServerError::Pipeline(PipelineError::Options(_)) => StatusCode::BAD_REQUEST,
        ServerError::Config(_) | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ServerError) -> ApiError {
    log_error(err.to_string());
    (status_for(&err), Json(error_response(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptionsError;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "csvreconcile-test-boundary";

    struct Part<'a> {
        name: &'a str,
        file_name: Option<&'a str>,
        data: Vec<u8>,
    }

    fn file<'a>(name: &'a str, file_name: &'a str, data: impl Into<Vec<u8>>) -> Part<'a> {
        Part { name, file_name: Some(file_name), data: data.into() }
    }

    fn text<'a>(name: &'a str, data: &str) -> Part<'a> {
        Part { name, file_name: None, data: data.as_bytes().to_vec() }
    }

    fn multipart_request(parts: &[Part]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part.file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                        part.name, file_name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
                ),
            }
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/compare")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(config: ServerConfig, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let response = router(config).oneshot(multipart_request(parts)).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn small_limit() -> ServerConfig {
        ServerConfig {
            max_upload_bytes: 1000,
            ..ServerConfig::default()
        }
    }

    /// `n` bytes of valid dataset text.
    fn dataset_of_size(n: usize) -> Vec<u8> {
        let mut data = b"id,name\n".to_vec();
        while data.len() < n {
            data.extend_from_slice(b"1,a\n");
        }
        data.truncate(n);
        data
    }

    #[tokio::test]
    async fn test_compare_ready() {
        let (status, body) = send(
            ServerConfig::default(),
            &[
                file("left", "left.csv", "id,name\n1,Alice\n2,Bob"),
                file("right", "right.csv", "id,name\n2, BOB \n3,Carol"),
                text("note", "ignored"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["comparison"]["onlyInLeft"], json!(["id,name", "1,alice"]));
        assert_eq!(body["comparison"]["onlyInRight"], json!(["id,name", "3,carol"]));
        assert_eq!(body["difference"]["onlyInRight"], json!(["2, BOB ", "3,Carol"]));
        assert_eq!(body["metadata"]["left"]["fileName"], "left.csv");
        assert_eq!(body["metadata"]["right"]["rowCount"], 2);
    }

    #[tokio::test]
    async fn test_compare_options_field() {
        let (status, body) = send(
            ServerConfig::default(),
            &[
                text("options", r#"{"caseSensitive": true}"#),
                file("left", "l.csv", "id,name\n1,Bob"),
                file("right", "r.csv", "id,name\n1,bob"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["options"]["caseSensitive"], true);
        assert_eq!(body["comparison"]["onlyInLeft"], json!(["id,name", "1,Bob"]));
    }

    #[tokio::test]
    async fn test_compare_invalid_options() {
        let (status, body) = send(
            ServerConfig::default(),
            &[
                text("options", r#"{"caseSensitive": "yes"}"#),
                file("left", "l.csv", "a,b\n1,2"),
                file("right", "r.csv", "a,b\n1,2"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_compare_missing_side() {
        let (status, body) = send(ServerConfig::default(), &[file("left", "l.csv", "a,b\n1,2")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request: No right file provided");

        let (status, _) = send(ServerConfig::default(), &[file("right", "r.csv", "a,b\n1,2")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compare_empty_file() {
        let (status, _) = send(
            ServerConfig::default(),
            &[file("left", "l.csv", ""), file("right", "r.csv", "a,b\n1,2")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversize_file_within_body_limit() {
        let (status, body) = send(
            small_limit(),
            &[file("left", "l.csv", dataset_of_size(2000)), file("right", "r.csv", "id,name\n1,a")],
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_oversize_body() {
        let (status, body) = send(
            small_limit(),
            &[file("left", "l.csv", dataset_of_size(200_000)), file("right", "r.csv", "id,name\n1,a")],
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["status"], "error");
    }

    #[test]
    fn test_status_mapping() {
        let too_large: ServerError = PipelineError::Right(LoadError::TooLarge { size: 9, limit: 1 }).into();
        assert_eq!(status_for(&too_large), StatusCode::PAYLOAD_TOO_LARGE);

        let empty: ServerError = PipelineError::Left(LoadError::EmptyFile).into();
        assert_eq!(status_for(&empty), StatusCode::BAD_REQUEST);

        let options: ServerError = PipelineError::Options(OptionsError::Schema { errors: vec![] }).into();
        assert_eq!(status_for(&options), StatusCode::BAD_REQUEST);

        assert_eq!(status_for(&ServerError::Config("x".into())), StatusCode::INTERNAL_SERVER_ERROR);

        let upload = ServerError::Upload { status: 413, message: "limit".into() };
        assert_eq!(status_for(&upload), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_reject_body() {
        let (status, Json(body)) = reject(ServerError::BadRequest("No left file provided".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "csvreconcile");
    }
}
