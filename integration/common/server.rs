use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;

async fn status_handler(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// Succeeds only when the probe sent the expected headers.
async fn require_headers_handler(headers: HeaderMap) -> StatusCode {
    let tests: Vec<_> = headers
        .get_all("x-test")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    let connection = headers.get("connection").and_then(|v| v.to_str().ok());

    if tests == ["abc", "def"]
        && authorization == Some("Bearer abc:def")
        && connection == Some("close")
    {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}

async fn submit_handler() -> StatusCode {
    StatusCode::CREATED
}

pub fn routes() -> Router {
    Router::new()
        .route("/status/:code", get(status_handler))
        .route("/require-headers", get(require_headers_handler))
        .route("/submit", post(submit_handler))
}

/// Starts the mock upstream on an ephemeral localhost port.
pub async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, routes())
            .await
            .expect("Mock server failed")
    });
    addr
}

/// A localhost port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Could not bind listener");
    listener.local_addr().expect("No local address").port()
}
