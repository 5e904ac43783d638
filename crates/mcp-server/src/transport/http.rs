//! HTTP transport for MCP

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::protocol::RequestHandler;

/// Shared state for HTTP handlers
struct AppState {
    handler: Arc<RequestHandler>,
}

/// HTTP transport for MCP protocol
pub struct HttpTransport {
    handler: Arc<RequestHandler>,
    addr: SocketAddr,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(handler: Arc<RequestHandler>, addr: SocketAddr) -> Self {
        Self { handler, addr }
    }

    /// Build the router: `POST /mcp` plus health checks
    pub fn router(handler: Arc<RequestHandler>) -> Router {
        let state = Arc::new(AppState { handler });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(health))
            .route("/health", get(health))
            .route("/mcp", post(handle_mcp_request))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the HTTP server
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = Self::router(self.handler.clone());

        info!("Starting MCP HTTP server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// Handle a JSON-RPC payload (single or batch) via HTTP POST
///
/// The body is read raw so malformed JSON still gets a JSON-RPC parse error
/// instead of an HTTP rejection.
async fn handle_mcp_request(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    debug!("HTTP request: {} bytes", body.len());

    match state.handler.handle_payload(&body).await {
        Some(response) => ([(header::CONTENT_TYPE, "application/json")], response).into_response(),
        // Notifications only
        None => StatusCode::ACCEPTED.into_response(),
    }
}
