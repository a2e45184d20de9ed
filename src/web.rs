use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::{ConciergeConfig, ServerConfig};

/// Full application router: API under `/api`, optional static front end
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new().nest("/api", api::router(state));
    if let Some(static_dir) = &server.static_dir {
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
            .layer(cors),
    )
}

pub async fn run(config: ConciergeConfig) -> Result<()> {
    let state = AppState::from_config(&config).context("Failed to initialize services")?;
    if state.llm.is_none() {
        warn!("GROQ_API_KEY is not configured, itinerary requests will be answered with 503");
    }

    let app = app(state, &config.server);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;

    match (&config.server.tls_cert, &config.server.tls_key) {
        (Some(cert), Some(key)) => serve_tls(app, addr, cert, key).await,
        _ => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!("Web server running at http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Web server failed")
        }
    }
}

#[cfg(feature = "tls")]
async fn serve_tls(
    app: Router,
    addr: SocketAddr,
    cert: &std::path::Path,
    key: &std::path::Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    // Another component may already have installed a provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .context("Failed to load TLS certificate or key")?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
    });

    info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(
    _app: Router,
    _addr: SocketAddr,
    _cert: &std::path::Path,
    _key: &std::path::Path,
) -> Result<()> {
    anyhow::bail!("TLS certificate configured but the binary was built without the `tls` feature")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn test_app(max_body_bytes: usize) -> Router {
        let state = AppState::from_config(&ConciergeConfig::default()).unwrap();
        app(
            state,
            &ServerConfig {
                max_body_bytes,
                ..ServerConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let body = "x".repeat(2048);
        let request = Request::builder()
            .method("POST")
            .uri("/api/compile")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();

        let response = test_app(1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/compile")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = test_app(1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_unknown_path_without_static_dir() {
        let request = Request::builder()
            .uri("/index.html")
            .body(Body::empty())
            .unwrap();
        let response = test_app(1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
