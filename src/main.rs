use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::env;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use pagesift::extraction::{run_extraction, unwrap_fenced_json, EngineConfig};
use pagesift::scraping::{self, BodyMode};
use pagesift::{formats, AppState, ErrorResponse, ExtractResponse, OutputFormat};

fn parse_port_from_args() -> Option<u16> {
    let mut args = std::env::args().peekable();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(v) = args.next() {
                if let Ok(p) = v.parse::<u16>() {
                    return Some(p);
                }
            }
        } else if let Some(rest) = a.strip_prefix("--port=") {
            if let Ok(p) = rest.parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

fn port_from_env() -> Option<u16> {
    for k in ["PAGESIFT_PORT", "PORT"] {
        if let Ok(v) = std::env::var(k) {
            if let Ok(p) = v.trim().parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting pagesift");

    // Create HTTP client. Only the connect phase is bounded by default — the
    // model calls run as long as they run, and callers guard the request with
    // their own timeout. HTTP_TIMEOUT_SECS opts into a total per-call cap.
    let connect_timeout = env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10);
    let mut client_builder = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(connect_timeout));
    if let Some(total_timeout) = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        client_builder = client_builder.timeout(std::time::Duration::from_secs(total_timeout));
    }
    let http_client = client_builder.build()?;

    // Create application state
    let state = Arc::new(AppState::new(http_client));

    if state.browser_pool.is_none() {
        warn!("no Chromium-family browser found — scrape/extract endpoints will fail until one is installed");
    }

    // Build router
    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/scrape/{format}/{*url}", get(scrape_handler))
        .route("/extract/{*url}", post(extract_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let port: u16 = parse_port_from_args().or_else(port_from_env).unwrap_or(8000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or run with --port {} (or set PORT/PAGESIFT_PORT).",
                bind_addr,
                port.saturating_add(1)
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("pagesift listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).ok();
        let mut sigint = signal(SignalKind::interrupt()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = sigterm {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
            _ = async {
                if let Some(ref mut s) = sigint {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    if let Some(pool) = state.browser_pool.as_ref() {
        pool.shutdown().await;
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "pagesift",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `GET /scrape/{format}/{url}` — fetch a page and serve its readable
/// content in the requested serialization.
async fn scrape_handler(
    State(state): State<Arc<AppState>>,
    Path((format, url)): Path<(String, String)>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let Some(format) = OutputFormat::parse_str(&format) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid format".to_string(),
            }),
        ));
    };

    let url = scraping::normalize_target_url(&url).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    info!("Scraping {} as {}", url, format.as_str());

    let content = match scraping::scrape_page(&state, &url, BodyMode::Readable).await {
        Ok(content) => content,
        Err(e) => {
            error!("Scrape error for {}: {}", url, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Error processing scrape".to_string(),
                }),
            ));
        }
    };

    match formats::render(&content, format) {
        Ok(body) => {
            let content_type = if format == OutputFormat::Json {
                "application/json"
            } else {
                "text/plain; charset=utf-8"
            };
            Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
        }
        Err(e) => {
            error!("Render error for {}: {}", url, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Error processing scrape".to_string(),
                }),
            ))
        }
    }
}

/// `POST /extract/{url}` — fetch a page and run the chunked extraction loop
/// with the schema supplied as the request body.
async fn extract_handler(
    State(state): State<Arc<AppState>>,
    Path(url): Path<String>,
    Json(schema): Json<serde_json::Value>,
) -> Result<Json<ExtractResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start_time = Instant::now();

    let url = scraping::normalize_target_url(&url).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    info!("Extracting fields from: {}", url);

    let internal_error = || {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Error processing scrape and extract".to_string(),
            }),
        )
    };

    // Full-document content: the schema may name fields outside the readable article.
    let page = scraping::scrape_page(&state, &url, BodyMode::Full)
        .await
        .map_err(|e| {
            error!("Extract fetch error for {}: {}", url, e);
            internal_error()
        })?;

    let source_text = formats::to_markdown(&page);
    let engine_config = EngineConfig::from_config(&state.config);

    let outcome = run_extraction(state.model.as_ref(), &source_text, &schema, &engine_config)
        .await
        .map_err(|e| {
            error!("Extract engine error for {}: {}", url, e);
            internal_error()
        })?;

    if !outcome.complete {
        warn!(
            "extraction for {} exhausted {} chunk(s) without a complete verdict",
            url, outcome.chunks_processed
        );
    }

    Ok(Json(ExtractResponse {
        result: unwrap_fenced_json(&outcome.result),
        complete: outcome.complete,
        chunks_processed: outcome.chunks_processed,
        model_calls: outcome.model_calls,
        duration_ms: start_time.elapsed().as_millis() as u64,
    }))
}
