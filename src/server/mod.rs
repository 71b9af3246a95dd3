pub mod analysis;
pub mod api;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::services::TopMoversService;
use axum::{
    extract::FromRef,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub top_movers: Arc<TopMoversService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let top_movers = TopMoversService::new(config.data_dir.clone(), config.top_movers_ttl);
        Self {
            config: Arc::new(config),
            top_movers: Arc::new(top_movers),
            started_at: Utc::now(),
        }
    }
}

// FromRef implementations to extract specific state components
impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Arc<AppConfig> {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Arc<TopMoversService> {
    fn from_ref(app_state: &AppState) -> Arc<TopMoversService> {
        app_state.top_movers.clone()
    }
}

/// Run a synchronous pipeline on the blocking pool
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Io(format!("Worker task failed: {}", e)))?
}

/// Build the router with every route registered
///
/// Routes are served with and without the trailing slash the web client uses.
pub fn router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://localhost:5173"), // Vite dev server
            HeaderValue::from_static("http://127.0.0.1:5173"),
        ])
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health_handler))
        .route("/api/companies", get(api::list_companies_handler))
        .route("/api/companies/", get(api::list_companies_handler))
        .route("/api/companies/{symbol}", get(api::company_handler))
        .route("/api/companies/{symbol}/", get(api::company_handler))
        .route("/api/company/top", get(analysis::top_movers_handler))
        .route("/api/company/top/", get(analysis::top_movers_handler))
        .route("/api/nepse", get(api::nepse_handler))
        .route("/api/nepse/", get(api::nepse_handler))
        .route("/api/history/{symbol}", get(api::history_handler))
        .route("/api/history/{symbol}/", get(api::history_handler))
        .route("/api/announcement/{symbol}", get(api::announcement_handler))
        .route("/api/announcement/{symbol}/", get(api::announcement_handler))
        .route("/api/prediction/{symbol}", get(api::prediction_handler))
        .route("/api/prediction/{symbol}/", get(api::prediction_handler))
        .route("/api/{symbol}", get(api::chart_handler))
        .route("/api/{symbol}/", get(api::chart_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the axum server
pub async fn serve(config: AppConfig) -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting nepsechart server");
    tracing::info!(
        data_dir = %config.data_dir.display(),
        outputs_dir = %config.outputs_dir.display(),
        top_movers_ttl_secs = config.top_movers_ttl.as_secs(),
        "Loaded configuration"
    );

    let port = config.port;
    let app = router(AppState::new(config));

    tracing::info!("Registering routes:");
    tracing::info!("  GET /api/{{symbol}}/?limit=N");
    tracing::info!("  GET /api/history/{{symbol}}/");
    tracing::info!("  GET /api/company/top/");
    tracing::info!("  GET /api/nepse/");
    tracing::info!("  GET /api/announcement/{{symbol}}/");
    tracing::info!("  GET /api/prediction/{{symbol}}/");
    tracing::info!("  GET /api/companies/ and /api/companies/{{symbol}}/");
    tracing::info!("  GET /health");

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::fmt::Write as _;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    fn write_symbol(dir: &Path, symbol: &str, rows: usize) {
        let mut csv = String::from("Symbol,Date,Open,High,Low,Close,Volume,Percent Change\n");
        for i in 0..rows {
            let close = 100.0 + i as f64;
            let _ = writeln!(
                csv,
                "{},2024-02-{:02},{},{},{},{},1000,{:.2} %",
                symbol,
                i + 1,
                close,
                close + 1.0,
                close - 1.0,
                close,
                if i == 0 { 0.0 } else { 100.0 / (99.0 + i as f64) }
            );
        }
        fs::write(dir.join(format!("{}.csv", symbol)), csv).unwrap();
    }

    fn test_app() -> (TempDir, Router) {
        let dir = tempdir().unwrap();
        write_symbol(dir.path(), "NABIL", 25);
        fs::write(
            dir.path().join("company_info.json"),
            r#"[{"symbol": "NABIL", "name": "Nabil Bank"}]"#,
        )
        .unwrap();

        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            outputs_dir: dir.path().join("outputs"),
            top_movers_ttl: Duration::from_secs(60),
            port: 0,
        };
        (dir, router(AppState::new(config)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chart_route_with_limit() {
        let (_dir, app) = test_app();
        let (status, body) = get_json(app, "/api/nabil/?limit=5").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "NABIL");
        assert_eq!(body["chart"]["dates"].as_array().unwrap().len(), 5);
        assert_eq!(body["latest"]["close"], 124.0);
        assert_eq!(body["latest"]["prevClose"], 123.0);
    }

    #[tokio::test]
    async fn test_chart_route_ignores_bad_limit() {
        let (_dir, app) = test_app();
        let (status, body) = get_json(app, "/api/NABIL?limit=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chart"]["close"].as_array().unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_404() {
        let (_dir, app) = test_app();
        let (status, body) = get_json(app, "/api/NOPE/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Data for NOPE not found");
    }

    #[tokio::test]
    async fn test_encoded_traversal_is_rejected() {
        let root = tempdir().unwrap();
        let data_dir = root.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(
            root.path().join("SECRET.csv"),
            "Date,Open,High,Low,Close\n2024-01-01,1,2,1,2\n",
        )
        .unwrap();

        let config = AppConfig {
            outputs_dir: data_dir.join("outputs"),
            data_dir,
            top_movers_ttl: Duration::from_secs(60),
            port: 0,
        };
        let app = router(AppState::new(config));

        for uri in [
            "/api/..%2FSECRET/",
            "/api/history/..%2FSECRET/",
            "/api/announcement/..%2FSECRET/",
            "/api/prediction/..%2F..%2FSECRET/",
        ] {
            let (status, body) = get_json(app.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].as_str().unwrap().contains("Invalid symbol"));
        }
    }

    #[tokio::test]
    async fn test_history_route() {
        let (_dir, app) = test_app();
        let (status, body) = get_json(app, "/api/history/NABIL/").await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[0]["date"], "2024-02-25");
        assert_eq!(rows[0]["change"], 1.0);
        assert!(rows[24]["change"].is_null());
    }

    #[tokio::test]
    async fn test_top_movers_route() {
        let (_dir, app) = test_app();
        let (status, body) = get_json(app, "/api/company/top/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["top_gainers"][0]["symbol"], "NABIL");
        assert_eq!(body["top_gainers"][0]["change"], 1.0);
        assert_eq!(body["top_losers"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_company_routes() {
        let (_dir, app) = test_app();
        let (status, body) = get_json(app.clone(), "/api/companies/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Nabil Bank");

        let (status, _) = get_json(app.clone(), "/api/companies/nabil/").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = get_json(app, "/api/companies/XYZ/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_datasets_are_404() {
        let (_dir, app) = test_app();
        let (status, _) = get_json(app.clone(), "/api/nepse/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_json(app.clone(), "/api/prediction/NABIL/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get_json(app, "/api/announcement/NABIL/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_company_list_without_file_is_empty() {
        let (dir, app) = test_app();
        fs::remove_file(dir.path().join("company_info.json")).unwrap();

        let (status, body) = get_json(app.clone(), "/api/companies/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());

        let (status, _) = get_json(app, "/api/companies/NABIL/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_route() {
        let (_dir, app) = test_app();
        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["total_symbols"], 1);
    }
}
