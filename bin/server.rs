// Expense Classifier - Web Server
// Single-page form + JSON API with Axum

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use clap::Parser;
use expense_classifier::{
    history, submit, train_default, AppConfig, Category, CategoryCount, CsvLedgerStore, Entry,
    Model, Report, Submission,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "classifier-server", version, about = "Expense classifier web server")]
struct Args {
    /// Directory holding the per-user ledger files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(long)]
    addr: Option<String>,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    model: Arc<Model>,
    store: Arc<CsvLedgerStore>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(data: T, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            error: Some(error.into()),
        }
    }
}

/// POST /api/classify body
#[derive(Deserialize)]
struct ClassifyRequest {
    user: String,
    /// Newline-separated messages
    messages: String,
}

/// Entry response (lowercase field names for the API)
#[derive(Serialize)]
struct EntryResponse {
    user: String,
    message: String,
    category: Category,
}

#[derive(Serialize)]
struct ReportResponse {
    key: String,
    added: usize,
    entries: Vec<EntryResponse>,
    frequencies: Vec<CategoryCount>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            user: entry.user,
            message: entry.message,
            category: entry.category,
        }
    }
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            key: report.key.to_string(),
            added: report.added,
            entries: report.entries.into_iter().map(|e| e.into()).collect(),
            frequencies: report.frequencies,
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/categories - The closed category set
async fn get_categories(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.model.categories().to_vec()))
}

/// POST /api/classify - Classify a batch and append it to the user's ledger
async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> impl IntoResponse {
    match submit(&state.model, &*state.store, &request.user, &request.messages) {
        Ok(Submission::Accepted(report)) => {
            info!(key = %report.key, added = report.added, "classified batch");
            (
                StatusCode::OK,
                Json(ApiResponse::ok(Some(ReportResponse::from(report)))),
            )
                .into_response()
        }
        Ok(Submission::Rejected(warning)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<ReportResponse>>::failed(None, warning.to_string())),
        )
            .into_response(),
        Err(e) => {
            error!(error = %format!("{:#}", e), "classification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Option<ReportResponse>>::failed(None, format!("{:#}", e))),
            )
                .into_response()
        }
    }
}

/// GET /api/ledger/:user - A user's saved ledger
async fn get_ledger(State(state): State<AppState>, Path(user): Path<String>) -> impl IntoResponse {
    // `Path` has already percent-decoded the segment
    match history(&*state.store, &user) {
        Ok(Some(report)) => (
            StatusCode::OK,
            Json(ApiResponse::ok(Some(ReportResponse::from(report)))),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<ReportResponse>>::failed(
                None,
                "Please enter your name to begin.",
            )),
        )
            .into_response(),
        Err(e) => {
            error!(user = %user, error = %format!("{:#}", e), "loading ledger failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Option<ReportResponse>>::failed(None, format!("{:#}", e))),
            )
                .into_response()
        }
    }
}

/// GET / - Serve the single-page form
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    if let Err(e) = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
    {
        eprintln!("tracing init failed: {}", e);
    }

    println!("🌐 Expense Classifier - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let args = Args::parse();
    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(addr) = args.addr {
        config.server_addr = addr;
    }

    // Train once; no model means nothing to serve
    let model = match train_default(&config.training) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("❌ Failed to train classifier: {}", e);
            std::process::exit(1);
        }
    };
    if !model.converged() {
        warn!("serving a model that did not converge");
    }
    println!("✓ Classifier trained ({} terms)", model.vocabulary_len());
    println!("✓ Ledgers stored in {:?}", config.data_dir);

    // Create shared state
    let state = AppState {
        model: Arc::new(model),
        store: Arc::new(CsvLedgerStore::new(&config.data_dir)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/categories", get(get_categories))
        .route("/classify", post(classify))
        .route("/ledger/:user", get(get_ledger))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("❌ Failed to bind to {}: {}", config.server_addr, e);
            std::process::exit(1);
        });

    println!("\n🚀 Server running on http://{}", config.server_addr);
    println!("   API: POST /api/classify, GET /api/ledger/:user");
    println!("\n   Press Ctrl+C to stop\n");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use expense_classifier::{LedgerStore, TrainingConfig, UserKey};

    fn state(dir: &std::path::Path) -> AppState {
        AppState {
            model: Arc::new(train_default(&TrainingConfig::default()).unwrap()),
            store: Arc::new(CsvLedgerStore::new(dir)),
        }
    }

    #[tokio::test]
    async fn test_ledger_user_is_used_as_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let key = UserKey::derive("100%25").unwrap();
        state
            .store
            .append(&key, vec![Entry::new("100%25", "rent paid", Category::Rent)])
            .unwrap();

        // What axum hands over after decoding "/api/ledger/100%2525"
        let response = get_ledger(State(state), Path("100%25".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["key"], "100%25");
        assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 1);
    }
}
