use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use barangay_api_rust::config;
use barangay_api_rust::database::manager::DatabaseManager;
use barangay_api_rust::handlers::public;
use barangay_api_rust::middleware::{cookie_to_header_middleware, jwt_auth_middleware};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Barangay API in {:?} mode", config.environment);

    // Migrations need the database; a dev box without one can still serve
    // /health and report degraded.
    if let Err(e) = DatabaseManager::migrate().await {
        tracing::warn!("migrations not applied: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("BARANGAY_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Barangay API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app() -> Router {
    let config = config::config();

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .merge(auth_public_routes())
        // Public emergency filing
        .route("/emergency", post(public::emergency::create))
        // Protected API
        .merge(api_routes())
        // Stored uploads
        .nest_service("/media", ServeDir::new(&config.uploads.upload_dir))
        // Global middleware
        .layer(axum::middleware::from_fn(cookie_to_header_middleware))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
}

fn auth_public_routes() -> Router {
    use barangay_api_rust::handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

fn api_routes() -> Router {
    use barangay_api_rust::handlers::protected::{
        auth, blotter, certificates, complaints, emergency, permits, users,
    };

    Router::new()
        // Session
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/logout", post(auth::logout))
        // User administration
        .route("/api/users", get(users::list))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        // Blotter reports
        .route("/api/blotter", get(blotter::list).post(blotter::create))
        .route(
            "/api/blotter/:id",
            get(blotter::get).put(blotter::update).delete(blotter::delete),
        )
        // Certificate requests
        .route(
            "/api/certificates",
            get(certificates::list).post(certificates::create),
        )
        .route(
            "/api/certificates/:id",
            get(certificates::get)
                .put(certificates::update)
                .delete(certificates::delete),
        )
        // Business permits
        .route("/api/permits", get(permits::list).post(permits::create))
        .route(
            "/api/permits/:id",
            get(permits::get).put(permits::update).delete(permits::delete),
        )
        // Complaints
        .route(
            "/api/complaints",
            get(complaints::list).post(complaints::create),
        )
        .route("/api/complaints/all", get(complaints::list_all))
        .route(
            "/api/complaints/:id",
            get(complaints::get)
                .put(complaints::update)
                .delete(complaints::delete),
        )
        // Emergency reports (management; filing is public)
        .route("/api/emergency", get(emergency::list))
        .route(
            "/api/emergency/:id",
            get(emergency::get).put(emergency::update).delete(emergency::delete),
        )
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Credentials (cookies) rule out the permissive wildcard setup
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Barangay API (Rust)",
            "version": version,
            "description": "Barangay e-government backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "public_auth": "/auth/register, /auth/login, /auth/refresh (public - token acquisition)",
                "emergency_filing": "/emergency (public)",
                "auth": "/api/auth/* (protected - session management)",
                "users": "/api/users[/:id] (protected)",
                "blotter": "/api/blotter[/:id] (protected)",
                "certificates": "/api/certificates[/:id] (protected)",
                "permits": "/api/permits[/:id] (protected)",
                "complaints": "/api/complaints[/:id] (protected)",
                "emergency": "/api/emergency[/:id] (protected)",
                "media": "/media/* (public - stored uploads)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
