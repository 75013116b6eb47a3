//! Atelier Server
//!
//! Backend for the atelier brochure site - serves the static frontend and a
//! small API that accepts contact-form submissions and exposes them to the
//! admin dashboard.

mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use atelier_core::Storage;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use services::AuthService;
use storage::{MemoryStorage, PgStorage};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub auth_service: Arc<AuthService>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Atelier Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    // Load configuration
    let config = load_config().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, static_dir={}",
        config.bind_address, config.static_dir
    );

    // Select the storage backend. This is the only place that knows which
    // implementation is running; everything downstream sees the trait.
    let storage: Arc<dyn Storage> = match &config.database_url {
        Some(url) => {
            info!("Initializing PostgreSQL storage...");
            Arc::new(
                PgStorage::connect(url)
                    .await
                    .context("Failed to initialize PostgreSQL storage")?,
            )
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            Arc::new(MemoryStorage::new())
        }
    };

    // Initialize services
    let auth_service = Arc::new(AuthService::new(storage.clone(), config.jwt_secret.clone()));

    // Create app state
    let state = AppState {
        storage,
        auth_service,
    };

    // Build router
    info!("Building HTTP router...");

    let index_path = PathBuf::from(&config.static_dir).join("index.html");

    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // REST API routes
        .nest("/api", api_routes())
        // Static frontend
        .nest_service(
            "/assets",
            ServeDir::new(PathBuf::from(&config.static_dir).join("assets")),
        )
        // SPA fallback - all remaining routes serve index.html
        .fallback_service(ServeFile::new(index_path))
        // Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/contact",
            post(handlers::contact::create).get(handlers::contact::list),
        )
        .route("/contact/:id", get(handlers::contact::get))
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    database_url: Option<String>,
    jwt_secret: String,
    static_dir: String,
}

fn load_config() -> Result<Config> {
    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

    // Present -> durable Postgres storage; absent -> in-memory fallback
    let database_url = std::env::var("DATABASE_URL").ok();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using default (insecure for production)");
        "change-me-in-production".to_string()
    });

    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./public".to_string());

    Ok(Config {
        bind_address,
        database_url,
        jwt_secret,
        static_dir,
    })
}
