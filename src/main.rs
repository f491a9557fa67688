mod config;
mod db;
mod error;
mod handlers;
mod images;
mod mail;
mod models;
mod services;

use handlers::{auth, blog, contact, project};

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::images::{ImageStore, RemoteImageStore};
use crate::mail::{MailTransport, SmtpMailer};
use crate::services::AuthService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub images: Arc<dyn ImageStore>,
    pub mailer: Arc<dyn MailTransport>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folioserve=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting folioserve...");

    // Load configuration
    let config = Config::load()?;
    let config = Arc::new(config);
    tracing::info!("Configuration loaded");

    // Initialize database
    let db = Database::new(&config.database.path).await?;
    db.run_migrations().await?;
    tracing::info!("Database initialized");

    // Seed the login credential when one is configured
    AuthService::ensure_seed_user(&db, &config.admin).await?;

    // External service clients, constructed once and reused for the
    // process lifetime
    let images: Arc<dyn ImageStore> = Arc::new(RemoteImageStore::new(config.image_store.clone()));
    let mailer: Arc<dyn MailTransport> = Arc::new(SmtpMailer::new(&config.mail)?);

    // Create app state
    let state = AppState {
        db,
        config: config.clone(),
        images,
        mailer,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = match state
        .config
        .server
        .cors_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    Router::new()
        .route("/", get(root))
        // Blogs
        .route("/api/blog", get(blog::list_blogs).post(blog::create_blog))
        .route(
            "/api/blog/:id",
            get(blog::get_blog)
                .put(blog::update_blog)
                .delete(blog::delete_blog),
        )
        // Projects
        .route(
            "/api/project",
            get(project::list_projects).post(project::create_project),
        )
        .route(
            "/api/project/:id",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        // Auth
        .route("/api/auth/login", post(auth::login))
        // Contact relay
        .route("/contact", post(contact::submit_contact))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "folioserve is running"
}
