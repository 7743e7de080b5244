pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, DEFAULT_ADMIN_PASSWORD};
use crate::db::Database;
use crate::models::{NewUser, Role};
use crate::services::auth::hash_password;
use crate::services::durability::{flush_on_shutdown, shutdown_signal, spawn_periodic_snapshots};
use crate::services::notify::{ResetNotifier, TracingNotifier};
use crate::services::search::SearchService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub search: Arc<SearchService>,
    pub notifier: Arc<dyn ResetNotifier>,
    pub session_ttl: Duration,
    pub reset_token_ttl: Duration,
}

/// Build the full router: public, authenticated, and admin routes.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/api/admin/users",
            get(routes::users::list).post(routes::users::register),
        )
        .route("/api/admin/users/:id", delete(routes::users::delete))
        .route("/api/admin/content", post(routes::content::create))
        .route("/api/admin/content/:id", delete(routes::content::delete))
        .route(
            "/api/admin/search-cache",
            delete(routes::search::purge_cache),
        )
        .route("/api/admin/stats", get(routes::admin::stats))
        .route_layer(middleware::from_fn(routes::auth::admin_middleware));

    let protected_routes = Router::new()
        // Session routes
        .route("/api/auth/logout", post(routes::account::logout))
        .route("/api/auth/me", get(routes::account::me))
        .route(
            "/api/auth/change-password",
            post(routes::account::change_password),
        )
        // Progress and event log
        .route(
            "/api/users/:id/progress",
            get(routes::progress::get).put(routes::progress::replace),
        )
        .route("/api/users/:id/progress/drift", get(routes::progress::drift))
        .route(
            "/api/users/:id/answers",
            get(routes::answers::list).post(routes::answers::record),
        )
        .route(
            "/api/users/:id/exams",
            get(routes::answers::list_exams).post(routes::answers::record_exam),
        )
        .route("/api/exams/:id", get(routes::answers::get_exam))
        // Content
        .route("/api/content", get(routes::content::list))
        .route("/api/content/:id", get(routes::content::get))
        .route(
            "/api/users/:id/content-progress",
            get(routes::content::list_progress),
        )
        .route(
            "/api/users/:id/content-progress/:content_id",
            put(routes::content::save_progress),
        )
        .route(
            "/api/users/:id/terminal-sessions",
            get(routes::content::list_terminal).post(routes::content::save_terminal),
        )
        // Search
        .route("/api/search", get(routes::search::search))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(routes::account::login))
        .route(
            "/api/auth/forgot-password",
            post(routes::account::forgot_password),
        )
        .route(
            "/api/auth/reset-password",
            post(routes::account::reset_password),
        )
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let admin = &config.bootstrap_admin;
    if admin.password == DEFAULT_ADMIN_PASSWORD {
        tracing::warn!("BOOTSTRAP_ADMIN_PASSWORD is unset, a new store gets the default admin password");
    }
    let bootstrap_admin = NewUser {
        username: admin.username.clone(),
        email: admin.email.clone(),
        password_hash: hash_password(&admin.password),
        display_name: "Administrator".to_string(),
        role: Role::Admin,
    };

    tracing::info!("Opening store at {}", config.snapshot_path.display());
    let db = Arc::new(Database::open(&config.snapshot_path, &bootstrap_admin)?);

    let search = SearchService::from_config(db.clone(), &config.search)?;

    let state = AppState {
        db: db.clone(),
        search: Arc::new(search),
        notifier: Arc::new(TracingNotifier),
        session_ttl: config.session_ttl,
        reset_token_ttl: config.reset_token_ttl,
    };

    let snapshots = spawn_periodic_snapshots(db.clone(), config.snapshot_interval);
    let app = build_router(state);

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    snapshots.abort();
    flush_on_shutdown(&db)?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
