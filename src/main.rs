//! Anonymization Rules Backend
//!
//! Dashboard statistics, rule reports and batch rule editing on top of a
//! remote rule-storage service.

mod aggregate;
mod api;
mod config;
mod errors;
mod models;
mod reconcile;
mod report;
mod sessions;
mod upstream;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use sessions::SessionStore;
use upstream::{FixtureRuleService, HttpRuleService, RuleService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn RuleService>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Anonymization Rules Backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    let service = build_service(&config)?;

    let sessions = Arc::new(SessionStore::new(config.session_ttl));
    sessions.spawn_eviction((config.session_ttl / 4).max(Duration::from_secs(1)));
    tracing::info!("Edit sessions expire after {:?} idle", config.session_ttl);

    let state = AppState {
        service,
        sessions,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick the rule service the configuration asks for.
fn build_service(config: &Config) -> Result<Arc<dyn RuleService>, Box<dyn std::error::Error>> {
    if config.use_fixtures {
        tracing::info!("Serving the built-in fixture dataset (ANON_USE_FIXTURES)");
        return Ok(Arc::new(FixtureRuleService::demo()));
    }

    let mut service = HttpRuleService::new(config.upstream_url.clone(), config.upstream_timeout)?;
    tracing::info!("Rule service: {}", service.base_url());
    if config.fixture_fallback {
        service = service.with_fallback(FixtureRuleService::demo());
    } else {
        tracing::warn!("Fixture fallback disabled; reads fail while the rule service is down");
    }
    Ok(Arc::new(service))
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/status", get(api::get_status))
        // Hierarchy
        .route("/document-classes", get(api::list_document_classes))
        .route("/document-classes/{id}", get(api::get_document_class))
        // Dashboard
        .route("/dashboard/overview", get(api::get_overview))
        .route("/dashboard/alerts", get(api::get_alerts))
        .route("/dashboard/distribution", get(api::get_distribution))
        // Reports
        .route("/reports", get(api::list_report))
        // Single rule updates
        .route("/rules/{level}/{id}", put(api::update_rule))
        // Edit sessions
        .route("/edit-sessions", post(api::create_session))
        .route(
            "/edit-sessions/{id}",
            get(api::get_session).delete(api::delete_session),
        )
        .route(
            "/edit-sessions/{id}/entities/{entity_id}",
            delete(api::discard_entity_edit),
        )
        .route(
            "/edit-sessions/{id}/entities/{entity_id}/rule",
            put(api::set_entity_rule),
        )
        .route(
            "/edit-sessions/{id}/entities/{entity_id}/days",
            put(api::set_entity_days),
        )
        .route("/edit-sessions/{id}/save", post(api::save_session));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
