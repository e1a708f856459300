use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod flow;
mod handlers;
mod models;
mod store;

use config::Config;
use flow::FlowRegistry;
use store::PgStore;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub store: PgStore,
    pub flows: FlowRegistry,
    pub ws_tx: Option<broadcast::Sender<String>>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scrollsouls_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let config = Arc::new(config);

    // Database
    let db = db::create_pool(&config.database_url).await;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    // WebSocket broadcast channel for view-refresh events
    let (ws_tx, _) = broadcast::channel::<String>(256);

    let flows = FlowRegistry::new();

    // Purge abandoned wizard sessions in the background
    flow::spawn_flow_sweeper(
        flows.clone(),
        std::time::Duration::from_secs(config.flow_ttl_secs),
    );

    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        store: PgStore::new(db),
        flows,
        ws_tx: Some(ws_tx),
    };

    let app = app(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler))
        .route("/api/emotions", get(handlers::emotions::list_emotions));

    // The wizard accepts anonymous callers; identity only changes whether
    // rewards are granted.
    let flow_routes = Router::new()
        .route("/api/check-in/flows", post(handlers::flows::start_flow))
        .route("/api/check-in/flows/:id", get(handlers::flows::get_flow))
        .route(
            "/api/check-in/flows/:id",
            delete(handlers::flows::cancel_flow),
        )
        .route(
            "/api/check-in/flows/:id/events",
            post(handlers::flows::apply_event),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::optional_auth,
        ));

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::profile::me))
        .route("/api/check-ins", get(handlers::check_ins::list_check_ins))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![state
            .config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .unwrap()];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(flow_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
