use std::sync::Arc;

use adpilot_api::config::ServerConfig;
use adpilot_api::notifications::NotificationRouter;
use adpilot_api::router::build_app_router;
use adpilot_api::state::AppState;
use adpilot_api::ws;
use adpilot_core::generation::GenerationCapability;
use adpilot_db::PgStore;
use adpilot_events::EventBus;
use adpilot_llm::{LlmConfig, OpenAiCapability};
use adpilot_pipeline::Services;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adpilot_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(addr = %config.bind_addr, llm_model = %config.llm.model, "Loaded server configuration");

    // --- Database ---
    let pool = adpilot_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    adpilot_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    adpilot_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgStore::new(pool));

    // --- Generation capability ---
    let capability: Arc<dyn GenerationCapability> = match OpenAiCapability::from_config(&config.llm) {
        Ok(capability) => Arc::new(capability),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build LLM client, generation disabled");
            Arc::new(
                OpenAiCapability::from_config(&LlmConfig::disabled())
                    .expect("disabled capability needs no client"),
            )
        }
    };
    tracing::info!(available = capability.is_available(), "Generation capability ready");

    // --- Event bus + WebSocket push ---
    let event_bus = Arc::new(EventBus::default());
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));
    let router_handle = tokio::spawn(
        NotificationRouter::new(Arc::clone(&ws_manager)).run(event_bus.subscribe()),
    );

    // --- Services ---
    let services = Services::new(
        store.clone(),
        store.clone(),
        capability,
        event_bus.clone(),
    );
    match services.personas.seed_predefined().await {
        Ok(inserted) => tracing::info!(inserted, "Predefined personas seeded"),
        Err(e) => tracing::error!(error = %e, "Failed to seed predefined personas"),
    }

    // --- App state ---
    let state = AppState {
        services,
        campaign_store: store,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = config.bind_addr;
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = config.shutdown_timeout;

    // The router task holds its own receiver; dropping the last sender
    // closes the channel and ends its loop.
    drop(event_bus);
    let _ = tokio::time::timeout(drain, router_handle).await;
    tracing::info!("Notification router stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
