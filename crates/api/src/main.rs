use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use herald_api::config::ServerConfig;
use herald_api::router::build_app_router;
use herald_api::state::AppState;
use herald_api::telemetry::init_tracing;
use herald_events::delivery::{
    HttpDeliveryError, HttpWebhookSender, SlackChatSender, SmtpEmailSender,
};
use herald_events::{
    DeliveryDefaults, DeliveryMetrics, Engine, EngineParts, EventBus, EventConsumer,
    OrgSettingsCache, PgStore,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    });

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    // --- Database ---
    let pool = herald_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    herald_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    herald_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgStore::new(pool.clone()));
    let metrics = Arc::new(DeliveryMetrics::new());

    // --- Engine ---
    let engine = match build_engine(&store, &metrics, &config) {
        Ok(engine) => Some(Arc::new(engine)),
        Err(e) => {
            tracing::error!(error = %e, "Delivery transports unavailable, event ingress disabled");
            None
        }
    };

    // --- Event bus + consumer ---
    let event_bus = Arc::new(EventBus::default());
    let cancel = CancellationToken::new();
    let consumer_handle = engine.as_ref().map(|engine| {
        let consumer = EventConsumer::new(Arc::clone(engine), cancel.clone());
        tokio::spawn(consumer.run(event_bus.subscribe()))
    });
    tracing::info!(
        subscribers = event_bus.subscriber_count(),
        "Event bus created"
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        engine,
        templates: store.clone(),
        preferences: store.clone(),
        logs: store.clone(),
        inbox: store.clone(),
        metrics,
        pool: Some(pool),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
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

    cancel.cancel();
    drop(event_bus);
    if let Some(handle) = consumer_handle {
        match tokio::time::timeout(Duration::from_secs(5), handle).await {
            Ok(Ok(stats)) => tracing::info!(
                handled = stats.handled,
                malformed = stats.malformed,
                "Event consumer stopped"
            ),
            Ok(Err(e)) => tracing::error!(error = %e, "Event consumer task failed"),
            Err(_) => tracing::warn!("Event consumer did not stop in time"),
        }
    }

    tracing::info!("Graceful shutdown complete");
}

fn build_engine(
    store: &Arc<PgStore>,
    metrics: &Arc<DeliveryMetrics>,
    config: &ServerConfig,
) -> Result<Engine, HttpDeliveryError> {
    let email = SmtpEmailSender::new(config.email.clone());
    let chat = SlackChatSender::new()?;
    let webhook = HttpWebhookSender::new()?;

    Ok(Engine::new(EngineParts {
        templates: store.clone(),
        preferences: store.clone(),
        logs: store.clone(),
        inbox: store.clone(),
        directory: store.clone(),
        settings: Arc::new(OrgSettingsCache::new(store.clone(), config.org_settings_ttl)),
        email: Arc::new(email),
        chat: Arc::new(chat),
        webhook: Arc::new(webhook),
        metrics: Some(metrics.clone()),
        defaults: DeliveryDefaults::from_env(),
    }))
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
