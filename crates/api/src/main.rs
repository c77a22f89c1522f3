use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use gigboard_api::config::{log_format_from_env, DatabaseConfig, LogFormat, ServerConfig};
use gigboard_api::router::build_app_router;
use gigboard_api::state::AppState;
use gigboard_events::{BusNotifier, EventBus, NotificationPersistence};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(log_format_from_env());

    let config = ServerConfig::from_env();
    let db_config = DatabaseConfig::from_env();

    let pool = gigboard_db::create_pool(&db_config.url, db_config.max_connections)
        .await
        .context("connecting to the database")?;
    gigboard_db::health_check(&pool)
        .await
        .context("database health check")?;
    gigboard_db::run_migrations(&pool)
        .await
        .context("applying migrations")?;
    tracing::info!(
        max_connections = db_config.max_connections,
        "Database ready"
    );

    // Notices are published on the bus after each commit; the writer task
    // stores them as inbox rows.
    let event_bus = Arc::new(EventBus::default());
    let writer_cancel = CancellationToken::new();
    let writer = tokio::spawn(NotificationPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
        writer_cancel.clone(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifier: Arc::new(BusNotifier::new(Arc::clone(&event_bus))),
        event_bus,
    };
    let app = build_app_router(state, &config);

    let host = config
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("invalid HOST '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "Marketplace engine listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    writer_cancel.cancel();
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, writer).await.is_err() {
        tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Notification writer did not drain in time"
        );
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gigboard_api=debug,gigboard_events=info,tower_http=debug"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
    }
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
