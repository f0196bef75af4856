use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod app;
mod config;
mod dispatch;
mod error;
mod jobs;
mod middleware;
mod routes;

use dispatch::{DispatchTunables, Dispatcher};
use domain::services::LoggingEventSink;
use persistence::repositories::{BookingStore, DriverStore, NotificationStore, OfferStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);

    // Initialize Prometheus metrics
    middleware::metrics::init_metrics();
    info!("Prometheus metrics initialized");

    info!("Starting dispatch API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let db_config = persistence::db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        connect_timeout_secs: config.database.connect_timeout_secs,
        idle_timeout_secs: config.database.idle_timeout_secs,
    };
    let pool = persistence::db::create_pool(&db_config).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Start job scheduler: the ExpirySweeper shares the pool with the HTTP
    // app but owns its own Dispatcher instance, since the scheduler and the
    // app are independently-constructed consumers of the same stores.
    let booking_store = Arc::new(BookingStore::new(pool.clone()));
    let driver_store = Arc::new(DriverStore::new(pool.clone()));
    let offer_store = Arc::new(OfferStore::new(pool.clone()));
    let notification_store = Arc::new(NotificationStore::new(pool.clone()));
    let event_sink = Arc::new(LoggingEventSink);

    let tunables = DispatchTunables {
        offer_timeout_secs: config.dispatch.offer_timeout_secs as i64,
        max_offers_per_booking: config.dispatch.max_offers_per_booking as i64,
    };
    let dispatcher = Arc::new(Dispatcher::new(
        booking_store.clone(),
        driver_store,
        offer_store.clone(),
        notification_store,
        event_sink,
        config.dispatch.max_search_radius_km,
        tunables,
    ));

    let mut scheduler = jobs::JobScheduler::new();
    scheduler.register(jobs::ExpirySweeper::new(
        booking_store,
        offer_store,
        dispatcher,
        config.dispatch.sweep_interval_secs,
    ));
    scheduler.start();

    // Build application
    let app = app::create_app(config.clone(), pool);

    // Start server
    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Handle shutdown gracefully
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Shutdown job scheduler
    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;

    info!("Server shutdown complete");
    Ok(())
}
