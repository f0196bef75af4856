use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use domain::services::{EventSink, LoggingEventSink};
use persistence::repositories::{BookingStore, DriverStore, NotificationStore, OfferStore};

use crate::config::Config;
use crate::dispatch::{DispatchTunables, Dispatcher, OfferLifecycle};
use crate::middleware::metrics::{metrics_handler, metrics_middleware};
use crate::middleware::security_headers::security_headers_middleware;
use crate::middleware::trace_id::trace_id;
use crate::routes::{bookings, drivers, health, offers};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub booking_store: Arc<BookingStore>,
    pub driver_store: Arc<DriverStore>,
    pub offer_store: Arc<OfferStore>,
    pub notification_store: Arc<NotificationStore>,
    pub event_sink: Arc<dyn EventSink>,
    pub dispatcher: Arc<Dispatcher>,
    pub offer_lifecycle: Arc<OfferLifecycle>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let booking_store = Arc::new(BookingStore::new(pool.clone()));
    let driver_store = Arc::new(DriverStore::new(pool.clone()));
    let offer_store = Arc::new(OfferStore::new(pool.clone()));
    let notification_store = Arc::new(NotificationStore::new(pool.clone()));
    let event_sink: Arc<dyn EventSink> = Arc::new(LoggingEventSink);

    let tunables = DispatchTunables {
        offer_timeout_secs: config.dispatch.offer_timeout_secs as i64,
        max_offers_per_booking: config.dispatch.max_offers_per_booking as i64,
    };
    let dispatcher = Arc::new(Dispatcher::new(
        booking_store.clone(),
        driver_store.clone(),
        offer_store.clone(),
        notification_store.clone(),
        event_sink.clone(),
        config.dispatch.max_search_radius_km,
        tunables,
    ));
    let offer_lifecycle = Arc::new(OfferLifecycle::new(
        booking_store.clone(),
        driver_store.clone(),
        offer_store.clone(),
        notification_store.clone(),
        event_sink.clone(),
        dispatcher.clone(),
    ));

    let state = AppState {
        pool,
        config: config.clone(),
        booking_store,
        driver_store,
        offer_store,
        notification_store,
        event_sink,
        dispatcher,
        offer_lifecycle,
    };

    let cors = CorsLayer::permissive();

    let booking_routes = Router::new()
        .route("/api/v1/bookings", post(bookings::create_booking))
        .route(
            "/api/v1/bookings/:booking_id/cancel",
            post(bookings::cancel_booking),
        )
        .route(
            "/api/v1/bookings/:booking_id/complete",
            post(bookings::complete_booking),
        )
        .route(
            "/api/v1/bookings/:booking_id/arrived",
            post(bookings::mark_driver_arrived),
        )
        .route(
            "/api/v1/bookings/:booking_id/start",
            post(bookings::start_ride),
        )
        .route(
            "/api/v1/bookings/:booking_id/tracking",
            get(bookings::tracking),
        );

    let offer_routes = Router::new()
        .route("/api/v1/offers/:offer_id/accept", post(offers::accept_offer))
        .route("/api/v1/offers/:offer_id/decline", post(offers::decline_offer));

    let driver_routes = Router::new()
        .route(
            "/api/v1/drivers/:driver_id/location",
            post(drivers::update_location),
        )
        .route(
            "/api/v1/drivers/:driver_id/online",
            post(drivers::set_online),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let app = Router::new()
        .merge(booking_routes)
        .merge(offer_routes)
        .merge(driver_routes)
        .merge(public_routes);

    // Global middleware (order matters: bottom layers run first)
    app.layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
