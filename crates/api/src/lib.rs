//! HTTP API server with observability for the order lifecycle engine.
//!
//! Provides REST endpoints for order placement, status transitions,
//! history and statistics, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore};
use reporting::StatisticsService;
use service::{
    InMemoryNotifier, InMemoryProductCatalog, NotificationDispatcher, OrderService, ProductCatalog,
    StatisticsCache,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/statistics", get(routes::statistics::get::<S>))
        .route("/orders/status/bulk", post(routes::orders::bulk_advance::<S>))
        .route("/orders/number/{order_number}", get(routes::orders::get_by_number::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/status", patch(routes::orders::advance_status::<S>))
        .route("/orders/{id}/cancel", patch(routes::orders::cancel::<S>))
        .route("/orders/{id}/history", get(routes::orders::history::<S>))
        .route("/orders/{id}/profit", get(routes::orders::profit::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the service and statistics layers over a storage backend. The
/// statistics service doubles as the cache invalidation target.
pub fn create_state<S: OrderStore + 'static>(
    store: Arc<S>,
    catalog: Arc<dyn ProductCatalog>,
    notifier: Arc<dyn NotificationDispatcher>,
) -> Arc<AppState<S>> {
    let statistics = Arc::new(StatisticsService::new(store.clone()));
    let order_service = OrderService::new(
        store,
        catalog,
        notifier,
        statistics.clone() as Arc<dyn StatisticsCache>,
    );

    Arc::new(AppState {
        order_service,
        statistics,
    })
}

/// Creates the default application state on the in-memory store, returning
/// the catalog and notifier handles so callers can seed and inspect them.
pub fn create_default_state() -> (
    Arc<AppState<InMemoryOrderStore>>,
    InMemoryProductCatalog,
    InMemoryNotifier,
) {
    let store = Arc::new(InMemoryOrderStore::new());
    let catalog = InMemoryProductCatalog::new();
    let notifier = InMemoryNotifier::new();

    let state = create_state(
        store,
        Arc::new(catalog.clone()),
        Arc::new(notifier.clone()),
    );

    (state, catalog, notifier)
}
