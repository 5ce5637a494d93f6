//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use common::Money;
use order_store::PostgresOrderStore;
use service::{CatalogProduct, InMemoryNotifier, InMemoryProductCatalog};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn demo_catalog() -> InMemoryProductCatalog {
    let catalog = InMemoryProductCatalog::new();
    catalog.add(CatalogProduct {
        product_id: "SKU-001".into(),
        name: "Bulk Widget".to_string(),
        unit_price: Money::from_cents(10_000),
        active: true,
    });
    catalog.add(CatalogProduct {
        product_id: "SKU-002".into(),
        name: "Pallet of Gadgets".to_string(),
        unit_price: Money::from_cents(45_000),
        active: true,
    });
    catalog.add(CatalogProduct {
        product_id: "SKU-003".into(),
        name: "Crate of Sprockets".to_string(),
        unit_price: Money::from_cents(7_500),
        active: true,
    });
    catalog
}

async fn serve(app: axum::Router, addr: &str) {
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Build state on the configured storage backend
    let catalog = demo_catalog();
    let notifier = InMemoryNotifier::new();
    let addr = config.addr();

    match config.database_url {
        Some(ref url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to database");

            let store = PostgresOrderStore::new(pool);
            store.run_migrations().await.expect("migrations failed");
            tracing::info!("using PostgreSQL order store");

            let state =
                api::create_state(Arc::new(store), Arc::new(catalog), Arc::new(notifier));
            serve(api::create_app(state, metrics_handle), &addr).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory order store");

            let store = Arc::new(order_store::InMemoryOrderStore::new());
            let state = api::create_state(store, Arc::new(catalog), Arc::new(notifier));
            serve(api::create_app(state, metrics_handle), &addr).await;
        }
    }
}
