//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::Money;
use metrics_exporter_prometheus::PrometheusHandle;
use service::{CatalogProduct, InMemoryNotifier, InMemoryProductCatalog};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let (app, _, _) = setup_with_handles();
    app
}

fn setup_with_handles() -> (
    axum::Router,
    InMemoryProductCatalog,
    InMemoryNotifier,
) {
    let (state, catalog, notifier) = api::create_default_state();

    catalog.add(CatalogProduct {
        product_id: "SKU-001".into(),
        name: "Bulk Widget".to_string(),
        unit_price: Money::from_cents(10_000),
        active: true,
    });
    catalog.add(CatalogProduct {
        product_id: "SKU-002".into(),
        name: "Retired Gadget".to_string(),
        unit_price: Money::from_cents(5_000),
        active: false,
    });

    let app = api::create_app(state, get_metrics_handle());
    (app, catalog, notifier)
}

fn place_order_body() -> Body {
    Body::from(
        serde_json::to_string(&serde_json::json!({
            "items": [{
                "product_id": "SKU-001",
                "quantity": 2,
                "selling_price_cents": 15_000
            }],
            "delivery_address": "1 Warehouse Way"
        }))
        .unwrap(),
    )
}

async fn place_order(app: &axum::Router) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header("content-type", "application/json")
                .body(place_order_body())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn admin_actor() -> serde_json::Value {
    serde_json::json!({ "id": "alice" })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_place_order() {
    let app = setup();

    let order = place_order(&app).await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_cents"], 20_000);
    assert_eq!(order["items"][0]["product_name"], "Bulk Widget");
    assert!(
        order["order_number"]
            .as_str()
            .unwrap()
            .starts_with("WS-")
    );
    assert!(order["id"].as_str().is_some());
}

#[tokio::test]
async fn test_place_order_unknown_product() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "items": [{ "product_id": "SKU-404", "quantity": 1 }],
                        "delivery_address": "1 Warehouse Way"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_place_order_inactive_product() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "items": [{ "product_id": "SKU-002", "quantity": 1 }],
                        "delivery_address": "1 Warehouse Way"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_order_and_lookup_by_number() {
    let app = setup();
    let created = place_order(&app).await;
    let order_id = created["id"].as_str().unwrap();
    let order_number = created["order_number"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{order_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["id"], order_id);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/orders/number/{order_number}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["id"], order_id);
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let app = setup();
    let fake_id = uuid::Uuid::new_v4();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{fake_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_order_id_format() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_advance_status_and_history() {
    let app = setup();
    let created = place_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/status"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "target_status": "confirmed",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["status"], "confirmed");
    assert!(order["confirmed_at"].as_str().is_some());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{order_id}/history"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["status"], "pending");
    assert_eq!(entries[1]["status"], "confirmed");
    assert_eq!(entries[1]["created_by"], "alice");
}

#[tokio::test]
async fn test_backwards_transition_conflicts() {
    let app = setup();
    let created = place_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    for target in ["shipped", "confirmed"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/orders/{order_id}/status"))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_string(&serde_json::json!({
                            "target_status": target,
                            "actor": admin_actor()
                        }))
                        .unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        if target == "shipped" {
            assert_eq!(response.status(), StatusCode::OK);
        } else {
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }
    }
}

#[tokio::test]
async fn test_unknown_target_status_rejected() {
    let app = setup();
    let created = place_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/status"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "target_status": "packed",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_role_is_forbidden() {
    let app = setup();
    let created = place_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/status"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "target_status": "confirmed",
                        "actor": { "id": "bob", "role": "customer" }
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cancel_order() {
    let (app, _, notifier) = setup_with_handles();
    let created = place_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    // Blank reason is rejected.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/cancel"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "reason": "  ",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/cancel"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "reason": "stock damaged",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["status"], "cancelled");
    assert_eq!(order["cancellation_reason"], "stock damaged");
    assert_eq!(notifier.sent().len(), 1);

    // Cancelling again conflicts.
    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/cancel"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "reason": "again",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_bulk_advance() {
    let app = setup();
    let first = place_order(&app).await;
    let second = place_order(&app).await;
    let ghost = uuid::Uuid::new_v4().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders/status/bulk")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "order_ids": [first["id"], second["id"], ghost],
                        "target_status": "confirmed",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["status"], "confirmed");
    assert_eq!(results[1]["success"], true);
    assert_eq!(results[2]["success"], false);
    assert!(results[2]["error"].as_str().is_some());
}

#[tokio::test]
async fn test_list_orders_with_status_filter() {
    let app = setup();
    let first = place_order(&app).await;
    place_order(&app).await;

    let order_id = first["id"].as_str().unwrap();
    app.clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/status"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "target_status": "shipped",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders?status=shipped")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let orders = body_json(response).await;
    let orders = orders.as_array().unwrap().clone();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], order_id);
}

#[tokio::test]
async fn test_profit_report() {
    let app = setup();
    let created = place_order(&app).await;
    let order_id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/orders/{order_id}/profit"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    // unit 10000, selling 15000, qty 2
    assert_eq!(report["total_profit_cents"], 10_000);
    assert_eq!(report["total_revenue_cents"], 30_000);
    assert_eq!(report["items_with_selling_price"], 1);
    assert_eq!(report["total_items"], 1);
}

#[tokio::test]
async fn test_statistics_reflect_cancellations() {
    let app = setup();
    let first = place_order(&app).await;
    place_order(&app).await;

    let order_id = first["id"].as_str().unwrap();
    app.clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/cancel"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "reason": "out of stock",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders/statistics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["total_orders"], 2);
    assert_eq!(stats["total_revenue_cents"], 20_000);
    assert_eq!(stats["average_order_value_cents"], 20_000);
    assert_eq!(stats["orders_by_status"]["pending"], 1);
    assert_eq!(stats["orders_by_status"]["cancelled"], 1);
}

#[tokio::test]
async fn test_statistics_with_status_filter() {
    let app = setup();
    let first = place_order(&app).await;
    place_order(&app).await;

    let order_id = first["id"].as_str().unwrap();
    app.clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/orders/{order_id}/cancel"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "reason": "duplicate order",
                        "actor": admin_actor()
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders/statistics?status=pending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["total_orders"], 1);
    assert_eq!(stats["total_revenue_cents"], 20_000);
    assert_eq!(stats["orders_by_status"]["pending"], 1);
}

#[tokio::test]
async fn test_list_orders_with_date_range() {
    let app = setup();
    place_order(&app).await;

    // A window entirely in the future matches nothing.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/orders?from=2099-01-01T00:00:00Z")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let orders = body_json(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 0);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders?from=not-a-timestamp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
