//! Order placement, lifecycle and read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderNumber, ProductId, UserId};
use domain::{Actor, Order, OrderStatus, Role};
use order_store::{OrderFilter, OrderStore};
use reporting::StatisticsService;
use serde::{Deserialize, Serialize};
use service::{CartLine, OrderService, PlaceOrder};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub order_service: OrderService<S>,
    pub statistics: Arc<StatisticsService<S>>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Option<String>,
    pub items: Vec<OrderItemRequest>,
    pub delivery_address: String,
    pub delivery_notes: Option<String>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: u32,
    pub selling_price_cents: Option<i64>,
}

#[derive(Deserialize)]
pub struct ActorRequest {
    pub id: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct AdvanceStatusRequest {
    pub target_status: String,
    pub notes: Option<String>,
    pub actor: ActorRequest,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub reason: String,
    pub actor: ActorRequest,
}

#[derive(Deserialize)]
pub struct BulkAdvanceRequest {
    pub order_ids: Vec<String>,
    pub target_status: String,
    pub notes: Option<String>,
    pub actor: ActorRequest,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub delivery_address: String,
    pub delivery_notes: Option<String>,
    pub created_at: String,
    pub confirmed_at: Option<String>,
    pub shipped_at: Option<String>,
    pub delivered_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub selling_price_cents: Option<i64>,
}

#[derive(Serialize)]
pub struct HistoryEntryResponse {
    pub status: String,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct BulkAdvanceResponse {
    pub results: Vec<BulkResultResponse>,
}

#[derive(Serialize)]
pub struct BulkResultResponse {
    pub order_id: String,
    pub success: bool,
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ProfitResponse {
    pub items: Vec<ItemProfitResponse>,
    pub total_profit_cents: i64,
    pub total_revenue_cents: i64,
    pub total_items: usize,
    pub items_with_selling_price: usize,
    pub average_margin: f64,
}

#[derive(Serialize)]
pub struct ItemProfitResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub selling_price_cents: i64,
    pub profit_cents: i64,
    pub revenue_cents: i64,
    pub margin: f64,
}

fn order_to_response(order: &Order) -> OrderResponse {
    OrderResponse {
        id: order.id.to_string(),
        order_number: order.order_number.to_string(),
        user_id: order.user_id.to_string(),
        status: order.status.to_string(),
        items: order
            .items
            .iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.to_string(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
                total_price_cents: item.total_price.cents(),
                selling_price_cents: item.selling_price.map(|p| p.cents()),
            })
            .collect(),
        total_cents: order.total_amount.cents(),
        delivery_address: order.delivery_address.clone(),
        delivery_notes: order.delivery_notes.clone(),
        created_at: order.created_at.to_rfc3339(),
        confirmed_at: order.confirmed_at.map(|t| t.to_rfc3339()),
        shipped_at: order.shipped_at.map(|t| t.to_rfc3339()),
        delivered_at: order.delivered_at.map(|t| t.to_rfc3339()),
        cancelled_at: order.cancelled_at.map(|t| t.to_rfc3339()),
        cancellation_reason: order.cancellation_reason.clone(),
    }
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::from(uuid))
}

fn parse_user_id(id: &str) -> Result<UserId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid user_id: {e}")))?;
    Ok(UserId::from(uuid))
}

pub(crate) fn parse_status(status: &str) -> Result<OrderStatus, ApiError> {
    status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown status: {status}")))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ApiError::BadRequest(format!("Invalid timestamp: {e}")))
}

fn parse_actor(req: &ActorRequest) -> Result<Actor, ApiError> {
    let role = match req.role.as_deref() {
        None | Some("admin") => Role::Admin,
        Some("customer") => Role::Customer,
        Some("system") => Role::System,
        Some(other) => return Err(ApiError::BadRequest(format!("Unknown role: {other}"))),
    };
    Ok(Actor {
        id: req.id.clone(),
        role,
    })
}

// -- Handlers --

/// POST /orders — place a new order.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let user_id = match req.user_id {
        Some(ref id) => parse_user_id(id)?,
        None => UserId::new(),
    };

    let items = req
        .items
        .into_iter()
        .map(|item| CartLine {
            product_id: ProductId::new(item.product_id),
            quantity: item.quantity,
            selling_price: item.selling_price_cents.map(Money::from_cents),
        })
        .collect();

    let order = state
        .order_service
        .place_order(PlaceOrder {
            user_id,
            items,
            delivery_address: req.delivery_address,
            delivery_notes: req.delivery_notes,
        })
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(order_to_response(&order))))
}

/// GET /orders — list orders, optionally filtered by status, user and
/// creation date range.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let mut filter = OrderFilter::new();
    if let Some(ref status) = params.status {
        filter = filter.status(parse_status(status)?);
    }
    if let Some(ref user_id) = params.user_id {
        filter = filter.user_id(parse_user_id(user_id)?);
    }
    if let Some(ref from) = params.from {
        filter = filter.created_from(parse_timestamp(from)?);
    }
    if let Some(ref to) = params.to {
        filter = filter.created_to(parse_timestamp(to)?);
    }

    let orders = state.order_service.list_orders(filter).await?;
    Ok(Json(orders.iter().map(order_to_response).collect()))
}

/// GET /orders/{id} — fetch an order by id.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.get_order(order_id).await?;
    Ok(Json(order_to_response(&order)))
}

/// GET /orders/number/{order_number} — fetch an order by its order number.
#[tracing::instrument(skip(state))]
pub async fn get_by_number<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(number): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .order_service
        .get_order_by_number(&OrderNumber::new(number.clone()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {number} not found")))?;
    Ok(Json(order_to_response(&order)))
}

/// PATCH /orders/{id}/status — advance an order to a later status.
#[tracing::instrument(skip(state, req))]
pub async fn advance_status<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AdvanceStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let target = parse_status(&req.target_status)?;
    let actor = parse_actor(&req.actor)?;

    let order = state
        .order_service
        .advance_status(order_id, target, &actor, req.notes)
        .await?;

    Ok(Json(order_to_response(&order)))
}

/// PATCH /orders/{id}/cancel — cancel an order with a reason.
#[tracing::instrument(skip(state, req))]
pub async fn cancel<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let actor = parse_actor(&req.actor)?;

    let order = state
        .order_service
        .cancel_order(order_id, &actor, &req.reason)
        .await?;

    Ok(Json(order_to_response(&order)))
}

/// POST /orders/status/bulk — advance many orders to the same status.
#[tracing::instrument(skip(state, req))]
pub async fn bulk_advance<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<BulkAdvanceRequest>,
) -> Result<Json<BulkAdvanceResponse>, ApiError> {
    let target = parse_status(&req.target_status)?;
    let actor = parse_actor(&req.actor)?;
    let order_ids = req
        .order_ids
        .iter()
        .map(|id| parse_order_id(id))
        .collect::<Result<Vec<_>, _>>()?;

    let outcomes = state
        .order_service
        .advance_many(order_ids, target, &actor, req.notes)
        .await;

    let results = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(order) => BulkResultResponse {
                order_id: outcome.order_id.to_string(),
                success: true,
                status: Some(order.status.to_string()),
                error: None,
            },
            Err(e) => BulkResultResponse {
                order_id: outcome.order_id.to_string(),
                success: false,
                status: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok(Json(BulkAdvanceResponse { results }))
}

/// GET /orders/{id}/history — the order's status history, oldest first.
#[tracing::instrument(skip(state))]
pub async fn history<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HistoryEntryResponse>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let entries = state.order_service.order_history(order_id).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| HistoryEntryResponse {
                status: entry.status.to_string(),
                notes: entry.notes,
                created_by: entry.created_by,
                created_at: entry.created_at.to_rfc3339(),
            })
            .collect(),
    ))
}

/// GET /orders/{id}/profit — wholesale profit report for an order.
#[tracing::instrument(skip(state))]
pub async fn profit<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProfitResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let report = state.order_service.order_profit(order_id).await?;

    Ok(Json(ProfitResponse {
        items: report
            .items
            .into_iter()
            .map(|item| ItemProfitResponse {
                product_id: item.product_id.to_string(),
                product_name: item.product_name,
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
                selling_price_cents: item.selling_price.cents(),
                profit_cents: item.profit.cents(),
                revenue_cents: item.revenue.cents(),
                margin: item.margin,
            })
            .collect(),
        total_profit_cents: report.total_profit.cents(),
        total_revenue_cents: report.total_revenue.cents(),
        total_items: report.total_items,
        items_with_selling_price: report.items_with_selling_price,
        average_margin: report.average_margin,
    }))
}
