//! Aggregate statistics endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use order_store::{OrderFilter, OrderStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_status, parse_timestamp};

#[derive(Deserialize)]
pub struct StatisticsParams {
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub total_orders: usize,
    pub orders_by_status: HashMap<String, usize>,
    pub total_revenue_cents: i64,
    pub average_order_value_cents: i64,
}

/// GET /orders/statistics — aggregate order statistics. The unfiltered
/// summary is served from cache; filtered queries are computed fresh.
#[tracing::instrument(skip(state, params))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<StatisticsParams>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let unfiltered = params.status.is_none() && params.from.is_none() && params.to.is_none();

    let stats = if unfiltered {
        state.statistics.summary().await?
    } else {
        let mut filter = OrderFilter::new();
        if let Some(ref status) = params.status {
            filter = filter.status(parse_status(status)?);
        }
        if let Some(ref from) = params.from {
            filter = filter.created_from(parse_timestamp(from)?);
        }
        if let Some(ref to) = params.to {
            filter = filter.created_to(parse_timestamp(to)?);
        }
        state.statistics.filtered(filter).await?
    };

    Ok(Json(StatisticsResponse {
        total_orders: stats.total_orders,
        orders_by_status: stats
            .orders_by_status
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect(),
        total_revenue_cents: stats.total_revenue.cents(),
        average_order_value_cents: stats.average_order_value.cents(),
    }))
}
