//! Wholesale profit projection.
//!
//! A pure read-side calculation over an order's items. Items without a
//! declared selling price are excluded from the revenue and profit sums but
//! still count toward `total_items`. When a selling price is zero the
//! margin is 0.0 by convention.

use common::{Money, ProductId};
use serde::Serialize;

use crate::order::Order;

/// Profit figures for one item with a declared selling price.
#[derive(Debug, Clone, Serialize)]
pub struct ItemProfit {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub selling_price: Money,

    /// `(selling_price - unit_price) * quantity`.
    pub profit: Money,

    /// `selling_price * quantity`.
    pub revenue: Money,

    /// `(selling_price - unit_price) / selling_price`, 0.0 when the selling
    /// price is zero.
    pub margin: f64,
}

/// Aggregate profit report for an order.
#[derive(Debug, Clone, Serialize)]
pub struct ProfitReport {
    pub items: Vec<ItemProfit>,
    pub total_profit: Money,
    pub total_revenue: Money,
    pub total_items: usize,
    pub items_with_selling_price: usize,

    /// `total_profit / total_revenue`, 0.0 when revenue is zero.
    pub average_margin: f64,
}

/// Computes the profit report for an order. Never mutates the order.
pub fn profit_report(order: &Order) -> ProfitReport {
    let mut items = Vec::new();
    let mut total_profit = Money::zero();
    let mut total_revenue = Money::zero();

    for item in &order.items {
        let Some(selling_price) = item.selling_price else {
            continue;
        };

        let profit = (selling_price - item.unit_price).multiply(item.quantity);
        let revenue = selling_price.multiply(item.quantity);
        let margin = if selling_price.is_zero() {
            0.0
        } else {
            (selling_price.cents() - item.unit_price.cents()) as f64
                / selling_price.cents() as f64
        };

        total_profit += profit;
        total_revenue += revenue;
        items.push(ItemProfit {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            selling_price,
            profit,
            revenue,
            margin,
        });
    }

    let average_margin = if total_revenue.is_zero() {
        0.0
    } else {
        total_profit.cents() as f64 / total_revenue.cents() as f64
    };

    ProfitReport {
        items_with_selling_price: items.len(),
        total_items: order.items.len(),
        items,
        total_profit,
        total_revenue,
        average_margin,
    }
}
