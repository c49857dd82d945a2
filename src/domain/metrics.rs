// Order and revenue metrics domain models
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate order metrics, from the batch endpoint or the fallback computation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub avg_order_value: f64,
    #[serde(default)]
    pub cancelled_orders: u64,
    #[serde(default)]
    pub orders_by_status: BTreeMap<String, u64>,
}

impl MetricsSnapshot {
    /// Builds a snapshot from the secondary revenue and order-count sources.
    ///
    /// The status breakdown is not available from those sources and is left empty.
    pub fn from_totals(total_revenue: f64, total_orders: u64) -> Self {
        Self {
            total_orders,
            total_revenue,
            avg_order_value: total_revenue / total_orders.max(1) as f64,
            cancelled_orders: 0,
            orders_by_status: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    #[serde(alias = "orderId")]
    pub order_id: String,
    #[serde(default, alias = "totalAmount")]
    pub total_amount: f64,
    #[serde(default, alias = "eventType")]
    pub event_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetrics {
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub total_quantity_sold: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub order_count: u64,
}

/// Latest realtime statistics. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RealtimeSnapshot {
    #[serde(default)]
    pub current_orders_per_minute: f64,
    #[serde(default)]
    pub revenue_per_minute: f64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub top_products: Vec<ProductMetrics>,
    /// Most recent first.
    #[serde(default)]
    pub recent_orders: Vec<OrderEvent>,
}

impl RealtimeSnapshot {
    /// Caps `recent_orders` to the display window, keeping the most recent entries.
    pub fn with_order_window(mut self, window: usize) -> Self {
        self.recent_orders.truncate(window);
        self
    }
}

/// Response of the revenue-total endpoint used by the fallback path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueTotal {
    #[serde(default)]
    pub total_revenue: f64,
}

/// Response of the paged order listing used by the fallback path.
/// Only the total element count is read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersPage {
    #[serde(default)]
    pub total_elements: u64,
}
