use crate::models::{FulfillmentStatus, PaymentStatus, ProductionStatus};
use cetak_core::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order_id: Uuid,
    pub nota_number: String,
    pub customer_id: Uuid,
    pub item_count: usize,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order_id: Uuid,
    pub nota_number: String,
    pub from: FulfillmentStatus,
    pub to: FulfillmentStatus,
    pub operator_id: Option<Uuid>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatusChangedEvent {
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub to: ProductionStatus,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecordedEvent {
    pub order_id: Uuid,
    pub payment_id: Uuid,
    pub amount: Money,
    pub payment_status: PaymentStatus,
    pub operator_id: Uuid,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDeletedEvent {
    pub order_id: Uuid,
    pub nota_number: String,
    pub payments_destroyed: usize,
    pub timestamp: i64,
}

/// Everything the engine announces after a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    OrderCreated(OrderCreatedEvent),
    OrderStatusChanged(OrderStatusChangedEvent),
    ItemStatusChanged(ItemStatusChangedEvent),
    PaymentRecorded(PaymentRecordedEvent),
    OrderDeleted(OrderDeletedEvent),
}

/// Where emitted events go. Delivery (webhooks, notifications) is out of
/// scope; the default sink just logs.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &OrderEvent);
}

pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: &OrderEvent) {
        match serde_json::to_string(event) {
            Ok(json) => tracing::info!(target: "cetak::events", event = %json),
            Err(err) => tracing::error!(target: "cetak::events", "failed to serialize event: {}", err),
        }
    }
}

pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
