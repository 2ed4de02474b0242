use cetak_core::Money;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order-level fulfillment stage. Whole-order, customer-facing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    Pending,
    Processing,
    ReadyForPickup,
    Delivered,
}

impl FulfillmentStatus {
    /// Production on items may only happen once the order itself has
    /// entered production.
    pub fn is_in_production(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::ReadyForPickup => "READY_FOR_PICKUP",
            Self::Delivered => "DELIVERED",
        };
        write!(f, "{}", s)
    }
}

/// Per-item production stage. Independent per physical item; different
/// items on one order may finish at different times.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    NotStarted,
    InProgress,
    Ready,
}

impl std::fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Ready => "READY",
        };
        write!(f, "{}", s)
    }
}

/// Derived from (total, paid-to-date); never set directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

/// A line item on an order. Items are owned exclusively by their order and
/// have no independent lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub material_id: Uuid,
    pub description: String,
    /// Billed length in meters. Absent means unit billing (area = 1).
    pub length_m: Option<f64>,
    /// Billed width in meters. Present exactly when `length_m` is.
    pub width_m: Option<f64>,
    pub quantity: i32,
    pub finishing_id: Option<Uuid>,
    pub production_status: ProductionStatus,
}

impl OrderItem {
    pub fn new(
        material_id: Uuid,
        description: String,
        length_m: Option<f64>,
        width_m: Option<f64>,
        quantity: i32,
        finishing_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            material_id,
            description,
            length_m,
            width_m,
            quantity,
            finishing_id,
            production_status: ProductionStatus::NotStarted,
        }
    }
}

/// A recorded payment against one order. Append-only; bulk payments write
/// one row per affected order with the same date and operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub operator_id: Uuid,
    /// `None` means cash.
    pub funding_source_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        order_id: Uuid,
        amount: Money,
        payment_date: NaiveDate,
        operator_id: Uuid,
        funding_source_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            amount,
            payment_date,
            operator_id,
            funding_source_id,
            recorded_at: Utc::now(),
        }
    }
}

/// An order: the aggregate root of the engine. Exclusively owns its items
/// and payments. Always has at least one item; the invoice number is
/// assigned exactly once, at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub nota_number: String,
    pub order_date: NaiveDate,
    pub customer_id: Uuid,
    pub status: FulfillmentStatus,
    pub payment_status: PaymentStatus,
    /// Operator who advanced the order into processing.
    pub executor_id: Option<Uuid>,
    /// Operator who confirmed hand-off to the customer.
    pub deliverer_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
    /// Optimistic concurrency token; bumped by the store on every save.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        nota_number: String,
        order_date: NaiveDate,
        customer_id: Uuid,
        items: Vec<OrderItem>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            nota_number,
            order_date,
            customer_id,
            status: FulfillmentStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            executor_id: None,
            deliverer_id: None,
            items,
            payments: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of recorded payments.
    pub fn paid_to_date(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn item(&self, item_id: Uuid) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: Uuid) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    pub fn all_items_ready(&self) -> bool {
        self.items
            .iter()
            .all(|i| i.production_status == ProductionStatus::Ready)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Invoice-number configuration. The digit length of `start_number` fixes
/// the zero-pad width for every number issued afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotaSetting {
    pub prefix: String,
    pub start_number: String,
}

impl NotaSetting {
    pub fn pad_width(&self) -> usize {
        self.start_number.len()
    }

    /// Numeric value of the configured start number. The start number is
    /// itself the first issued number, not a pre-increment seed.
    pub fn start_value(&self) -> Option<i64> {
        self.start_number.parse::<i64>().ok()
    }
}
