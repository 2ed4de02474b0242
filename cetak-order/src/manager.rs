use crate::billing::BillingCalculator;
use crate::events::{
    EventSink, ItemStatusChangedEvent, OrderCreatedEvent, OrderDeletedEvent, OrderEvent,
    OrderStatusChangedEvent, PaymentRecordedEvent, TracingEventSink, now_ts,
};
use crate::ledger::{PaymentLedger, RevenueBySource};
use crate::lifecycle::{FulfillmentEvent, OrderLifecycle};
use crate::models::{NotaSetting, Order, OrderItem, Payment, PaymentStatus, ProductionStatus};
use crate::nota::NotaSequencer;
use crate::repository::{NotaCounter, OrderRepository};
use cetak_catalog::{CatalogRepository, Material, Tier};
use cetak_core::{EngineError, EngineResult, Money};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Input for one line item on create/update. Dimensions of zero are
/// normalized to absent (unit billing).
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub material_id: Uuid,
    pub description: String,
    pub length_m: Option<f64>,
    pub width_m: Option<f64>,
    pub quantity: i32,
    pub finishing_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub order_date: NaiveDate,
    pub items: Vec<NewOrderItem>,
}

/// Fields editable while an order is still Pending. `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub customer_id: Option<Uuid>,
    pub items: Option<Vec<NewOrderItem>>,
}

/// The engine's upward interface: every operation the presentation layer
/// calls, each a single synchronous request/response with a typed failure.
/// Validation happens before any mutation; rejected operations leave the
/// store untouched.
pub struct OrderManager {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    sequencer: NotaSequencer,
    events: Arc<dyn EventSink>,
}

impl OrderManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        counter: Arc<dyn NotaCounter>,
    ) -> Self {
        Self {
            orders,
            catalog,
            sequencer: NotaSequencer::new(counter),
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Create an order. Assigns its invoice number exactly once, here.
    pub async fn create_order(&self, input: NewOrder) -> EngineResult<Order> {
        self.resolve_customer(input.customer_id).await?;
        let items = self.validate_items(&input.items).await?;

        let nota_number = self.sequencer.next().await?;
        let order = Order::new(nota_number, input.order_date, input.customer_id, items);
        self.orders.save(&order).await.map_err(EngineError::store)?;

        self.events.record(&OrderEvent::OrderCreated(OrderCreatedEvent {
            order_id: order.id,
            nota_number: order.nota_number.clone(),
            customer_id: order.customer_id,
            item_count: order.items.len(),
            timestamp: now_ts(),
        }));
        Ok(order)
    }

    pub async fn get_order(&self, order_id: Uuid) -> EngineResult<Order> {
        self.load(order_id).await
    }

    pub async fn list_orders(&self, customer_id: Option<Uuid>) -> EngineResult<Vec<Order>> {
        self.orders
            .list(customer_id)
            .await
            .map_err(EngineError::store)
    }

    /// Edit items and/or customer. Legal only while the order is Pending;
    /// the edit may not shrink the bill below what has already been paid.
    pub async fn update_order(&self, order_id: Uuid, update: OrderUpdate) -> EngineResult<Order> {
        let mut order = self.load(order_id).await?;
        OrderLifecycle::ensure_editable(&order)?;

        if let Some(customer_id) = update.customer_id {
            self.resolve_customer(customer_id).await?;
            order.customer_id = customer_id;
        }
        if let Some(items) = &update.items {
            order.items = self.validate_items(items).await?;
        }

        let total = self.total_of(&order).await?;
        let paid = order.paid_to_date();
        if paid > total {
            return Err(EngineError::validation(format!(
                "edit would reduce the bill to {} below the {} already paid",
                total, paid
            )));
        }
        order.payment_status = PaymentLedger::payment_status(total, paid);
        order.touch();

        self.orders.save(&order).await.map_err(EngineError::store)?;
        Ok(order)
    }

    /// Current billable amount, computed fresh from the catalog.
    pub async fn compute_total(&self, order_id: Uuid) -> EngineResult<Money> {
        let order = self.load(order_id).await?;
        self.total_of(&order).await
    }

    pub async fn advance_order_status(
        &self,
        order_id: Uuid,
        event: FulfillmentEvent,
    ) -> EngineResult<Order> {
        let mut order = self.load(order_id).await?;
        let total = self.total_of(&order).await.unwrap_or(0);

        let from = order.status;
        let operator_id = match &event {
            FulfillmentEvent::StartProcessing { executor_id } => Some(*executor_id),
            FulfillmentEvent::Deliver { deliverer_id } => Some(*deliverer_id),
            _ => None,
        };
        let to = OrderLifecycle::apply(&mut order, event, total)?;
        self.orders.save(&order).await.map_err(EngineError::store)?;

        self.events
            .record(&OrderEvent::OrderStatusChanged(OrderStatusChangedEvent {
                order_id: order.id,
                nota_number: order.nota_number.clone(),
                from,
                to,
                operator_id,
                timestamp: now_ts(),
            }));
        Ok(order)
    }

    pub async fn advance_item_status(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        target: ProductionStatus,
    ) -> EngineResult<Order> {
        let mut order = self.load(order_id).await?;
        OrderLifecycle::advance_item(&mut order, item_id, target)?;
        self.orders.save(&order).await.map_err(EngineError::store)?;

        self.events
            .record(&OrderEvent::ItemStatusChanged(ItemStatusChangedEvent {
                order_id: order.id,
                item_id,
                to: target,
                timestamp: now_ts(),
            }));
        Ok(order)
    }

    pub async fn apply_payment(
        &self,
        order_id: Uuid,
        amount: Money,
        payment_date: NaiveDate,
        operator_id: Uuid,
        funding_source_id: Option<Uuid>,
    ) -> EngineResult<Payment> {
        let mut order = self.load(order_id).await?;
        let total = self.total_of(&order).await?;

        let payment = PaymentLedger::apply_payment(
            &mut order,
            total,
            amount,
            payment_date,
            operator_id,
            funding_source_id,
        )?;
        self.orders.save(&order).await.map_err(EngineError::store)?;

        self.events
            .record(&OrderEvent::PaymentRecorded(PaymentRecordedEvent {
                order_id: order.id,
                payment_id: payment.id,
                amount: payment.amount,
                payment_status: order.payment_status,
                operator_id,
                timestamp: now_ts(),
            }));
        Ok(payment)
    }

    /// Apportion one payment across several orders, in the caller's
    /// priority order (e.g. oldest-due first). All-or-nothing: an amount
    /// beyond the total outstanding is rejected before anything applies.
    pub async fn apply_bulk_payment(
        &self,
        order_ids: &[Uuid],
        total_amount: Money,
        payment_date: NaiveDate,
        operator_id: Uuid,
        funding_source_id: Option<Uuid>,
    ) -> EngineResult<Vec<Payment>> {
        if order_ids.is_empty() {
            return Err(EngineError::validation(
                "bulk payment needs at least one order".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        if !order_ids.iter().all(|id| seen.insert(*id)) {
            return Err(EngineError::validation(
                "bulk payment lists an order more than once".to_string(),
            ));
        }

        let mut targets = Vec::with_capacity(order_ids.len());
        for &id in order_ids {
            let order = self.load(id).await?;
            let total = self.total_of(&order).await?;
            targets.push((order, total));
        }

        let payments = PaymentLedger::apply_bulk_payment(
            &mut targets,
            total_amount,
            payment_date,
            operator_id,
            funding_source_id,
        )?;

        let touched: std::collections::HashSet<Uuid> =
            payments.iter().map(|p| p.order_id).collect();
        for (order, _) in &targets {
            if touched.contains(&order.id) {
                self.orders.save(order).await.map_err(EngineError::store)?;
            }
        }

        for payment in &payments {
            let status = targets
                .iter()
                .find(|(o, _)| o.id == payment.order_id)
                .map(|(o, _)| o.payment_status)
                .unwrap_or(PaymentStatus::PartiallyPaid);
            self.events
                .record(&OrderEvent::PaymentRecorded(PaymentRecordedEvent {
                    order_id: payment.order_id,
                    payment_id: payment.id,
                    amount: payment.amount,
                    payment_status: status,
                    operator_id,
                    timestamp: now_ts(),
                }));
        }
        Ok(payments)
    }

    /// Destructive override: removes the order with its items and payment
    /// history, from any status.
    pub async fn delete_order(&self, order_id: Uuid) -> EngineResult<()> {
        let order = self.load(order_id).await?;
        tracing::warn!(
            order = %order.nota_number,
            payments = order.payments.len(),
            "deleting order and its payment history"
        );
        self.orders
            .delete(order_id)
            .await
            .map_err(EngineError::store)?;

        self.events.record(&OrderEvent::OrderDeleted(OrderDeletedEvent {
            order_id: order.id,
            nota_number: order.nota_number,
            payments_destroyed: order.payments.len(),
            timestamp: now_ts(),
        }));
        Ok(())
    }

    /// Issue the next invoice number without creating an order.
    pub async fn next_invoice_number(&self) -> EngineResult<String> {
        self.sequencer.next().await
    }

    pub async fn update_nota_setting(
        &self,
        prefix: String,
        new_start: Option<String>,
    ) -> EngineResult<NotaSetting> {
        self.sequencer.update_setting(prefix, new_start).await
    }

    /// Revenue bucketed by funding source over all recorded payments,
    /// optionally windowed by payment date (inclusive).
    pub async fn revenue_by_source(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> EngineResult<RevenueBySource> {
        let orders = self.orders.list(None).await.map_err(EngineError::store)?;
        let payments = orders.iter().flat_map(|o| o.payments.iter());
        Ok(PaymentLedger::revenue_by_source(payments, from, to))
    }

    async fn load(&self, order_id: Uuid) -> EngineResult<Order> {
        self.orders
            .get(order_id)
            .await
            .map_err(EngineError::store)?
            .ok_or_else(|| EngineError::unresolved(format!("order {}", order_id)))
    }

    async fn resolve_customer(&self, customer_id: Uuid) -> EngineResult<Tier> {
        let customer = self
            .catalog
            .customer(customer_id)
            .await
            .map_err(EngineError::store)?
            .ok_or_else(|| EngineError::unresolved(format!("customer {}", customer_id)))?;
        Ok(customer.tier)
    }

    async fn total_of(&self, order: &Order) -> EngineResult<Money> {
        let tier = self
            .catalog
            .customer(order.customer_id)
            .await
            .map_err(EngineError::store)?
            .map(|c| c.tier);
        let prices = self.price_snapshot(order).await?;
        BillingCalculator::total_for(order, tier, &prices)
    }

    async fn price_snapshot(&self, order: &Order) -> EngineResult<HashMap<Uuid, Material>> {
        let mut snapshot = HashMap::new();
        for item in &order.items {
            if snapshot.contains_key(&item.material_id) {
                continue;
            }
            if let Some(material) = self
                .catalog
                .material(item.material_id)
                .await
                .map_err(EngineError::store)?
            {
                snapshot.insert(item.material_id, material);
            }
            // A missing material stays out of the snapshot; the calculator
            // reports it as an unresolved reference.
        }
        Ok(snapshot)
    }

    /// Validate and resolve draft items into owned order items. Nothing is
    /// persisted until every item passes.
    async fn validate_items(&self, drafts: &[NewOrderItem]) -> EngineResult<Vec<OrderItem>> {
        if drafts.is_empty() {
            return Err(EngineError::validation(
                "order must have at least one item".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if draft.quantity < 1 {
                return Err(EngineError::validation(format!(
                    "quantity must be at least 1, got {}",
                    draft.quantity
                )));
            }

            let length = draft.length_m.filter(|v| *v > 0.0);
            let width = draft.width_m.filter(|v| *v > 0.0);
            if length.is_some() != width.is_some() {
                return Err(EngineError::validation(
                    "length and width must both be provided, or both left empty".to_string(),
                ));
            }

            self.catalog
                .material(draft.material_id)
                .await
                .map_err(EngineError::store)?
                .ok_or_else(|| {
                    EngineError::unresolved(format!("material {}", draft.material_id))
                })?;

            if let Some(finishing_id) = draft.finishing_id {
                self.catalog
                    .finishing(finishing_id)
                    .await
                    .map_err(EngineError::store)?
                    .ok_or_else(|| {
                        EngineError::unresolved(format!("finishing {}", finishing_id))
                    })?;
            }

            items.push(OrderItem::new(
                draft.material_id,
                draft.description.clone(),
                length,
                width,
                draft.quantity,
                draft.finishing_id,
            ));
        }
        Ok(items)
    }
}
