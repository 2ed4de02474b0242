use crate::models::{FulfillmentStatus, Order, ProductionStatus};
use cetak_core::{EngineError, EngineResult, Money};
use uuid::Uuid;

/// Events that drive the order-level fulfillment machine. Operator-bearing
/// events record who performed the transition on the order itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentEvent {
    /// Pending → Processing. Records the executor responsible for
    /// production.
    StartProcessing { executor_id: Uuid },
    /// Processing → ReadyForPickup. Requires every item to be ready.
    MarkReadyForPickup,
    /// ReadyForPickup → Delivered. Records who confirmed hand-off.
    Deliver { deliverer_id: Uuid },
    /// Administrative single-step reversal. The only way back to an
    /// earlier stage.
    Revert,
}

impl FulfillmentEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::StartProcessing { .. } => "START_PROCESSING",
            Self::MarkReadyForPickup => "MARK_READY_FOR_PICKUP",
            Self::Deliver { .. } => "DELIVER",
            Self::Revert => "REVERT",
        }
    }
}

/// The transition table: (status, event) → target status. Everything not
/// listed here is rejected.
fn next_status(from: FulfillmentStatus, event: &FulfillmentEvent) -> Option<FulfillmentStatus> {
    use FulfillmentEvent as E;
    use FulfillmentStatus as S;
    match (from, event) {
        (S::Pending, E::StartProcessing { .. }) => Some(S::Processing),
        (S::Processing, E::MarkReadyForPickup) => Some(S::ReadyForPickup),
        (S::ReadyForPickup, E::Deliver { .. }) => Some(S::Delivered),
        (S::Processing, E::Revert) => Some(S::Pending),
        (S::ReadyForPickup, E::Revert) => Some(S::Processing),
        (S::Delivered, E::Revert) => Some(S::ReadyForPickup),
        _ => None,
    }
}

/// The two-level status machine: order-level fulfillment plus per-item
/// production, with the cross-level guards checked before every move.
pub struct OrderLifecycle;

impl OrderLifecycle {
    /// Apply a fulfillment event. `computed_total` is the current billable
    /// amount from the [`BillingCalculator`](crate::billing::BillingCalculator);
    /// it backs the "non-degenerate total" guard on entering production.
    ///
    /// Rejections leave the order untouched.
    pub fn apply(
        order: &mut Order,
        event: FulfillmentEvent,
        computed_total: Money,
    ) -> EngineResult<FulfillmentStatus> {
        let from = order.status;
        let Some(to) = next_status(from, &event) else {
            return Err(EngineError::illegal_transition(
                from,
                event.name(),
                "no such transition in the fulfillment table",
            ));
        };

        match &event {
            FulfillmentEvent::StartProcessing { executor_id } => {
                if computed_total <= 0 {
                    return Err(EngineError::illegal_transition(
                        from,
                        to,
                        "order has no billable items",
                    ));
                }
                order.executor_id = Some(*executor_id);
            }
            FulfillmentEvent::MarkReadyForPickup => {
                if !order.all_items_ready() {
                    return Err(EngineError::illegal_transition(
                        from,
                        to,
                        "not every item is ready",
                    ));
                }
            }
            FulfillmentEvent::Deliver { deliverer_id } => {
                order.deliverer_id = Some(*deliverer_id);
            }
            FulfillmentEvent::Revert => {
                tracing::warn!(
                    order = %order.nota_number,
                    from = %from,
                    to = %to,
                    "administrative reversal of fulfillment status"
                );
                match from {
                    FulfillmentStatus::Processing => order.executor_id = None,
                    FulfillmentStatus::Delivered => order.deliverer_id = None,
                    _ => {}
                }
            }
        }

        order.status = to;
        order.touch();
        Ok(to)
    }

    /// Advance one item a single production step:
    /// NotStarted → InProgress → Ready. Production may only move while the
    /// order is at or past Processing, and never backwards.
    pub fn advance_item(
        order: &mut Order,
        item_id: Uuid,
        target: ProductionStatus,
    ) -> EngineResult<()> {
        if !order.status.is_in_production() {
            return Err(EngineError::illegal_transition(
                order.status,
                target,
                "order has not entered processing",
            ));
        }

        let nota = order.nota_number.clone();
        let item = order.item_mut(item_id).ok_or_else(|| {
            EngineError::unresolved(format!("item {} on order {}", item_id, nota))
        })?;

        let legal = matches!(
            (item.production_status, target),
            (ProductionStatus::NotStarted, ProductionStatus::InProgress)
                | (ProductionStatus::InProgress, ProductionStatus::Ready)
        );
        if !legal {
            return Err(EngineError::illegal_transition(
                item.production_status,
                target,
                "item production moves one step forward only",
            ));
        }

        item.production_status = target;
        order.touch();
        Ok(())
    }

    /// Item and customer edits are only legal while the order is Pending;
    /// once production starts the billable content is frozen.
    pub fn ensure_editable(order: &Order) -> EngineResult<()> {
        if order.status != FulfillmentStatus::Pending {
            return Err(EngineError::illegal_transition(
                order.status,
                order.status,
                format!("cannot edit: order already in {}", order.status),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderItem;
    use chrono::NaiveDate;

    fn order_with_items(n: usize) -> Order {
        let items = (0..n)
            .map(|i| {
                OrderItem::new(
                    Uuid::new_v4(),
                    format!("Item {}", i),
                    Some(1.0),
                    Some(1.0),
                    1,
                    None,
                )
            })
            .collect();
        Order::new(
            "INV-001".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Uuid::new_v4(),
            items,
        )
    }

    fn start(order: &mut Order) -> Uuid {
        let executor = Uuid::new_v4();
        OrderLifecycle::apply(
            order,
            FulfillmentEvent::StartProcessing {
                executor_id: executor,
            },
            100_000,
        )
        .unwrap();
        executor
    }

    #[test]
    fn full_forward_path() {
        let mut order = order_with_items(1);
        let item_id = order.items[0].id;

        let executor = start(&mut order);
        assert_eq!(order.status, FulfillmentStatus::Processing);
        assert_eq!(order.executor_id, Some(executor));

        OrderLifecycle::advance_item(&mut order, item_id, ProductionStatus::InProgress).unwrap();
        OrderLifecycle::advance_item(&mut order, item_id, ProductionStatus::Ready).unwrap();

        OrderLifecycle::apply(&mut order, FulfillmentEvent::MarkReadyForPickup, 100_000).unwrap();
        assert_eq!(order.status, FulfillmentStatus::ReadyForPickup);

        let deliverer = Uuid::new_v4();
        OrderLifecycle::apply(
            &mut order,
            FulfillmentEvent::Deliver {
                deliverer_id: deliverer,
            },
            100_000,
        )
        .unwrap();
        assert_eq!(order.status, FulfillmentStatus::Delivered);
        assert_eq!(order.deliverer_id, Some(deliverer));
    }

    #[test]
    fn cannot_skip_stages() {
        let mut order = order_with_items(1);
        let err =
            OrderLifecycle::apply(&mut order, FulfillmentEvent::MarkReadyForPickup, 100_000)
                .unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
        assert_eq!(order.status, FulfillmentStatus::Pending);
    }

    #[test]
    fn degenerate_total_blocks_processing() {
        let mut order = order_with_items(1);
        let err = OrderLifecycle::apply(
            &mut order,
            FulfillmentEvent::StartProcessing {
                executor_id: Uuid::new_v4(),
            },
            0,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
        assert_eq!(order.executor_id, None);
    }

    #[test]
    fn ready_for_pickup_requires_every_item_ready() {
        let mut order = order_with_items(2);
        let first = order.items[0].id;
        start(&mut order);

        OrderLifecycle::advance_item(&mut order, first, ProductionStatus::InProgress).unwrap();
        OrderLifecycle::advance_item(&mut order, first, ProductionStatus::Ready).unwrap();

        // Second item still NotStarted.
        let err =
            OrderLifecycle::apply(&mut order, FulfillmentEvent::MarkReadyForPickup, 100_000)
                .unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
        assert_eq!(order.status, FulfillmentStatus::Processing);
    }

    #[test]
    fn item_production_needs_processing_order() {
        let mut order = order_with_items(1);
        let item_id = order.items[0].id;
        let err =
            OrderLifecycle::advance_item(&mut order, item_id, ProductionStatus::InProgress)
                .unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
    }

    #[test]
    fn item_production_never_moves_backwards() {
        let mut order = order_with_items(1);
        let item_id = order.items[0].id;
        start(&mut order);
        OrderLifecycle::advance_item(&mut order, item_id, ProductionStatus::InProgress).unwrap();

        let err = OrderLifecycle::advance_item(&mut order, item_id, ProductionStatus::NotStarted)
            .unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
    }

    #[test]
    fn revert_steps_back_one_stage_and_clears_operator() {
        let mut order = order_with_items(1);
        start(&mut order);
        assert!(order.executor_id.is_some());

        OrderLifecycle::apply(&mut order, FulfillmentEvent::Revert, 100_000).unwrap();
        assert_eq!(order.status, FulfillmentStatus::Pending);
        assert_eq!(order.executor_id, None);

        // From Pending there is nothing to revert.
        let err = OrderLifecycle::apply(&mut order, FulfillmentEvent::Revert, 100_000).unwrap_err();
        assert!(matches!(err, EngineError::IllegalTransition { .. }));
    }

    #[test]
    fn editing_is_frozen_after_pending() {
        let mut order = order_with_items(1);
        OrderLifecycle::ensure_editable(&order).unwrap();

        start(&mut order);
        let err = OrderLifecycle::ensure_editable(&order).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cannot edit"), "message was: {}", msg);
    }
}
