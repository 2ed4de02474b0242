use crate::models::{Order, Payment, PaymentStatus};
use cetak_core::{EngineError, EngineResult, Money};
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

/// Revenue bucketed by funding source; a read-side projection over the
/// payment rows. Every payment is counted exactly once.
#[derive(Debug, Clone, Default)]
pub struct RevenueBySource {
    pub cash: Money,
    pub by_source: HashMap<Uuid, Money>,
    pub total: Money,
}

/// Records payments against orders and derives the payment status.
/// The one invariant it owns: an order's recorded payments never exceed
/// its computed bill.
pub struct PaymentLedger;

impl PaymentLedger {
    /// Payment status is a pure function of (total, paid-to-date). The
    /// `>=` on the paid branch tolerates a rounding overshoot of a
    /// currency-unit fraction; it is never an overpayment.
    pub fn payment_status(total: Money, paid: Money) -> PaymentStatus {
        if paid == 0 {
            PaymentStatus::Unpaid
        } else if paid < total {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::Paid
        }
    }

    pub fn remaining(total: Money, paid: Money) -> Money {
        (total - paid).max(0)
    }

    /// Append one payment to an order. `computed_total` comes from the
    /// billing calculator. Rejects non-positive amounts and anything over
    /// the remaining balance; no clamping, state unchanged on rejection.
    pub fn apply_payment(
        order: &mut Order,
        computed_total: Money,
        amount: Money,
        payment_date: NaiveDate,
        operator_id: Uuid,
        funding_source_id: Option<Uuid>,
    ) -> EngineResult<Payment> {
        if amount <= 0 {
            return Err(EngineError::validation(format!(
                "payment amount must be positive, got {}",
                amount
            )));
        }

        let remaining = Self::remaining(computed_total, order.paid_to_date());
        if amount > remaining {
            return Err(EngineError::Overpayment {
                attempted: amount,
                remaining,
            });
        }

        let payment = Payment::new(order.id, amount, payment_date, operator_id, funding_source_id);
        order.payments.push(payment.clone());
        order.payment_status = Self::payment_status(computed_total, order.paid_to_date());
        order.touch();

        tracing::info!(
            order = %order.nota_number,
            amount,
            status = ?order.payment_status,
            "payment recorded"
        );
        Ok(payment)
    }

    /// Apportion one bulk payment across orders in the caller's priority
    /// order, filling each remaining balance until the amount runs out.
    ///
    /// A total exceeding the summed outstanding balances is a hard
    /// overpayment error checked up front; nothing is applied. There is no
    /// credit-carry concept. Orders whose balance is already covered are
    /// skipped (payments are strictly positive rows).
    pub fn apply_bulk_payment(
        targets: &mut [(Order, Money)],
        total_amount: Money,
        payment_date: NaiveDate,
        operator_id: Uuid,
        funding_source_id: Option<Uuid>,
    ) -> EngineResult<Vec<Payment>> {
        if total_amount <= 0 {
            return Err(EngineError::validation(format!(
                "bulk payment amount must be positive, got {}",
                total_amount
            )));
        }

        let outstanding: Money = targets
            .iter()
            .map(|(order, total)| Self::remaining(*total, order.paid_to_date()))
            .sum();
        if total_amount > outstanding {
            return Err(EngineError::Overpayment {
                attempted: total_amount,
                remaining: outstanding,
            });
        }

        let mut left = total_amount;
        let mut recorded = Vec::new();
        for (order, total) in targets.iter_mut() {
            if left == 0 {
                break;
            }
            let portion = left.min(Self::remaining(*total, order.paid_to_date()));
            if portion == 0 {
                continue;
            }
            let payment = Self::apply_payment(
                order,
                *total,
                portion,
                payment_date,
                operator_id,
                funding_source_id,
            )?;
            recorded.push(payment);
            left -= portion;
        }
        Ok(recorded)
    }

    /// Bucket payments into cash vs each funding source, optionally
    /// restricted to a payment-date window (inclusive).
    pub fn revenue_by_source<'a>(
        payments: impl IntoIterator<Item = &'a Payment>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RevenueBySource {
        let mut report = RevenueBySource::default();
        for payment in payments {
            if from.is_some_and(|d| payment.payment_date < d)
                || to.is_some_and(|d| payment.payment_date > d)
            {
                continue;
            }
            match payment.funding_source_id {
                None => report.cash += payment.amount,
                Some(source) => *report.by_source.entry(source).or_default() += payment.amount,
            }
            report.total += payment.amount;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderItem;

    fn order() -> Order {
        Order::new(
            "INV-001".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Uuid::new_v4(),
            vec![OrderItem::new(
                Uuid::new_v4(),
                "Spanduk".to_string(),
                Some(2.0),
                Some(3.0),
                2,
                None,
            )],
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn status_is_a_pure_function_of_total_and_paid() {
        assert_eq!(PaymentLedger::payment_status(600_000, 0), PaymentStatus::Unpaid);
        assert_eq!(
            PaymentLedger::payment_status(600_000, 400_000),
            PaymentStatus::PartiallyPaid
        );
        assert_eq!(
            PaymentLedger::payment_status(600_000, 600_000),
            PaymentStatus::Paid
        );
        // Rounding overshoot is tolerated.
        assert_eq!(
            PaymentLedger::payment_status(600_000, 600_001),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn partial_then_exact_settlement() {
        let mut order = order();
        let total = 600_000;
        let operator = Uuid::new_v4();

        PaymentLedger::apply_payment(&mut order, total, 400_000, date(), operator, None).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(PaymentLedger::remaining(total, order.paid_to_date()), 200_000);

        // One unit over the remainder is rejected, state unchanged.
        let err = PaymentLedger::apply_payment(&mut order, total, 200_001, date(), operator, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::Overpayment { remaining: 200_000, .. }));
        assert_eq!(order.payments.len(), 1);

        PaymentLedger::apply_payment(&mut order, total, 200_000, date(), operator, None).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.paid_to_date(), total);
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        let mut order = order();
        for bad in [0, -5_000] {
            let err =
                PaymentLedger::apply_payment(&mut order, 600_000, bad, date(), Uuid::new_v4(), None)
                    .unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)));
        }
        assert!(order.payments.is_empty());
    }

    #[test]
    fn bulk_payment_fills_balances_in_priority_order() {
        let operator = Uuid::new_v4();
        let mut first = order();
        // First has 100,000 remaining of 300,000; second has 250,000
        // remaining.
        PaymentLedger::apply_payment(&mut first, 300_000, 200_000, date(), operator, None).unwrap();

        let mut targets = vec![(first, 300_000), (order(), 250_000)];
        let recorded =
            PaymentLedger::apply_bulk_payment(&mut targets, 300_000, date(), operator, None)
                .unwrap();

        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].amount, 100_000);
        assert_eq!(recorded[1].amount, 200_000);

        assert_eq!(targets[0].0.payment_status, PaymentStatus::Paid);
        assert_eq!(targets[1].0.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(
            PaymentLedger::remaining(250_000, targets[1].0.paid_to_date()),
            50_000
        );
    }

    #[test]
    fn bulk_overflow_is_rejected_before_anything_applies() {
        let operator = Uuid::new_v4();
        let mut targets = vec![(order(), 100_000), (order(), 50_000)];

        let err =
            PaymentLedger::apply_bulk_payment(&mut targets, 150_001, date(), operator, None)
                .unwrap_err();
        assert!(matches!(err, EngineError::Overpayment { .. }));
        assert!(targets.iter().all(|(o, _)| o.payments.is_empty()));
    }

    #[test]
    fn fully_paid_orders_receive_no_bulk_row() {
        let operator = Uuid::new_v4();
        let mut paid = order();
        PaymentLedger::apply_payment(&mut paid, 100_000, 100_000, date(), operator, None).unwrap();

        let mut targets = vec![(paid, 100_000), (order(), 80_000)];
        let recorded =
            PaymentLedger::apply_bulk_payment(&mut targets, 80_000, date(), operator, None)
                .unwrap();

        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].order_id, targets[1].0.id);
        assert_eq!(targets[0].0.payments.len(), 1);
    }

    #[test]
    fn revenue_projection_buckets_cash_and_sources() {
        let order_id = Uuid::new_v4();
        let operator = Uuid::new_v4();
        let bank = Uuid::new_v4();
        let payments = vec![
            Payment::new(order_id, 100_000, date(), operator, None),
            Payment::new(order_id, 250_000, date(), operator, Some(bank)),
            Payment::new(order_id, 50_000, date(), operator, Some(bank)),
        ];

        let report = PaymentLedger::revenue_by_source(&payments, None, None);
        assert_eq!(report.cash, 100_000);
        assert_eq!(report.by_source[&bank], 300_000);
        assert_eq!(report.total, 400_000);
    }

    #[test]
    fn revenue_projection_honors_date_window() {
        let order_id = Uuid::new_v4();
        let operator = Uuid::new_v4();
        let early = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let payments = vec![
            Payment::new(order_id, 100_000, early, operator, None),
            Payment::new(order_id, 200_000, late, operator, None),
        ];

        let report = PaymentLedger::revenue_by_source(
            &payments,
            Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            None,
        );
        assert_eq!(report.total, 200_000);
        assert_eq!(report.cash, 200_000);
    }
}
