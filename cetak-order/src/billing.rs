use crate::models::{Order, OrderItem};
use cetak_core::money::round_to_unit;
use cetak_core::{EngineError, EngineResult, Money};
use cetak_catalog::{Material, PriceBook, Tier};
use std::collections::HashMap;
use uuid::Uuid;

/// Resolves a unit price for a material id under a tier. `None` means the
/// material reference does not resolve.
pub trait UnitPriceSource {
    fn unit_price(&self, material_id: Uuid, tier: Tier) -> Option<Money>;
}

/// A snapshot of resolved materials, keyed by id. The usual price source:
/// the manager loads the materials an order references and hands the map
/// to the calculator.
impl UnitPriceSource for HashMap<Uuid, Material> {
    fn unit_price(&self, material_id: Uuid, tier: Tier) -> Option<Money> {
        self.get(&material_id)
            .map(|m| PriceBook::unit_price(m, tier))
    }
}

/// The single home of the tier-price × area × quantity formula. Every
/// consumer (order intake, payment reconciliation, status guards) calls
/// this; nothing recomputes the total locally.
pub struct BillingCalculator;

impl BillingCalculator {
    /// Billed area in square meters. Items without dimensions are billed
    /// per unit (area = 1). Zero dimensions count as absent.
    pub fn billed_area(item: &OrderItem) -> f64 {
        match (item.length_m, item.width_m) {
            (Some(l), Some(w)) if l > 0.0 && w > 0.0 => l * w,
            _ => 1.0,
        }
    }

    /// Line total: unit price × billed area, rounded to the smallest
    /// currency unit, then multiplied by quantity.
    pub fn line_total(item: &OrderItem, unit_price: Money) -> Money {
        round_to_unit(unit_price as f64 * Self::billed_area(item)) * item.quantity as Money
    }

    /// Total billable amount for an order.
    ///
    /// An unresolved customer tier yields a total of 0 (callers that need
    /// to distinguish "zero bill" from "unknown customer" must check
    /// customer resolution themselves). An unresolved material is
    /// propagated as an error, never priced at a guessed value.
    pub fn total_for(
        order: &Order,
        tier: Option<Tier>,
        prices: &impl UnitPriceSource,
    ) -> EngineResult<Money> {
        let Some(tier) = tier else {
            return Ok(0);
        };

        let mut total: Money = 0;
        for item in &order.items {
            let unit_price = prices.unit_price(item.material_id, tier).ok_or_else(|| {
                EngineError::unresolved(format!(
                    "material {} on order {}",
                    item.material_id, order.nota_number
                ))
            })?;
            total += Self::line_total(item, unit_price);
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn retail_material(price_retail: Money) -> Material {
        Material::with_prices(
            "Flexi 280gr".to_string(),
            60_000,
            price_retail,
            42_000,
            38_000,
            35_000,
        )
    }

    fn order_with(items: Vec<OrderItem>) -> Order {
        Order::new(
            "INV-001".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Uuid::new_v4(),
            items,
        )
    }

    #[test]
    fn dimensioned_item_bills_length_times_width() {
        let material = retail_material(50_000);
        let item = OrderItem::new(
            material.id,
            "Spanduk".to_string(),
            Some(2.0),
            Some(3.0),
            2,
            None,
        );
        let order = order_with(vec![item]);
        let prices: HashMap<Uuid, Material> = [(material.id, material)].into();

        // 50,000 × (2×3) × 2 = 600,000
        let total = BillingCalculator::total_for(&order, Some(Tier::Retail), &prices).unwrap();
        assert_eq!(total, 600_000);
    }

    #[test]
    fn dimensionless_item_bills_per_unit() {
        let material = retail_material(2_500);
        let item = OrderItem::new(material.id, "Stiker".to_string(), None, None, 10, None);
        let order = order_with(vec![item]);
        let prices: HashMap<Uuid, Material> = [(material.id, material)].into();

        let total = BillingCalculator::total_for(&order, Some(Tier::Retail), &prices).unwrap();
        assert_eq!(total, 25_000);
    }

    #[test]
    fn fractional_area_rounds_to_whole_currency() {
        let material = retail_material(33_333);
        let item = OrderItem::new(
            material.id,
            "Potongan kecil".to_string(),
            Some(0.5),
            Some(0.5),
            3,
            None,
        );
        let order = order_with(vec![item]);
        let prices: HashMap<Uuid, Material> = [(material.id, material)].into();

        // 33,333 × 0.25 = 8,333.25 → 8,333 per line, × 3
        let total = BillingCalculator::total_for(&order, Some(Tier::Retail), &prices).unwrap();
        assert_eq!(total, 24_999);
    }

    #[test]
    fn unresolved_customer_totals_zero() {
        let material = retail_material(50_000);
        let item = OrderItem::new(
            material.id,
            "Spanduk".to_string(),
            Some(1.0),
            Some(1.0),
            1,
            None,
        );
        let order = order_with(vec![item]);
        let prices: HashMap<Uuid, Material> = [(material.id, material)].into();

        assert_eq!(
            BillingCalculator::total_for(&order, None, &prices).unwrap(),
            0
        );
    }

    #[test]
    fn unresolved_material_is_an_error() {
        let item = OrderItem::new(
            Uuid::new_v4(),
            "Spanduk".to_string(),
            Some(1.0),
            Some(1.0),
            1,
            None,
        );
        let order = order_with(vec![item]);
        let prices: HashMap<Uuid, Material> = HashMap::new();

        let err = BillingCalculator::total_for(&order, Some(Tier::Retail), &prices).unwrap_err();
        assert!(matches!(err, EngineError::UnresolvedReference(_)));
    }

    #[test]
    fn finishing_allowance_never_touches_the_bill() {
        let material = retail_material(50_000);
        let finishing_id = Uuid::new_v4();
        let plain = OrderItem::new(
            material.id,
            "Spanduk".to_string(),
            Some(2.0),
            Some(3.0),
            1,
            None,
        );
        let with_finishing = OrderItem::new(
            material.id,
            "Spanduk".to_string(),
            Some(2.0),
            Some(3.0),
            1,
            Some(finishing_id),
        );
        let prices: HashMap<Uuid, Material> = [(material.id, material)].into();

        let a = BillingCalculator::total_for(&order_with(vec![plain]), Some(Tier::Retail), &prices)
            .unwrap();
        let b = BillingCalculator::total_for(
            &order_with(vec![with_finishing]),
            Some(Tier::Retail),
            &prices,
        )
        .unwrap();
        assert_eq!(a, b);
    }
}
