use cetak_core::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A billable material/substrate ("bahan"), carrying one unit price per
/// customer tier. Owned by catalog management; read-only from the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub price_end_customer: Money,
    pub price_retail: Money,
    pub price_wholesale: Money,
    pub price_reseller: Money,
    pub price_corporate: Money,
    /// On-hand stock. Informational only; deduction mechanics live outside
    /// the engine.
    pub stock_on_hand: Option<f64>,
}

impl Material {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            price_end_customer: 0,
            price_retail: 0,
            price_wholesale: 0,
            price_reseller: 0,
            price_corporate: 0,
            stock_on_hand: None,
        }
    }

    pub fn with_prices(
        name: String,
        end_customer: Money,
        retail: Money,
        wholesale: Money,
        reseller: Money,
        corporate: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            price_end_customer: end_customer,
            price_retail: retail,
            price_wholesale: wholesale,
            price_reseller: reseller,
            price_corporate: corporate,
            stock_on_hand: None,
        }
    }
}
