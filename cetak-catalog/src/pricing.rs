use crate::customer::Tier;
use crate::material::Material;
use cetak_core::Money;

/// Resolves the per-material unit price for a customer tier.
///
/// Pure lookup across the five tier-keyed price columns. A tier that was
/// never priced simply carries 0 on the material; 0 is returned as-is and
/// treated downstream as a data-integrity signal, never substituted with
/// another tier's price.
pub struct PriceBook;

impl PriceBook {
    pub fn unit_price(material: &Material, tier: Tier) -> Money {
        match tier {
            Tier::EndCustomer => material.price_end_customer,
            Tier::Retail => material.price_retail,
            Tier::Wholesale => material.price_wholesale,
            Tier::Reseller => material.price_reseller,
            Tier::Corporate => material.price_corporate,
        }
    }
}
