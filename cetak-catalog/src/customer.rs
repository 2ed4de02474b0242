use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pricing tier a customer belongs to. Determines which unit price column
/// of a material applies to their orders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    EndCustomer,
    Retail,
    Wholesale,
    Reseller,
    Corporate,
}

impl Tier {
    /// Parse a stored tier code. Unknown codes yield `None` so the caller
    /// can surface the data-integrity problem instead of guessing a tier.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "END_CUSTOMER" => Some(Self::EndCustomer),
            "RETAIL" => Some(Self::Retail),
            "WHOLESALE" => Some(Self::Wholesale),
            "RESELLER" => Some(Self::Reseller),
            "CORPORATE" => Some(Self::Corporate),
            _ => None,
        }
    }
}

/// A customer of the shop. Owned by customer management; orders reference
/// customers by id and never own them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tier: Tier,
}

impl Customer {
    pub fn new(name: String, tier: Tier) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            phone: None,
            address: None,
            tier,
        }
    }
}
