use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post-processing option with an additive dimensional allowance.
/// The allowance widens the dimensions printed on documents (SPK, invoice
/// layout) but never the billed area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finishing {
    pub id: Uuid,
    pub name: String,
    /// Extra length in meters added to the displayed dimensions.
    pub length_allowance_m: f64,
    /// Extra width in meters added to the displayed dimensions.
    pub width_allowance_m: f64,
}

impl Finishing {
    pub fn new(name: String, length_allowance_m: f64, width_allowance_m: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            length_allowance_m,
            width_allowance_m,
        }
    }

    /// Dimensions to print on customer-facing documents: the item's billed
    /// dimensions plus this finishing's allowance. Unit-billed items (no
    /// dimensions) are displayed as-is.
    pub fn padded_dimensions(&self, length_m: Option<f64>, width_m: Option<f64>) -> Option<(f64, f64)> {
        match (length_m, width_m) {
            (Some(l), Some(w)) if l > 0.0 && w > 0.0 => {
                Some((l + self.length_allowance_m, w + self.width_allowance_m))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowance_pads_displayed_dimensions() {
        let finishing = Finishing::new("Mata Ayam".to_string(), 0.1, 0.1);
        let padded = finishing.padded_dimensions(Some(2.0), Some(3.0)).unwrap();
        assert!((padded.0 - 2.1).abs() < 1e-9);
        assert!((padded.1 - 3.1).abs() < 1e-9);
    }

    #[test]
    fn unit_billed_items_are_not_padded() {
        let finishing = Finishing::new("Laminasi".to_string(), 0.05, 0.05);
        assert_eq!(finishing.padded_dimensions(None, None), None);
        assert_eq!(finishing.padded_dimensions(Some(0.0), Some(0.0)), None);
    }
}
