/// Monetary amount in the smallest currency unit (whole rupiah).
/// No sub-unit fractions are ever persisted; rounding happens exactly once,
/// inside the billing calculator.
pub type Money = i64;

/// Round a fractional amount to the smallest currency unit.
pub fn round_to_unit(amount: f64) -> Money {
    amount.round() as Money
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_to_unit(100.5), 101);
        assert_eq!(round_to_unit(100.4), 100);
        assert_eq!(round_to_unit(0.0), 0);
    }
}
