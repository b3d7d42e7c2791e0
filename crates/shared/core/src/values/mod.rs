use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Order and position sizes are whole lots
pub type Lots = u64;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

const NANO_SCALE: u32 = 9;
const NANOS_PER_UNIT: i64 = 1_000_000_000;

/// Venue money/price representation: whole units plus a nano fraction.
///
/// Both parts carry the same sign (`-1.5` is `units = -1, nano = -500_000_000`).
/// Conversion to and from [`Decimal`] is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Quotation {
    pub units: i64,
    pub nano: i32,
}

impl Quotation {
    pub fn new(units: i64, nano: i32) -> Self {
        Self { units, nano }
    }

    /// Exact decimal value: `units + nano / 1e9`
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.units) + Decimal::new(self.nano as i64, NANO_SCALE)
    }

    /// Split a decimal into units and nanos, truncating below 1e-9.
    ///
    /// Returns `None` when the integral part does not fit in `i64`.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let units_part = value.trunc();
        let nano_part = ((value - units_part) * Decimal::from(NANOS_PER_UNIT)).trunc();
        let units = i64::try_from(units_part).ok()?;
        let nano = i32::try_from(nano_part).ok()?;
        Some(Self { units, nano })
    }
}

impl From<Quotation> for Decimal {
    fn from(q: Quotation) -> Self {
        q.to_decimal()
    }
}

impl std::fmt::Display for Quotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quotation_to_decimal_keeps_leading_zeros() {
        // 101.05 must not read as 101.5
        let q = Quotation::new(101, 50_000_000);
        assert_eq!(q.to_decimal(), dec!(101.05));
    }

    #[test]
    fn test_quotation_negative() {
        let q = Quotation::new(-1, -500_000_000);
        assert_eq!(q.to_decimal(), dec!(-1.5));
        assert_eq!(Quotation::from_decimal(dec!(-1.5)), Some(q));
    }

    #[test]
    fn test_quotation_from_decimal_truncates_sub_nano() {
        let q = Quotation::from_decimal(dec!(98.9000000019)).unwrap();
        assert_eq!(q, Quotation::new(98, 900_000_001));
    }
}
