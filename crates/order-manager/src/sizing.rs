//! Entry sizing
//!
//! Converts free capital and the current quote into a lot count.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tradecycle_core::{Instrument, Lots, Price};

use crate::error::{Error, Result};

/// Lots to buy with `allocation_fraction` of `free_capital` at `price`.
///
/// `floor(free_capital * allocation_fraction / (price * lot_size))`, never
/// less than one lot: a non-positive quotient is raised to 1.
pub fn lots_to_buy(
    instrument: &Instrument,
    free_capital: Decimal,
    price: Price,
    allocation_fraction: Decimal,
) -> Result<Lots> {
    if allocation_fraction <= Decimal::ZERO || allocation_fraction > Decimal::ONE {
        return Err(Error::InvalidInput(format!(
            "allocation fraction {} outside (0, 1]",
            allocation_fraction
        )));
    }
    if price <= Decimal::ZERO {
        return Err(Error::InvalidInput(format!(
            "non-positive price {} for {}",
            price, instrument.id
        )));
    }
    if instrument.lot_size == 0 {
        return Err(Error::InvalidInput(format!(
            "zero lot size for {}",
            instrument.id
        )));
    }

    let lot_cost = price * Decimal::from(instrument.lot_size);
    let quotient = (free_capital * allocation_fraction / lot_cost).floor();

    let lots = if quotient <= Decimal::ZERO {
        debug!(
            "[SIZING] {}: quotient {} raised to 1 lot (free capital {}, lot cost {})",
            instrument.id, quotient, free_capital, lot_cost
        );
        1
    } else {
        quotient.to_u64().ok_or_else(|| {
            Error::InvalidInput(format!("lot count {} out of range", quotient))
        })?
    };

    debug!(
        "[SIZING] {}: free capital {}, price {}, lot size {} -> {} lots",
        instrument.id, free_capital, price, instrument.lot_size, lots
    );
    Ok(lots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn share(lot_size: Lots) -> Instrument {
        Instrument::share("SBER", lot_size, "TQBR")
    }

    #[test]
    fn test_floor_of_allocated_capital() {
        // 100000 * 0.1 / (250 * 10) = 4
        assert_eq!(lots_to_buy(&share(10), dec!(100000), dec!(250), dec!(0.1)).unwrap(), 4);
        // 100000 * 0.1 / (300 * 10) = 3.33
        assert_eq!(lots_to_buy(&share(10), dec!(100000), dec!(300), dec!(0.1)).unwrap(), 3);
    }

    #[test]
    fn test_at_least_one_lot_when_capital_covers_a_lot() {
        for fraction in [dec!(0.01), dec!(0.1), dec!(0.5), dec!(1)] {
            for capital in [dec!(2500), dec!(2600), dec!(10000), dec!(1000000)] {
                let lots = lots_to_buy(&share(10), capital, dec!(250), fraction).unwrap();
                assert!(lots >= 1, "fraction {fraction}, capital {capital}");
            }
        }
    }

    #[test]
    fn test_whole_capital_buys_exact_lots() {
        assert_eq!(lots_to_buy(&share(1), dec!(1000), dec!(100), dec!(1)).unwrap(), 10);
    }

    #[test]
    fn test_rejects_degenerate_inputs() {
        assert!(lots_to_buy(&share(10), dec!(1000), dec!(0), dec!(0.1)).is_err());
        assert!(lots_to_buy(&share(0), dec!(1000), dec!(10), dec!(0.1)).is_err());
        assert!(lots_to_buy(&share(10), dec!(1000), dec!(10), dec!(0)).is_err());
        assert!(lots_to_buy(&share(10), dec!(1000), dec!(10), dec!(1.5)).is_err());
    }
}
