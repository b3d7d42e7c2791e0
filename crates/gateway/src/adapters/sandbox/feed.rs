//! Price feeds for sandbox instruments
//!
//! Each call to the venue's last-price endpoint advances the feed by one
//! step; fills execute at the most recently observed price.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::collections::VecDeque;

/// Source of last-trade prices for one instrument
#[derive(Debug)]
pub enum PriceFeed {
    /// Always the same price
    Fixed(Decimal),
    /// Prices served in order; the last one repeats once the path runs out
    Scripted {
        path: VecDeque<Decimal>,
        current: Decimal,
    },
    /// Multiplicative random walk, `price * (1 + volatility * u)`, `u ∈ [-1, 1)`
    RandomWalk {
        current: Decimal,
        volatility: f64,
        rng: StdRng,
    },
}

impl PriceFeed {
    pub fn fixed(price: Decimal) -> Self {
        PriceFeed::Fixed(price)
    }

    /// Scripted path; the first price is current before any tick
    pub fn scripted(path: impl IntoIterator<Item = Decimal>) -> Self {
        let path: VecDeque<Decimal> = path.into_iter().collect();
        let current = path.front().copied().unwrap_or(Decimal::ZERO);
        PriceFeed::Scripted { path, current }
    }

    pub fn random_walk(start: Decimal, volatility: Decimal, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        PriceFeed::RandomWalk {
            current: start,
            volatility: volatility.to_f64().unwrap_or(0.0),
            rng,
        }
    }

    /// Price fills execute at
    pub fn current(&self) -> Decimal {
        match self {
            PriceFeed::Fixed(price) => *price,
            PriceFeed::Scripted { current, .. } => *current,
            PriceFeed::RandomWalk { current, .. } => *current,
        }
    }

    /// Advance one observation and return it
    pub fn tick(&mut self) -> Decimal {
        match self {
            PriceFeed::Fixed(price) => *price,
            PriceFeed::Scripted { path, current } => {
                if let Some(next) = path.pop_front() {
                    *current = next;
                }
                *current
            }
            PriceFeed::RandomWalk {
                current,
                volatility,
                rng,
            } => {
                let change: f64 = rng.gen_range(-1.0..1.0);
                let multiplier =
                    Decimal::from_f64(1.0 + *volatility * change).unwrap_or(Decimal::ONE);
                let next = (*current * multiplier).round_dp(2);
                if next > Decimal::ZERO {
                    *current = next;
                }
                *current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scripted_feed_repeats_last_price() {
        let mut feed = PriceFeed::scripted([dec!(100), dec!(101), dec!(99)]);
        assert_eq!(feed.current(), dec!(100));
        assert_eq!(feed.tick(), dec!(100));
        assert_eq!(feed.tick(), dec!(101));
        assert_eq!(feed.tick(), dec!(99));
        assert_eq!(feed.tick(), dec!(99));
        assert_eq!(feed.current(), dec!(99));
    }

    #[test]
    fn test_random_walk_stays_positive_and_near_start() {
        let mut feed = PriceFeed::random_walk(dec!(100), dec!(0.001), Some(42));
        for _ in 0..100 {
            let price = feed.tick();
            assert!(price > dec!(80) && price < dec!(120));
        }
    }

    #[test]
    fn test_seeded_random_walks_are_reproducible() {
        let mut a = PriceFeed::random_walk(dec!(250), dec!(0.01), Some(7));
        let mut b = PriceFeed::random_walk(dec!(250), dec!(0.01), Some(7));
        for _ in 0..20 {
            assert_eq!(a.tick(), b.tick());
        }
    }
}
