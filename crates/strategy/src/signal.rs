//! Exit signal evaluation
//!
//! Stateless per tick: the decision depends only on the entry price and the
//! current price, never on how the price got there.
//!
//! ```text
//! profit          = current - entry
//! commission_cost = (entry + current) * commission_rate
//! margin_pct      = 100 * (profit - commission_cost) / entry
//! stop_price      = entry * (1 - stop_loss_pct)
//! sell            = margin_pct >= target_profit_pct * 100 || current <= stop_price
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tradecycle_core::Price;

use crate::error::{Error, Result};

/// Exit thresholds, as fractions (0.01 = 1%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalParams {
    pub stop_loss_pct: Decimal,
    pub target_profit_pct: Decimal,
    pub commission_rate: Decimal,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            stop_loss_pct: dec!(0.01),
            target_profit_pct: dec!(0.01),
            commission_rate: dec!(0.0004),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Hold,
    Sell(ExitReason),
}

/// Intermediate values of one tick, kept for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub entry_price: Price,
    pub current_price: Price,
    pub profit: Decimal,
    pub commission_cost: Decimal,
    pub margin_pct: Decimal,
    pub stop_price: Price,
    pub decision: ExitDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvaluator {
    params: SignalParams,
}

impl SignalEvaluator {
    pub fn new(params: SignalParams) -> Self {
        Self { params }
    }

    pub fn evaluate(&self, entry_price: Price, current_price: Price) -> Result<Evaluation> {
        if entry_price <= Decimal::ZERO {
            return Err(Error::InvalidEntryPrice { entry_price });
        }

        let profit = current_price - entry_price;
        let commission_cost = (entry_price + current_price) * self.params.commission_rate;
        let margin_pct = dec!(100) * (profit - commission_cost) / entry_price;
        let stop_price = entry_price * (Decimal::ONE - self.params.stop_loss_pct);

        // Take-profit wins when both hold (only possible with odd parameters)
        let decision = if margin_pct >= self.params.target_profit_pct * dec!(100) {
            ExitDecision::Sell(ExitReason::TakeProfit)
        } else if current_price <= stop_price {
            ExitDecision::Sell(ExitReason::StopLoss)
        } else {
            ExitDecision::Hold
        };

        Ok(Evaluation {
            entry_price,
            current_price,
            profit,
            commission_cost,
            margin_pct,
            stop_price,
            decision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> SignalEvaluator {
        SignalEvaluator::new(SignalParams::default())
    }

    fn decide(entry: Decimal, current: Decimal) -> ExitDecision {
        evaluator().evaluate(entry, current).unwrap().decision
    }

    #[test]
    fn test_stop_loss() {
        assert_eq!(
            decide(dec!(100), dec!(98.9)),
            ExitDecision::Sell(ExitReason::StopLoss)
        );
        // Exactly at the stop price
        assert_eq!(
            decide(dec!(100), dec!(99)),
            ExitDecision::Sell(ExitReason::StopLoss)
        );
    }

    #[test]
    fn test_take_profit() {
        assert_eq!(
            decide(dec!(100), dec!(101.5)),
            ExitDecision::Sell(ExitReason::TakeProfit)
        );
    }

    #[test]
    fn test_hold_inside_band() {
        assert_eq!(decide(dec!(100), dec!(100.3)), ExitDecision::Hold);
        // 1% gross is not enough once both legs pay commission
        assert_eq!(decide(dec!(100), dec!(101)), ExitDecision::Hold);
    }

    #[test]
    fn test_margin_accounts_for_both_legs() {
        let eval = evaluator().evaluate(dec!(100), dec!(101.5)).unwrap();
        assert_eq!(eval.profit, dec!(1.5));
        assert_eq!(eval.commission_cost, dec!(0.0806));
        assert_eq!(eval.margin_pct, dec!(1.4194));
        assert_eq!(eval.stop_price, dec!(99));
    }

    #[test]
    fn test_decision_ignores_tick_history() {
        let eval = evaluator();
        let path = [dec!(100.3), dec!(99.5), dec!(100.9), dec!(98.9), dec!(101.5)];
        let direct: Vec<_> = path
            .iter()
            .map(|p| eval.evaluate(dec!(100), *p).unwrap().decision)
            .collect();
        let reversed: Vec<_> = path
            .iter()
            .rev()
            .map(|p| eval.evaluate(dec!(100), *p).unwrap().decision)
            .collect();
        assert_eq!(direct, reversed.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_non_positive_entry_price_fails() {
        assert!(matches!(
            evaluator().evaluate(dec!(0), dec!(10)),
            Err(Error::InvalidEntryPrice { .. })
        ));
        assert!(evaluator().evaluate(dec!(-1), dec!(10)).is_err());
    }
}
