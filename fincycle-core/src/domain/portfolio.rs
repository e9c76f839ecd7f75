//! Portfolio ledger — converts currency into instrument units and back.
//!
//! Ledger cash only holds realized sale proceeds; the overall bank balance
//! lives in `AccountState`. The two are deliberately separate: the ledger
//! tracks position cash, not total liquidity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Outcome classification for a single buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Filled,
    /// Non-positive requested amount; nothing happened.
    Noop,
    /// Non-positive price or nothing to sell; nothing happened.
    Failed,
}

/// Result of one ledger operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub status: TradeStatus,
    pub symbol: String,
    /// Currency actually converted (post-clamp for sells).
    pub amount: f64,
    /// Units moved.
    pub units: f64,
    /// Execution price; 0 when no conversion happened.
    pub price: f64,
}

impl TradeResult {
    fn noop(symbol: &str) -> Self {
        Self {
            status: TradeStatus::Noop,
            symbol: symbol.to_string(),
            amount: 0.0,
            units: 0.0,
            price: 0.0,
        }
    }

    fn failed(symbol: &str) -> Self {
        Self {
            status: TradeStatus::Failed,
            symbol: symbol.to_string(),
            amount: 0.0,
            units: 0.0,
            price: 0.0,
        }
    }
}

/// Cash plus per-symbol unit holdings.
///
/// A symbol that reaches exactly zero units is removed from the map — zero
/// positions are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash: f64,
    pub positions: HashMap<String, f64>,
}

impl Portfolio {
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            positions: HashMap::new(),
        }
    }

    /// Convert `amount` of currency into units at `price`.
    pub fn buy(&mut self, symbol: &str, amount: f64, price: f64) -> TradeResult {
        let amount = amount.max(0.0);
        if amount <= 0.0 {
            return TradeResult::noop(symbol);
        }
        if price <= 0.0 {
            return TradeResult::failed(symbol);
        }

        let units = amount / price;
        *self.positions.entry(symbol.to_string()).or_insert(0.0) += units;

        TradeResult {
            status: TradeStatus::Filled,
            symbol: symbol.to_string(),
            amount,
            units,
            price,
        }
    }

    /// Realize up to `amount` of currency by selling units at `price`.
    ///
    /// The request is clamped to the cash realizable from the units actually
    /// held; proceeds are credited to ledger cash.
    pub fn sell(&mut self, symbol: &str, amount: f64, price: f64) -> TradeResult {
        let amount = amount.max(0.0);
        if amount <= 0.0 {
            return TradeResult::noop(symbol);
        }
        let units_owned = self.positions.get(symbol).copied().unwrap_or(0.0);
        if units_owned <= 0.0 || price <= 0.0 {
            return TradeResult::failed(symbol);
        }

        let max_cash = units_owned * price;
        let sell_cash = amount.min(max_cash);
        // A clamped (full-liquidation) sell takes the exact unit count so no
        // float residue can leave a phantom position behind.
        let units = if sell_cash >= max_cash {
            units_owned
        } else {
            sell_cash / price
        };

        let remaining = (units_owned - units).max(0.0);
        if remaining == 0.0 {
            self.positions.remove(symbol);
        } else {
            self.positions.insert(symbol.to_string(), remaining);
        }
        self.cash += sell_cash;

        TradeResult {
            status: TradeStatus::Filled,
            symbol: symbol.to_string(),
            amount: sell_cash,
            units,
            price,
        }
    }

    /// Units held for a symbol (0 if absent).
    pub fn units(&self, symbol: &str) -> f64 {
        self.positions.get(symbol).copied().unwrap_or(0.0)
    }

    /// Market value of held units only.
    pub fn holdings_value(&self, prices: &HashMap<String, f64>) -> f64 {
        self.positions
            .iter()
            .map(|(symbol, units)| units * prices.get(symbol).copied().unwrap_or(0.0))
            .sum()
    }

    /// Ledger cash + market value of held units.
    pub fn value(&self, prices: &HashMap<String, f64>) -> f64 {
        self.cash + self.holdings_value(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn buy_accumulates_units() {
        let mut ledger = Portfolio::new(0.0);
        let result = ledger.buy("INDEX", 100.0, 50.0);
        assert_eq!(result.status, TradeStatus::Filled);
        assert_eq!(result.units, 2.0);
        assert_eq!(ledger.units("INDEX"), 2.0);

        ledger.buy("INDEX", 50.0, 50.0);
        assert_eq!(ledger.units("INDEX"), 3.0);
    }

    #[test]
    fn buy_zero_amount_is_noop() {
        let mut ledger = Portfolio::new(0.0);
        let result = ledger.buy("INDEX", 0.0, 50.0);
        assert_eq!(result.status, TradeStatus::Noop);
        assert!(ledger.positions.is_empty());
    }

    #[test]
    fn buy_negative_amount_is_noop() {
        let mut ledger = Portfolio::new(0.0);
        assert_eq!(ledger.buy("INDEX", -5.0, 50.0).status, TradeStatus::Noop);
    }

    #[test]
    fn buy_zero_price_fails() {
        let mut ledger = Portfolio::new(0.0);
        let result = ledger.buy("INDEX", 100.0, 0.0);
        assert_eq!(result.status, TradeStatus::Failed);
        assert!(ledger.positions.is_empty());
    }

    #[test]
    fn sell_clamps_to_held_units() {
        // Buy 100 at 50 -> 2 units. Over-request 1000: clamps to 100 cash,
        // position removed, ledger cash credited.
        let mut ledger = Portfolio::new(0.0);
        ledger.buy("INDEX", 100.0, 50.0);

        let result = ledger.sell("INDEX", 1000.0, 50.0);
        assert_eq!(result.status, TradeStatus::Filled);
        assert_eq!(result.amount, 100.0);
        assert_eq!(result.units, 2.0);
        assert_eq!(ledger.units("INDEX"), 0.0);
        assert!(!ledger.positions.contains_key("INDEX"));
        assert_eq!(ledger.cash, 100.0);
    }

    #[test]
    fn partial_sell_keeps_position() {
        let mut ledger = Portfolio::new(0.0);
        ledger.buy("INDEX", 100.0, 50.0);
        let result = ledger.sell("INDEX", 25.0, 50.0);
        assert_eq!(result.units, 0.5);
        assert_eq!(ledger.units("INDEX"), 1.5);
        assert_eq!(ledger.cash, 25.0);
    }

    #[test]
    fn sell_without_position_fails() {
        let mut ledger = Portfolio::new(0.0);
        assert_eq!(ledger.sell("INDEX", 100.0, 50.0).status, TradeStatus::Failed);
    }

    #[test]
    fn sell_zero_amount_is_noop() {
        let mut ledger = Portfolio::new(0.0);
        ledger.buy("INDEX", 100.0, 50.0);
        assert_eq!(ledger.sell("INDEX", 0.0, 50.0).status, TradeStatus::Noop);
        assert_eq!(ledger.units("INDEX"), 2.0);
    }

    #[test]
    fn value_is_cash_plus_holdings() {
        let mut ledger = Portfolio::new(10.0);
        ledger.buy("INDEX", 100.0, 50.0);
        ledger.buy("STOCK_A", 30.0, 60.0);
        let p = prices(&[("INDEX", 55.0), ("STOCK_A", 60.0)]);
        // 10 cash + 2 * 55 + 0.5 * 60 = 150
        assert!((ledger.value(&p) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn missing_price_values_position_at_zero() {
        let mut ledger = Portfolio::new(0.0);
        ledger.buy("INDEX", 100.0, 50.0);
        assert_eq!(ledger.value(&HashMap::new()), 0.0);
    }
}
