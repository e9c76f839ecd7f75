//! Simulated market: geometric random walk over a small instrument universe.
//!
//! Each instrument advances one step per cycle via
//! `S_{t+1} = S_t * exp((mu - 0.5*sigma^2) + sigma * z)` with `z ~ N(0, 1)`.
//! Prices are guaranteed strictly positive and never flat between steps: a
//! degenerate draw is replaced by a fixed ±0.3% nudge whose sign follows `z`.
//!
//! Advancing is exclusively the cycle engine's job — every read here is
//! `&self`, so concurrent readers cannot accidentally double-step the walk.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::stats;

/// Relative tolerance below which a step counts as flat and gets nudged.
const FLAT_EPSILON: f64 = 1e-6;

/// Size of the directional nudge applied to degenerate steps (0.3%).
const NUDGE_FRACTION: f64 = 0.003;

/// Static description of one simulated instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentSpec {
    pub symbol: String,
    pub initial_price: f64,
    /// Per-step log drift (mu).
    pub drift: f64,
    /// Per-step volatility (sigma).
    pub volatility: f64,
}

impl InstrumentSpec {
    pub fn new(symbol: &str, initial_price: f64, drift: f64, volatility: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            initial_price,
            drift,
            volatility,
        }
    }
}

/// Market process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub instruments: Vec<InstrumentSpec>,
    /// Symbol unknown lookups resolve to.
    pub default_symbol: String,
    /// Bounded history length; oldest prices are evicted past this.
    pub history_cap: usize,
    /// Steps synthesized at construction so statistics are never degenerate.
    pub bootstrap_steps: usize,
    /// Safety band `set_volatility` clamps into.
    pub min_volatility: f64,
    pub max_volatility: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            instruments: vec![
                // Daily drift ~0.08% (about 20% annualized), vol 2% daily.
                InstrumentSpec::new("INDEX", 100.0, 0.0008, 0.02),
                InstrumentSpec::new("STOCK_A", 60.0, 0.0010, 0.03),
                InstrumentSpec::new("STOCK_B", 140.0, 0.0004, 0.025),
            ],
            default_symbol: "INDEX".to_string(),
            history_cap: 2000,
            bootstrap_steps: 200,
            min_volatility: 0.005,
            max_volatility: 0.05,
        }
    }
}

/// One tracked instrument: current price plus bounded price history.
#[derive(Debug, Clone)]
struct Instrument {
    symbol: String,
    price: f64,
    drift: f64,
    volatility: f64,
    history: VecDeque<f64>,
}

impl Instrument {
    fn from_spec(spec: &InstrumentSpec) -> Self {
        Self {
            symbol: spec.symbol.clone(),
            price: spec.initial_price,
            drift: spec.drift,
            volatility: spec.volatility,
            history: VecDeque::new(),
        }
    }

    /// One walk step from a standard-normal draw.
    fn step(&mut self, z: f64, history_cap: usize) {
        let log_return = (self.drift - 0.5 * self.volatility * self.volatility) + self.volatility * z;
        let mut next = self.price * log_return.exp();

        // Strict positivity and no flat steps: replace degenerate moves with
        // a fixed directional nudge.
        if next <= 0.0 || (next - self.price).abs() < FLAT_EPSILON * self.price {
            let direction = if z >= 0.0 { 1.0 } else { -1.0 };
            next = self.price * (1.0 + NUDGE_FRACTION * direction);
        }

        self.price = next;
        self.history.push_back(next);
        if self.history.len() > history_cap {
            self.history.pop_front();
        }
    }
}

/// Snapshot of one instrument's statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMetrics {
    pub history: Vec<f64>,
    pub current_price: f64,
    /// Realized volatility of the history (population std of step returns).
    pub volatility: f64,
    /// `last / first - 1` over the retained history.
    pub total_return: f64,
}

/// The market process: instrument universe plus its RNG stream.
#[derive(Debug)]
pub struct MarketProcess {
    instruments: Vec<Instrument>,
    default_symbol: String,
    history_cap: usize,
    vol_band: (f64, f64),
    rng: StdRng,
}

impl MarketProcess {
    /// Build the market and bootstrap `bootstrap_steps` steps of history so
    /// downstream statistics are never computed over an empty series.
    pub fn new(config: &MarketConfig, rng: StdRng) -> Self {
        assert!(
            !config.instruments.is_empty(),
            "market needs at least one instrument"
        );
        assert!(
            config
                .instruments
                .iter()
                .any(|spec| spec.symbol == config.default_symbol),
            "default symbol {:?} must be a configured instrument",
            config.default_symbol
        );

        let mut market = Self {
            instruments: config.instruments.iter().map(Instrument::from_spec).collect(),
            default_symbol: config.default_symbol.clone(),
            history_cap: config.history_cap.max(1),
            vol_band: (config.min_volatility, config.max_volatility),
            rng,
        };
        for _ in 0..config.bootstrap_steps {
            market.advance();
        }
        market
    }

    /// Advance every instrument by one step.
    pub fn advance(&mut self) {
        for i in 0..self.instruments.len() {
            let z: f64 = self.rng.sample(StandardNormal);
            self.instruments[i].step(z, self.history_cap);
        }
    }

    /// Current price. Unknown symbols resolve to the default instrument; a
    /// read never advances the walk.
    pub fn price(&self, symbol: &str) -> f64 {
        self.resolve(symbol).price
    }

    /// Owned copy of the price history (callers cannot mutate internals).
    pub fn history(&self, symbol: &str) -> Vec<f64> {
        self.resolve(symbol).history.iter().copied().collect()
    }

    /// Symbol -> current price map, for ledger valuation.
    pub fn prices(&self) -> HashMap<String, f64> {
        self.instruments
            .iter()
            .map(|inst| (inst.symbol.clone(), inst.price))
            .collect()
    }

    /// History, current price, realized volatility, and total return.
    pub fn metrics(&self, symbol: &str) -> MarketMetrics {
        let inst = self.resolve(symbol);
        let history: Vec<f64> = inst.history.iter().copied().collect();
        let current_price = history.last().copied().unwrap_or(inst.price);
        let volatility = stats::realized_volatility(&history);
        let total_return = match history.first() {
            Some(&first) if history.len() >= 2 && first > 0.0 => current_price / first - 1.0,
            _ => 0.0,
        };
        MarketMetrics {
            history,
            current_price,
            volatility,
            total_return,
        }
    }

    /// Set an instrument's walk volatility, clamped into the safety band.
    pub fn set_volatility(&mut self, symbol: &str, sigma: f64) {
        let (lo, hi) = self.vol_band;
        let clamped = sigma.clamp(lo, hi);
        self.resolve_mut(symbol).volatility = clamped;
    }

    pub fn default_symbol(&self) -> &str {
        &self.default_symbol
    }

    pub fn symbols(&self) -> Vec<String> {
        self.instruments.iter().map(|i| i.symbol.clone()).collect()
    }

    fn resolve(&self, symbol: &str) -> &Instrument {
        self.instruments
            .iter()
            .find(|inst| inst.symbol == symbol)
            .unwrap_or_else(|| {
                self.instruments
                    .iter()
                    .find(|inst| inst.symbol == self.default_symbol)
                    .expect("default instrument exists by construction")
            })
    }

    fn resolve_mut(&mut self, symbol: &str) -> &mut Instrument {
        let idx = self
            .instruments
            .iter()
            .position(|inst| inst.symbol == symbol)
            .unwrap_or_else(|| {
                self.instruments
                    .iter()
                    .position(|inst| inst.symbol == self.default_symbol)
                    .expect("default instrument exists by construction")
            });
        &mut self.instruments[idx]
    }
}
