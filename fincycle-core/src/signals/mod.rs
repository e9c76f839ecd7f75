//! Trading signal generation: SMA crossover with a volatility veto, plus a
//! short-horizon least-squares price forecast.
//!
//! Signals are decision *inputs*, never orders. A snapshot is derived fresh
//! from the supplied history on every call; nothing here is stored.

use serde::{Deserialize, Serialize};

use crate::stats;

/// Discrete trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
        }
    }
}

/// Derived signal state for one history: direction, confidence, volatility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub signal: Signal,
    /// Confidence score, always within 0..=100.
    pub confidence: u8,
    pub volatility: f64,
}

/// Analyzer tuning. Defaults reproduce the standard 5/20 crossover with a
/// 1% breakout band and a hard volatility veto at 6%.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub short_period: usize,
    pub long_period: usize,
    /// Crossover must clear the long SMA by this fraction to fire.
    pub breakout_band: f64,
    /// Below this volatility a buy gains bonus confidence.
    pub calm_volatility: f64,
    /// Above this volatility a sell gains bonus confidence.
    pub choppy_volatility: f64,
    /// Above this volatility every signal is vetoed to hold.
    pub veto_volatility: f64,
    /// Points used by the least-squares forecast.
    pub forecast_window: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            short_period: 5,
            long_period: 20,
            breakout_band: 0.01,
            calm_volatility: 0.02,
            choppy_volatility: 0.03,
            veto_volatility: 0.06,
            forecast_window: 10,
        }
    }
}

/// Converts a price history into a signal snapshot and a one-step forecast.
#[derive(Debug, Clone)]
pub struct SignalAnalyzer {
    config: SignalConfig,
}

impl SignalAnalyzer {
    pub fn new(config: SignalConfig) -> Self {
        assert!(config.short_period >= 1, "short period must be >= 1");
        assert!(
            config.long_period >= config.short_period,
            "long period must be >= short period"
        );
        assert!(config.forecast_window >= 2, "forecast window must be >= 2");
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Crossover signal with confidence, vetoed to hold in high-vol regimes.
    ///
    /// With insufficient data the short SMA falls back to the last price and
    /// the long SMA to the short one. The veto takes precedence over any
    /// crossover state.
    pub fn analyze(&self, history: &[f64]) -> SignalSnapshot {
        let Some(&price) = history.last() else {
            return SignalSnapshot {
                signal: Signal::Hold,
                confidence: 0,
                volatility: 0.0,
            };
        };

        let short = stats::sma(history, self.config.short_period).unwrap_or(price);
        let long = stats::sma(history, self.config.long_period).unwrap_or(short);
        let volatility = stats::realized_volatility(history);

        let mut signal = Signal::Hold;
        let mut confidence: i32 = 10;

        if short > long * (1.0 + self.config.breakout_band) && price > long {
            signal = Signal::Buy;
            confidence = 70;
            if volatility < self.config.calm_volatility {
                confidence += 20;
            }
        } else if short < long * (1.0 - self.config.breakout_band) && price < long {
            signal = Signal::Sell;
            confidence = 70;
            if volatility > self.config.choppy_volatility {
                confidence += 20;
            }
        }

        // Volatility veto beats any crossover.
        if volatility > self.config.veto_volatility {
            signal = Signal::Hold;
            confidence = 20;
        }

        SignalSnapshot {
            signal,
            confidence: confidence.clamp(0, 100) as u8,
            volatility,
        }
    }

    /// One-step-ahead price forecast: ordinary least squares over the last
    /// `forecast_window` points, extrapolated one step past the window and
    /// floored at zero. Fewer than 3 points returns the last price; an empty
    /// history returns 0.
    pub fn forecast(&self, history: &[f64]) -> f64 {
        let Some(&last) = history.last() else {
            return 0.0;
        };
        if history.len() < 3 {
            return last;
        }

        let n = self.config.forecast_window.min(history.len());
        let window = &history[history.len() - n..];
        let n_f = n as f64;
        let mean_x = (n_f - 1.0) / 2.0;
        let mean_y = window.iter().sum::<f64>() / n_f;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in window.iter().enumerate() {
            let dx = i as f64 - mean_x;
            numerator += dx * (y - mean_y);
            denominator += dx * dx;
        }

        let slope = numerator / denominator;
        let intercept = mean_y - slope * mean_x;
        (intercept + slope * n_f).max(0.0)
    }
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}
