//! FinCycle Core — an autonomous personal-finance agent simulator.
//!
//! Once per discrete cycle the engine observes a synthetic financial state,
//! decides whether to invest, repay, save, or hold, executes that decision
//! against a simulated market and cash account, and scores the decision with
//! a reward signal:
//! - Market process: geometric random walk over a small instrument universe
//! - Signal generator: SMA crossover with a volatility veto + OLS forecast
//! - Sizing policy: recurring ("SIP") contributions and opportunistic
//!   lump-sums gated by risk profile
//! - Portfolio ledger: currency/unit conversion and position cash
//! - Cycle engine: the eight-phase decision pipeline and reward scoring
//!
//! Persistence and transport are collaborator concerns behind the sink
//! traits; the core performs no blocking I/O of its own.

pub mod config;
pub mod domain;
pub mod engine;
pub mod market;
pub mod rng;
pub mod signals;
pub mod sink;
pub mod sizing;
pub mod stats;
