//! Reward scoring — a pure function of the cycle's outcome.
//!
//! Driven by the NAV change over the cycle, with full credit when the agent
//! actually invested and partial credit for passive holding, minus small
//! penalties for liquidity and volatility risk. Terms sum without clamping,
//! so the reward can be negative.

use crate::domain::ExecStatus;

/// Weight on the NAV change when the cycle did not invest.
const PASSIVE_WEIGHT: f64 = 0.2;

/// Penalty for a breached emergency buffer.
const BUFFER_PENALTY: f64 = 0.5;

/// Volatility penalty thresholds and sizes; the two penalties stack.
const VOL_PENALTY_THRESHOLD: f64 = 0.04;
const VOL_PENALTY: f64 = 0.2;
const VOL_SPIKE_THRESHOLD: f64 = 0.07;
const VOL_SPIKE_PENALTY: f64 = 0.5;

/// Bonus for an execution that actually did something safe-or-filled.
const EXECUTION_BONUS: f64 = 0.05;

/// Score one completed cycle.
///
/// `invest_amount` is the cash actually moved into the ledger this cycle
/// (0 when passive); `nav_history` must already include this cycle's NAV.
pub fn compute_reward(
    nav_history: &[f64],
    invest_amount: f64,
    emergency_buffer_ok: bool,
    volatility: f64,
    status: ExecStatus,
) -> f64 {
    let mut reward = 0.0;

    // Profit component: this cycle's NAV change, weighted down when merely
    // holding. Fewer than two NAV points contributes nothing.
    if nav_history.len() >= 2 {
        let nav_change = nav_history[nav_history.len() - 1] - nav_history[nav_history.len() - 2];
        if invest_amount > 0.0 {
            reward += nav_change;
        } else {
            reward += nav_change * PASSIVE_WEIGHT;
        }
    }

    if !emergency_buffer_ok {
        reward -= BUFFER_PENALTY;
    }

    if volatility > VOL_PENALTY_THRESHOLD {
        reward -= VOL_PENALTY;
    }
    if volatility > VOL_SPIKE_THRESHOLD {
        reward -= VOL_SPIKE_PENALTY;
    }

    if matches!(status, ExecStatus::Filled | ExecStatus::Saved) {
        reward += EXECUTION_BONUS;
    }

    reward
}
