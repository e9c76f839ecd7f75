//! Risk profiles — fixed policy coefficient sets selected from realized
//! volatility, never set by the user.

use serde::{Deserialize, Serialize};

/// Policy coefficients attached to a risk profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Volatility ceiling for investing at all.
    pub max_vol: f64,
    /// Maximum fraction of liquid assets allocated to the instrument.
    pub max_alloc: f64,
    /// Lump-sum amount = recurring contribution * this. Zero disables
    /// lump-sum entirely.
    pub lumpsum_factor: f64,
    /// Scales the recurring contribution.
    pub sip_factor: f64,
}

/// Risk posture derived from the current market regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Balanced,
    Aggressive,
}

impl RiskProfile {
    /// Pick the profile for a realized volatility level. Calm markets allow
    /// aggression; turbulent markets force conservatism.
    pub fn from_volatility(volatility: f64) -> Self {
        if volatility < 0.02 {
            RiskProfile::Aggressive
        } else if volatility < 0.035 {
            RiskProfile::Balanced
        } else {
            RiskProfile::Conservative
        }
    }

    pub fn params(self) -> RiskParams {
        match self {
            RiskProfile::Conservative => RiskParams {
                max_vol: 0.02,
                max_alloc: 0.03,
                lumpsum_factor: 0.0,
                sip_factor: 0.7,
            },
            RiskProfile::Balanced => RiskParams {
                max_vol: 0.03,
                max_alloc: 0.06,
                lumpsum_factor: 1.0,
                sip_factor: 1.0,
            },
            RiskProfile::Aggressive => RiskParams {
                max_vol: 0.05,
                max_alloc: 0.12,
                lumpsum_factor: 2.0,
                sip_factor: 1.5,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Balanced => "balanced",
            RiskProfile::Aggressive => "aggressive",
        }
    }
}
