//! Points economy: what a route costs to unlock and what an ad pays.
//!
//! Both the paywall screen and the confirm guard go through [`PointsPolicy::unlock_cost`],
//! so the price shown is always the price charged.

use serde::{Deserialize, Serialize};

use crate::model::TripAnalysis;

pub const NATIONAL_TRIP_COST: u32 = 50;
pub const INTERNATIONAL_TRIP_COST: u32 = 100;
pub const AD_REWARD_POINTS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointsPolicy {
    pub national_cost: u32,
    pub international_cost: u32,
    pub ad_reward: u32,
}

impl Default for PointsPolicy {
    fn default() -> Self {
        Self {
            national_cost: NATIONAL_TRIP_COST,
            international_cost: INTERNATIONAL_TRIP_COST,
            ad_reward: AD_REWARD_POINTS,
        }
    }
}

/// Outcome of checking a balance against the unlock price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockDecision {
    Affordable { cost: u32 },
    Insufficient { cost: u32, shortfall: u32 },
}

impl PointsPolicy {
    #[must_use]
    pub const fn unlock_cost(&self, analysis: &TripAnalysis) -> u32 {
        if analysis.is_international {
            self.international_cost
        } else {
            self.national_cost
        }
    }

    #[must_use]
    pub const fn decide(&self, analysis: &TripAnalysis, balance: u32) -> UnlockDecision {
        let cost = self.unlock_cost(analysis);
        if balance >= cost {
            UnlockDecision::Affordable { cost }
        } else {
            UnlockDecision::Insufficient {
                cost,
                shortfall: cost - balance,
            }
        }
    }

    /// Ads needed to close the gap; zero when the balance already covers the price.
    #[must_use]
    pub const fn ads_needed(&self, analysis: &TripAnalysis, balance: u32) -> u32 {
        match self.decide(analysis, balance) {
            UnlockDecision::Affordable { .. } => 0,
            UnlockDecision::Insufficient { shortfall, .. } => {
                if self.ad_reward == 0 {
                    u32::MAX
                } else {
                    shortfall.div_ceil(self.ad_reward)
                }
            }
        }
    }
}

impl UnlockDecision {
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Affordable { cost } | Self::Insufficient { cost, .. } => cost,
        }
    }

    #[must_use]
    pub const fn is_affordable(self) -> bool {
        matches!(self, Self::Affordable { .. })
    }
}
