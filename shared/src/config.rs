use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::points::PointsPolicy;
use crate::{DEFAULT_ANALYSIS_TIMEOUT, DEFAULT_PLAN_TIMEOUT, MAX_TIMEOUT};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration document: {0}")]
    Parse(String),
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
    #[error("{field} exceeds maximum of {max_ms}ms")]
    TimeoutTooLong { field: &'static str, max_ms: u64 },
    #[error("{field} must be greater than zero")]
    ZeroPoints { field: &'static str },
}

/// Runtime settings the shell may hand to the core before a trip starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardConfig {
    pub points: PointsPolicy,
    pub analysis_timeout_ms: u64,
    pub plan_timeout_ms: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            points: PointsPolicy::default(),
            analysis_timeout_ms: duration_ms(DEFAULT_ANALYSIS_TIMEOUT),
            plan_timeout_ms: duration_ms(DEFAULT_PLAN_TIMEOUT),
        }
    }
}

impl WizardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("analysis_timeout_ms", self.analysis_timeout_ms)?;
        check_timeout("plan_timeout_ms", self.plan_timeout_ms)?;

        if self.points.national_cost == 0 {
            return Err(ConfigError::ZeroPoints {
                field: "points.national_cost",
            });
        }
        if self.points.international_cost == 0 {
            return Err(ConfigError::ZeroPoints {
                field: "points.international_cost",
            });
        }
        if self.points.ad_reward == 0 {
            return Err(ConfigError::ZeroPoints {
                field: "points.ad_reward",
            });
        }
        Ok(())
    }
}

fn check_timeout(field: &'static str, ms: u64) -> Result<(), ConfigError> {
    let max_ms = duration_ms(MAX_TIMEOUT);
    if ms == 0 {
        return Err(ConfigError::ZeroTimeout { field });
    }
    if ms > max_ms {
        return Err(ConfigError::TimeoutTooLong { field, max_ms });
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
const fn duration_ms(d: Duration) -> u64 {
    d.as_millis() as u64
}
