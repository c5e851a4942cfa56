//! Engine configuration - rest requirements, antagonist pairs, timer defaults

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::balance::AntagonistPair;
use crate::engine::readiness::{
    DEFAULT_REST_HOURS, FlatRestHours, LearnedRestHours, RestHoursStrategy,
};
use crate::muscles::{self, BodyPart};
use crate::timer::DEFAULT_REST_COUNTDOWN_SECS;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("rest hours for {0} must be positive, got {1}")]
    InvalidRestHours(String, f64),

    #[error("antagonist ratio for {0}/{1} must be greater than 1, got {2}")]
    InvalidRatio(String, String, f64),

    #[error("antagonist pair compares {0} with itself")]
    SelfPair(String),

    #[error("top_n must be at least 1")]
    ZeroTopN,

    #[error("rest countdown must be at least 1 second")]
    ZeroRestCountdown,
}

/// How recommended rest hours are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestStrategyKind {
    /// Flat default with per body part overrides
    #[default]
    Flat,
    /// Median of the user's own gaps, falling back to flat
    Learned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_rest_hours: f64,
    /// Raw muscle names are normalized when the strategy is built
    pub rest_hours_by_body_part: BTreeMap<String, f64>,
    pub rest_strategy: RestStrategyKind,
    pub antagonist_pairs: Vec<AntagonistPair>,
    /// Entries per top-performance category
    pub top_n: usize,
    pub rest_countdown_secs: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_rest_hours: DEFAULT_REST_HOURS,
            rest_hours_by_body_part: BTreeMap::new(),
            rest_strategy: RestStrategyKind::Flat,
            antagonist_pairs: vec![AntagonistPair::chest_back()],
            top_n: 3,
            rest_countdown_secs: DEFAULT_REST_COUNTDOWN_SECS,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.default_rest_hours) {
            return Err(ConfigError::InvalidRestHours(
                "default".to_string(),
                self.default_rest_hours,
            ));
        }
        for (part, hours) in &self.rest_hours_by_body_part {
            if !is_positive(*hours) {
                return Err(ConfigError::InvalidRestHours(part.clone(), *hours));
            }
        }
        for pair in &self.antagonist_pairs {
            if pair.first == pair.second {
                return Err(ConfigError::SelfPair(pair.first.to_string()));
            }
            if !pair.max_ratio.is_finite() || pair.max_ratio <= 1.0 {
                return Err(ConfigError::InvalidRatio(
                    pair.first.to_string(),
                    pair.second.to_string(),
                    pair.max_ratio,
                ));
            }
        }
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        if self.rest_countdown_secs == 0 {
            return Err(ConfigError::ZeroRestCountdown);
        }
        Ok(())
    }

    /// Configured overrides keyed by canonical body part
    pub fn rest_overrides(&self) -> BTreeMap<BodyPart, f64> {
        normalize_rest_hours(&self.rest_hours_by_body_part)
    }

    /// Build the configured rest-hours strategy
    pub fn rest_strategy(&self) -> Box<dyn RestHoursStrategy> {
        let flat = FlatRestHours {
            default_hours: self.default_rest_hours,
            overrides: self.rest_overrides(),
        };
        match self.rest_strategy {
            RestStrategyKind::Flat => Box::new(flat),
            RestStrategyKind::Learned => Box::new(LearnedRestHours { fallback: flat }),
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Key free-text rest hours by canonical body part
pub fn normalize_rest_hours<V: Copy + Into<f64>>(raw: &BTreeMap<String, V>) -> BTreeMap<BodyPart, f64> {
    raw.iter()
        .map(|(name, hours)| (muscles::normalize(name), (*hours).into()))
        .collect()
}
