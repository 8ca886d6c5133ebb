use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SIZE_TOLERANCE_INCH: u32 = 2;
pub const DEFAULT_NEUTRAL_FLOOR: f64 = 0.0;
pub const DEFAULT_EXPLAIN_TOP_K: usize = 3;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Upper bound on `rank --top`.
pub const MAX_RANK_TOP: usize = 50;

pub const ENV_SIZE_TOLERANCE: &str = "TVPICK_SIZE_TOLERANCE";
pub const ENV_NEUTRAL_FLOOR: &str = "TVPICK_NEUTRAL_FLOOR";
pub const ENV_EXPLAIN_TOP_K: &str = "TVPICK_EXPLAIN_TOP_K";
pub const ENV_LOG_LEVEL: &str = "TVPICK_LOG_LEVEL";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("neutral floor must lie in [0, 100), got {0}")]
    NeutralFloorOutOfRange(f64),
    #[error("explain top-k must be at least 1")]
    ZeroExplainTopK,
}

/// Tunables for the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Inclusive size window around the requested size, in inches.
    pub size_tolerance_inch: u32,
    /// Normalized value given to an attribute a record does not document.
    pub neutral_floor: f64,
    /// Explanation entries per slot.
    pub explain_top_k: usize,
    pub log_level: String,
}

impl EngineConfig {
    /// Explicit v0 defaults.
    pub fn v0() -> Self {
        Self {
            size_tolerance_inch: DEFAULT_SIZE_TOLERANCE_INCH,
            neutral_floor: DEFAULT_NEUTRAL_FLOOR,
            explain_top_k: DEFAULT_EXPLAIN_TOP_K,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Defaults overlaid with `TVPICK_*` variables, after reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::v0();

        if let Some(raw) = lookup(ENV_SIZE_TOLERANCE) {
            config.size_tolerance_inch = parse_var(ENV_SIZE_TOLERANCE, &raw, "a non-negative integer")?;
        }
        if let Some(raw) = lookup(ENV_NEUTRAL_FLOOR) {
            config.neutral_floor = parse_var(ENV_NEUTRAL_FLOOR, &raw, "a number")?;
        }
        if let Some(raw) = lookup(ENV_EXPLAIN_TOP_K) {
            config.explain_top_k = parse_var(ENV_EXPLAIN_TOP_K, &raw, "a positive integer")?;
        }
        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            if !raw.trim().is_empty() {
                config.log_level = raw.trim().to_string();
            }
        }

        config.validated()
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if !self.neutral_floor.is_finite() || !(0.0..100.0).contains(&self.neutral_floor) {
            return Err(ConfigError::NeutralFloorOutOfRange(self.neutral_floor));
        }
        if self.explain_top_k == 0 {
            return Err(ConfigError::ZeroExplainTopK);
        }
        Ok(self)
    }

    pub fn with_size_tolerance(mut self, inches: u32) -> Self {
        self.size_tolerance_inch = inches;
        self
    }

    pub fn with_neutral_floor(mut self, floor: f64) -> Self {
        self.neutral_floor = floor;
        self
    }

    pub fn with_explain_top_k(mut self, k: usize) -> Self {
        self.explain_top_k = k;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::v0()
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    raw: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var(ENV_SIZE_TOLERANCE);
        env::remove_var(ENV_NEUTRAL_FLOOR);
        env::remove_var(ENV_EXPLAIN_TOP_K);
        env::remove_var(ENV_LOG_LEVEL);
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn from_env_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = EngineConfig::from_env().expect("config loads with defaults");
        assert_eq!(config.size_tolerance_inch, 2);
        assert_eq!(config.neutral_floor, 0.0);
        assert_eq!(config.explain_top_k, 3);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn from_env_reads_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var(ENV_SIZE_TOLERANCE, "5");
        env::set_var(ENV_LOG_LEVEL, "debug");
        let config = EngineConfig::from_env().expect("config loads");
        reset_env();
        assert_eq!(config.size_tolerance_inch, 5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_unparseable_tolerance() {
        let err = EngineConfig::from_lookup(lookup(&[(ENV_SIZE_TOLERANCE, "wide")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: ENV_SIZE_TOLERANCE, .. }
        ));
    }

    #[test]
    fn rejects_floor_outside_scale() {
        let err = EngineConfig::from_lookup(lookup(&[(ENV_NEUTRAL_FLOOR, "120")])).unwrap_err();
        assert_eq!(err, ConfigError::NeutralFloorOutOfRange(120.0));
    }

    #[test]
    fn neutral_floor_must_stay_below_the_maximum() {
        let err = EngineConfig::v0().with_neutral_floor(100.0).validated().unwrap_err();
        assert_eq!(err, ConfigError::NeutralFloorOutOfRange(100.0));
        assert_eq!(err.to_string(), "neutral floor must lie in [0, 100), got 100");

        let config = EngineConfig::v0().with_neutral_floor(99.9).validated().unwrap();
        assert_eq!(config.neutral_floor, 99.9);
        assert!(EngineConfig::v0().with_neutral_floor(f64::NAN).validated().is_err());
        assert!(EngineConfig::v0().with_neutral_floor(-0.1).validated().is_err());
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = EngineConfig::from_lookup(lookup(&[(ENV_EXPLAIN_TOP_K, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroExplainTopK);
    }
}
