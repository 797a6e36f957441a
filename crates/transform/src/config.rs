use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Below these magnitudes an edit is treated as "no change".
///
/// Skipping near-identity factors keeps repeated live-preview updates from
/// accumulating floating-point drift in the model matrix.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformThresholds {
    pub scale_epsilon: f64,
    pub height_epsilon_m: f64,
}

impl Default for TransformThresholds {
    fn default() -> Self {
        Self {
            scale_epsilon: 0.001,
            height_epsilon_m: 0.01,
        }
    }
}

/// Bounded retry schedule for tilesets that are not structurally ready.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_attempts: u32,
    pub delay_ms: u64,
    /// Growth factor per retry; `1.0` keeps a fixed spacing.
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            delay_ms: 10,
            multiplier: 1.0,
            max_delay_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based). Always at least 1ms so
    /// the virtual clock makes progress.
    pub fn delay_for(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay = self.delay_ms as f64 * self.multiplier.max(1.0).powi(exponent);
        let capped = delay.min(self.max_delay_ms.max(1) as f64);
        (capped.round() as u64).max(1)
    }

    /// Virtual time from the first failed attempt until the last retry fires.
    pub fn total_delay_ms(&self) -> u64 {
        (1..=self.max_attempts)
            .map(|a| self.delay_for(a))
            .fold(0u64, u64::saturating_add)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub thresholds: TransformThresholds,
    pub retry: RetryPolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid transform config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

impl TransformConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `TILESET_*` overrides from the process environment. Absent or
    /// unparsable values keep their defaults; an invalid combination falls
    /// back to the defaults entirely.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let config = Self {
            thresholds: TransformThresholds {
                scale_epsilon: lookup_or(
                    &lookup,
                    "TILESET_SCALE_EPSILON",
                    defaults.thresholds.scale_epsilon,
                ),
                height_epsilon_m: lookup_or(
                    &lookup,
                    "TILESET_HEIGHT_EPSILON_M",
                    defaults.thresholds.height_epsilon_m,
                ),
            },
            retry: RetryPolicy {
                max_attempts: lookup_or(
                    &lookup,
                    "TILESET_RETRY_MAX_ATTEMPTS",
                    defaults.retry.max_attempts,
                ),
                delay_ms: lookup_or(&lookup, "TILESET_RETRY_DELAY_MS", defaults.retry.delay_ms),
                multiplier: lookup_or(
                    &lookup,
                    "TILESET_RETRY_MULTIPLIER",
                    defaults.retry.multiplier,
                ),
                max_delay_ms: lookup_or(
                    &lookup,
                    "TILESET_RETRY_MAX_DELAY_MS",
                    defaults.retry.max_delay_ms,
                ),
            },
        };

        match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!("ignoring TILESET_* overrides: {err}");
                defaults
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("thresholds.scale_epsilon", self.thresholds.scale_epsilon)?;
        non_negative("thresholds.height_epsilon_m", self.thresholds.height_epsilon_m)?;
        let multiplier = self.retry.multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "retry.multiplier",
                expected: "a finite value >= 1.0",
                value: multiplier,
            });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(ConfigError::OutOfRange {
        field,
        expected: "a finite value >= 0",
        value,
    })
}

fn lookup_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RetryPolicy, TransformConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = TransformConfig::default();
        assert_eq!(config.thresholds.scale_epsilon, 0.001);
        assert_eq!(config.thresholds.height_epsilon_m, 0.01);
        assert_eq!(config.retry.max_attempts, 20);
        assert_eq!(config.retry.delay_ms, 10);
        assert_eq!(config.retry.total_delay_ms(), 200);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TransformConfig::from_json_str(r#"{"retry": {"max_attempts": 3}}"#).unwrap();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 10);
        assert_eq!(config.thresholds, TransformConfig::default().thresholds);
    }

    #[test]
    fn json_rejects_out_of_range_values() {
        let err = TransformConfig::from_json_str(r#"{"thresholds": {"scale_epsilon": -1.0}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "thresholds.scale_epsilon",
                ..
            }
        ));
        assert!(matches!(
            TransformConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn lookup_overrides_and_ignores_garbage() {
        let config = TransformConfig::from_lookup(|key| match key {
            "TILESET_RETRY_MAX_ATTEMPTS" => Some("5".to_string()),
            "TILESET_RETRY_DELAY_MS" => Some(" 25 ".to_string()),
            "TILESET_SCALE_EPSILON" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_ms, 25);
        assert_eq!(config.thresholds.scale_epsilon, 0.001);
    }

    #[test]
    fn invalid_lookup_falls_back_to_defaults() {
        let config = TransformConfig::from_lookup(|key| {
            (key == "TILESET_RETRY_MULTIPLIER").then(|| "0.5".to_string())
        });
        assert_eq!(config, TransformConfig::default());
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 6,
            delay_ms: 10,
            multiplier: 2.0,
            max_delay_ms: 50,
        };
        let delays: Vec<u64> = (1..=6).map(|a| policy.delay_for(a)).collect();
        assert_eq!(delays, vec![10, 20, 40, 50, 50, 50]);
        assert_eq!(policy.total_delay_ms(), 220);
    }

    #[test]
    fn zero_delay_still_advances() {
        let policy = RetryPolicy {
            delay_ms: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(1), 1);
    }
}
