//! Settings for a hallway crossing.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Environment variable overriding the cadence period, in microseconds.
pub const TICK_VAR: &str = "HALLWAY_TICK_MICROS";
/// Environment variable overriding the number of attempts each walker gets.
pub const ATTEMPTS_VAR: &str = "HALLWAY_MAX_ATTEMPTS";

/// Errors produced while building or validating a [`CrossingConfig`].
///
/// [`CrossingConfig`]: struct.CrossingConfig.html
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable was set to something that isn't a non-negative integer.
    #[error("{var} must be a non-negative integer, got {value:?}")]
    Malformed {
        /// The variable that was read.
        var: &'static str,
        /// What it contained.
        value: String,
    },
    /// The cadence period was zero.
    #[error("the cadence period must be greater than zero")]
    ZeroTick,
    /// The attempt bound was zero.
    #[error("walkers need at least one attempt")]
    ZeroAttempts,
    /// Nobody was asked to walk.
    #[error("a crossing needs at least one walker")]
    NoWalkers,
}

/// How a crossing is paced and who takes part.
///
/// The default reproduces the classic setup: Alice and Barbara, a 1ms cadence, and five attempts
/// each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossingConfig {
    /// Period of the cadence that paces every walker's steps.
    pub tick: Duration,
    /// Number of left-then-right iterations a walker makes before giving up.
    pub max_attempts: usize,
    /// Names of the walkers, one thread each.
    pub walkers: Vec<String>,
}

impl Default for CrossingConfig {
    fn default() -> CrossingConfig {
        CrossingConfig {
            tick: Duration::from_millis(1),
            max_attempts: 5,
            walkers: vec!["Alice".to_string(), "Barbara".to_string()],
        }
    }
}

impl CrossingConfig {
    /// Builds the default configuration, then applies `HALLWAY_TICK_MICROS` and
    /// `HALLWAY_MAX_ATTEMPTS` if they are set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Malformed` for a value that doesn't parse, and any error from
    /// [`validate`](#method.validate).
    pub fn from_env() -> Result<CrossingConfig, ConfigError> {
        CrossingConfig::from_lookup(|var| env::var(var).ok())
    }

    /// Like [`from_env`](#method.from_env), but a rejected override is logged and the default
    /// configuration is used instead. A crossing started this way always runs.
    pub fn from_env_or_default() -> CrossingConfig {
        CrossingConfig::or_default(CrossingConfig::from_env())
    }

    fn or_default(loaded: Result<CrossingConfig, ConfigError>) -> CrossingConfig {
        loaded.unwrap_or_else(|e| {
            warn!(error = %e, "ignoring environment overrides");
            CrossingConfig::default()
        })
    }

    fn from_lookup<F>(lookup: F) -> Result<CrossingConfig, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = CrossingConfig::default();

        if let Some(micros) = parse_var(&lookup, TICK_VAR)? {
            config.tick = Duration::from_micros(micros);
        }
        if let Some(attempts) = parse_var(&lookup, ATTEMPTS_VAR)? {
            config.max_attempts = attempts;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a crossing that can actually run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.walkers.is_empty() {
            return Err(ConfigError::NoWalkers);
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Malformed { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CrossingConfig, ATTEMPTS_VAR, TICK_VAR};
    use std::time::Duration;

    #[test]
    fn unset_environment_gives_the_classic_crossing() {
        let config = CrossingConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CrossingConfig::default());
        assert_eq!(config.walkers, ["Alice", "Barbara"]);
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn overrides_are_applied() {
        let config = CrossingConfig::from_lookup(|var| match var {
            TICK_VAR => Some("250".to_string()),
            ATTEMPTS_VAR => Some(" 12 ".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.tick, Duration::from_micros(250));
        assert_eq!(config.max_attempts, 12);
    }

    #[test]
    fn garbage_is_reported_with_its_variable() {
        let err = CrossingConfig::from_lookup(|var| match var {
            ATTEMPTS_VAR => Some("lots".to_string()),
            _ => None,
        })
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::Malformed {
                var: ATTEMPTS_VAR,
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn degenerate_settings_are_rejected() {
        let zero_tick = CrossingConfig::from_lookup(|var| match var {
            TICK_VAR => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(zero_tick, Err(ConfigError::ZeroTick));

        let mut config = CrossingConfig::default();
        config.max_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroAttempts));

        config.max_attempts = 1;
        config.walkers.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoWalkers));
    }

    #[test]
    fn rejected_overrides_fall_back_to_the_classic_crossing() {
        for (var, value) in [(ATTEMPTS_VAR, "lots"), (ATTEMPTS_VAR, "0"), (TICK_VAR, "0")] {
            let loaded = CrossingConfig::from_lookup(|v| {
                if v == var {
                    Some(value.to_string())
                } else {
                    None
                }
            });
            assert!(loaded.is_err());
            assert_eq!(CrossingConfig::or_default(loaded), CrossingConfig::default());
        }

        let good = CrossingConfig::from_lookup(|v| match v {
            ATTEMPTS_VAR => Some("9".to_string()),
            _ => None,
        });
        assert_eq!(CrossingConfig::or_default(good).max_attempts, 9);
    }
}
