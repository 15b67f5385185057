//! Scheduler configuration
//!
//! Built once per scheduling session and handed to [`FSRSScheduler::new`].
//! Resolution order: built-in defaults, then `settings.json` in the data
//! directory, then `INCREMENTUM_*` environment variables.
//!
//! [`FSRSScheduler::new`]: crate::fsrs::FSRSScheduler::new

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fsrs::{DEFAULT_MAXIMUM_INTERVAL, DEFAULT_RETENTION, FSRS6_WEIGHTS};

/// File name of the optional settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Environment override for the target retention
pub const ENV_DESIRED_RETENTION: &str = "INCREMENTUM_DESIRED_RETENTION";

/// Environment override for the interval ceiling
pub const ENV_MAXIMUM_INTERVAL: &str = "INCREMENTUM_MAXIMUM_INTERVAL";

/// Configuration errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Retention outside (0, 1)
    #[error("Desired retention must be between 0 and 1 (exclusive), got {0}")]
    InvalidRetention(f64),
    /// Interval ceiling outside 1..=36500 days
    #[error("Maximum interval must be between 1 and 36500 days, got {0}")]
    InvalidMaximumInterval(u32),
    /// Non-finite or out-of-range weight
    #[error("Invalid FSRS weights: {0}")]
    InvalidWeights(String),
    /// Unparseable environment override
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    /// IO error reading the settings file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed settings file
    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Scheduling parameters for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    /// Probability of recall targeted at the due date
    pub desired_retention: f64,
    /// Interval ceiling in days
    pub maximum_interval: u32,
    /// FSRS-6 weights w0..w20
    pub weights: [f64; 21],
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            desired_retention: DEFAULT_RETENTION,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            weights: FSRS6_WEIGHTS,
        }
    }
}

impl SchedulerConfig {
    /// Load settings for a session
    ///
    /// A missing settings file is not an error; a malformed one is.
    pub fn load(data_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match data_dir.map(|dir| dir.join(SETTINGS_FILE)) {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path)?;
                tracing::debug!("Loaded scheduler settings from {}", path.display());
                serde_json::from_str(&raw)?
            }
            _ => Self::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `INCREMENTUM_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(ENV_DESIRED_RETENTION) {
            self.desired_retention = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_DESIRED_RETENTION,
                value: value.clone(),
            })?;
        }
        if let Ok(value) = std::env::var(ENV_MAXIMUM_INTERVAL) {
            self.maximum_interval = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_MAXIMUM_INTERVAL,
                value: value.clone(),
            })?;
        }
        Ok(())
    }

    /// Reject parameter sets the algorithm cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.desired_retention > 0.0 && self.desired_retention < 1.0) {
            return Err(ConfigError::InvalidRetention(self.desired_retention));
        }
        if !(1..=DEFAULT_MAXIMUM_INTERVAL).contains(&self.maximum_interval) {
            return Err(ConfigError::InvalidMaximumInterval(self.maximum_interval));
        }
        if let Some(i) = self.weights.iter().position(|w| !w.is_finite()) {
            return Err(ConfigError::InvalidWeights(format!("w{} is not finite", i)));
        }
        if self.weights[20] <= 0.0 {
            return Err(ConfigError::InvalidWeights("w20 (decay) must be positive".into()));
        }
        if self.weights[..4].iter().any(|w| *w <= 0.0) {
            return Err(ConfigError::InvalidWeights(
                "initial stabilities w0..w3 must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Forgetting curve decay (w20)
    pub fn decay(&self) -> f64 {
        self.weights[20]
    }
}
