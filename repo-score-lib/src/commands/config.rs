use crate::Result;
use crate::facts::github::ClientOptions;
use crate::metrics::{MetricSettings, Weights};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the current directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "repo-score.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Relative weight of each metric in the net score
    #[serde(default)]
    pub weights: Weights,

    /// Per-request timeout for GitHub API calls
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Retries on top of the first attempt for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upper bound on concurrent GitHub API requests
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Longest wait for a rate-limit reset
    #[serde(default = "default_max_rate_limit_wait", with = "humantime_serde")]
    pub max_rate_limit_wait: Duration,

    /// Trailing window, in days, of issues and pull requests sampled for responsiveness
    #[serde(default = "default_responsiveness_window_days")]
    pub responsiveness_window_days: u32,

    /// Steepness of the logistic curve mapping mean response time to a score
    #[serde(default = "default_responsiveness_steepness")]
    pub responsiveness_steepness: f64,

    /// Attempts while GitHub is still computing contributor statistics
    #[serde(default = "default_stats_pending_retries")]
    pub stats_pending_retries: u32,

    /// Pause before asking again for contributor statistics
    #[serde(default = "default_stats_pending_delay", with = "humantime_serde")]
    pub stats_pending_delay: Duration,
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_max_concurrent_requests() -> usize {
    8
}

const fn default_max_rate_limit_wait() -> Duration {
    Duration::from_secs(60)
}

const fn default_responsiveness_window_days() -> u32 {
    90
}

const fn default_responsiveness_steepness() -> f64 {
    7.0
}

const fn default_stats_pending_retries() -> u32 {
    3
}

const fn default_stats_pending_delay() -> Duration {
    Duration::from_secs(2)
}

impl Config {
    /// Load configuration from `config_path`, else `repo-score.toml` in `base_dir`, else defaults.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading repo-score configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading repo-score configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config
            .validate()
            .map_err(|e| app_err!("invalid configuration file '{final_path}': {e}"))?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let w = &self.weights;
        let all_weights = [w.bus_factor, w.license, w.ramp_up, w.responsiveness, w.correctness];
        if all_weights.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
            return Err(app_err!("weights must be non-negative numbers"));
        }

        if w.total() <= 0.0 {
            return Err(app_err!("weights must add up to a positive value"));
        }

        if !(6.0..=8.0).contains(&self.responsiveness_steepness) {
            return Err(app_err!(
                "responsiveness_steepness must be between 6 and 8, got {}",
                self.responsiveness_steepness
            ));
        }

        if !(1..=365).contains(&self.responsiveness_window_days) {
            return Err(app_err!(
                "responsiveness_window_days must be between 1 and 365, got {}",
                self.responsiveness_window_days
            ));
        }

        if self.max_concurrent_requests == 0 {
            return Err(app_err!("max_concurrent_requests must be at least 1"));
        }

        Ok(())
    }

    #[must_use]
    pub const fn client_options(&self) -> ClientOptions {
        ClientOptions {
            request_timeout: self.request_timeout,
            max_retries: self.max_retries,
            max_concurrent_requests: self.max_concurrent_requests,
            max_rate_limit_wait: self.max_rate_limit_wait,
        }
    }

    #[must_use]
    pub const fn metric_settings(&self) -> MetricSettings {
        MetricSettings {
            responsiveness_window_days: self.responsiveness_window_days,
            responsiveness_steepness: self.responsiveness_steepness,
            stats_pending_retries: self.stats_pending_retries,
            stats_pending_delay: self.stats_pending_delay,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
