use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 5.0; // PubChem's published limit
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Settings for talking to the compound database.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    pub base_url: String,
    pub batch_size: usize,
    pub requests_per_second: f64,
    pub timeout: Duration,
}

impl LookupConfig {
    /// Shortest allowed gap between two consecutive requests.
    ///
    /// A rate that cannot be expressed as an interval (only possible when the fields were set
    /// without [`LookupConfigBuilder`]) disables throttling.
    pub fn min_interval(&self) -> Duration {
        interval_for(self.requests_per_second).unwrap_or(Duration::ZERO)
    }
}

fn interval_for(requests_per_second: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / requests_per_second).ok()
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Builds a [`LookupConfig`].
///
/// [`LookupConfigBuilder::new`] starts empty and every parameter must be set;
/// [`LookupConfigBuilder::with_defaults`] starts from the PubChem defaults so callers only
/// override what they need.
#[derive(Debug, Default)]
pub struct LookupConfigBuilder {
    base_url: Option<String>,
    batch_size: Option<usize>,
    requests_per_second: Option<f64>,
    timeout: Option<Duration>,
}

impl LookupConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let defaults = LookupConfig::default();
        Self {
            base_url: Some(defaults.base_url),
            batch_size: Some(defaults.batch_size),
            requests_per_second: Some(defaults.requests_per_second),
            timeout: Some(defaults.timeout),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
    pub fn requests_per_second(mut self, rate: f64) -> Self {
        self.requests_per_second = Some(rate);
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<LookupConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingParameter("base_url"))?;
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidParameter {
                name: "base_url",
                reason: format!("'{base_url}' is not an http(s) URL"),
            });
        }

        let batch_size = self
            .batch_size
            .ok_or(ConfigError::MissingParameter("batch_size"))?;
        if batch_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "batch_size",
                reason: "must be at least 1".to_string(),
            });
        }

        let requests_per_second = self
            .requests_per_second
            .ok_or(ConfigError::MissingParameter("requests_per_second"))?;
        if !requests_per_second.is_finite() || requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "requests_per_second",
                reason: format!("must be a positive number, got {requests_per_second}"),
            });
        }
        if interval_for(requests_per_second).is_none() {
            return Err(ConfigError::InvalidParameter {
                name: "requests_per_second",
                reason: format!("{requests_per_second} is too small to space requests by"),
            });
        }

        let timeout = self
            .timeout
            .ok_or(ConfigError::MissingParameter("timeout"))?;
        if timeout.is_zero() {
            return Err(ConfigError::InvalidParameter {
                name: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(LookupConfig {
            base_url,
            batch_size,
            requests_per_second,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_successfully() {
        let config = LookupConfigBuilder::with_defaults().build().unwrap();
        assert_eq!(config, LookupConfig::default());
        assert_eq!(config.min_interval(), Duration::from_millis(200));
    }

    #[test]
    fn empty_builder_reports_first_missing_parameter() {
        assert_eq!(
            LookupConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("base_url"))
        );
        assert_eq!(
            LookupConfigBuilder::new()
                .base_url("https://example.org/rest/pug")
                .batch_size(10)
                .build(),
            Err(ConfigError::MissingParameter("requests_per_second"))
        );
    }

    #[test]
    fn rejects_zero_batch_size_and_non_positive_rate() {
        let err = LookupConfigBuilder::with_defaults()
            .batch_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "batch_size", .. }));

        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-30] {
            let err = LookupConfigBuilder::with_defaults()
                .requests_per_second(rate)
                .build()
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidParameter {
                    name: "requests_per_second",
                    ..
                }
            ));
        }
    }

    #[test]
    fn min_interval_never_panics_on_hand_built_configs() {
        let config = LookupConfig {
            requests_per_second: 1e-30,
            ..LookupConfig::default()
        };
        assert_eq!(config.min_interval(), Duration::ZERO);

        let slow = LookupConfigBuilder::with_defaults()
            .requests_per_second(0.5)
            .build()
            .unwrap();
        assert_eq!(slow.min_interval(), Duration::from_secs(2));
    }

    #[test]
    fn base_url_is_trimmed_of_trailing_slashes() {
        let config = LookupConfigBuilder::with_defaults()
            .base_url("http://localhost:8080/rest/pug/ ")
            .build()
            .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/rest/pug");

        assert!(
            LookupConfigBuilder::with_defaults()
                .base_url("ftp://example.org")
                .build()
                .is_err()
        );
    }
}
