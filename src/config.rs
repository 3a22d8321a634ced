use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::pacing::DEFAULT_PRODUCER_DELAY;
use crate::queue::DEFAULT_CAPACITY;
use crate::source::DEFAULT_VALUE_RANGE;

/// Run settings. Every field is optional in the TOML file:
///
/// ```toml
/// capacity = 50
/// producer_delay_ms = 2000
/// min_value = 1
/// max_value = 100
/// seed = 42
/// color = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub capacity: usize,
    pub producer_delay_ms: u64,
    pub min_value: u32,
    pub max_value: u32,
    /// Fixed seed for reproducible runs; producer `i` uses `seed + i`.
    pub seed: Option<u64>,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            producer_delay_ms: DEFAULT_PRODUCER_DELAY.as_millis() as u64,
            min_value: *DEFAULT_VALUE_RANGE.start(),
            max_value: *DEFAULT_VALUE_RANGE.end(),
            seed: None,
            color: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::invalid("capacity", "must be at least 1"));
        }
        if self.min_value > self.max_value {
            return Err(ConfigError::invalid(
                "min_value",
                format!(
                    "{} is greater than max_value {}",
                    self.min_value, self.max_value
                ),
            ));
        }
        Ok(())
    }

    pub fn producer_delay(&self) -> Duration {
        Duration::from_millis(self.producer_delay_ms)
    }

    pub fn value_range(&self) -> RangeInclusive<u32> {
        self.min_value..=self.max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_demo() {
        let config = Config::default();
        assert_eq!(config.capacity, 50);
        assert_eq!(config.producer_delay(), Duration::from_secs(2));
        assert_eq!(config.value_range(), 1..=100);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("capacity = 5\nseed = 9\n").unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.producer_delay_ms, 2_000);
        assert!(config.color);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_toml_str("capacty = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_toml_str("capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "capacity", .. }));

        let err = Config::from_toml_str("min_value = 10\nmax_value = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "min_value", .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "producer_delay_ms = 0\ncolor = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.producer_delay(), Duration::ZERO);
        assert!(!config.color);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }
}
