use chameleon::config::{Config as ChameleonConfig, ValidationError as ChameleonValidationError};
use launchpad::config::{Config as LaunchpadConfig, ValidationError as LaunchpadValidationError};
use serde::Deserialize;
use std::fs::File;

fn default_metrics_prefix() -> String {
    "launchpad_dash".into()
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
    /// `EnvFilter` directives, overridden by `RUST_LOG`.
    pub filter: Option<String>,
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub chameleon: ChameleonConfig,
    pub launchpad: LaunchpadConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.chameleon.validate()?;
        self.launchpad.validate()?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid chameleon config: {0}")]
    Chameleon(#[from] ChameleonValidationError),
    #[error("invalid launchpad config: {0}")]
    Launchpad(#[from] LaunchpadValidationError),
}
