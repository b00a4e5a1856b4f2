use serde::Deserialize;
use url::Url;

fn default_timeout_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    3
}

pub const MAX_RETRIES_CAP: u32 = 10;

fn default_retry_base_delay_ms() -> u64 {
    50
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("config source timeout cannot be 0")]
    ZeroTimeout,
    #[error("config source url must use http or https, got {0}")]
    UnsupportedScheme(String),
    #[error("config source max_retries cannot exceed {MAX_RETRIES_CAP}, got {0}")]
    TooManyRetries(u32),
}

/// Where and how to reach the Chameleon config API.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct ConfigSourceConfig {
    pub url: Url,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl ConfigSourceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::ZeroTimeout);
        }
        if self.max_retries > MAX_RETRIES_CAP {
            return Err(ValidationError::TooManyRetries(self.max_retries));
        }
        match self.url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    pub config_source: ConfigSourceConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.config_source.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
            config_source:
                url: http://chameleon.internal/api
            "#,
        )
        .unwrap();

        assert_eq!(config.config_source.timeout_ms, 500);
        assert_eq!(config.config_source.max_retries, 3);
        assert_eq!(config.config_source.retry_base_delay_ms, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation() {
        let mut config = ConfigSourceConfig {
            url: Url::parse("ftp://chameleon.internal").unwrap(),
            timeout_ms: 100,
            max_retries: 0,
            retry_base_delay_ms: 0,
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnsupportedScheme("ftp".into()))
        );

        config.url = Url::parse("https://chameleon.internal").unwrap();
        config.timeout_ms = 0;
        assert_eq!(config.validate(), Err(ValidationError::ZeroTimeout));
    }

    #[test]
    fn retries_are_capped() {
        let mut config = ConfigSourceConfig {
            url: Url::parse("https://chameleon.internal").unwrap(),
            timeout_ms: 100,
            max_retries: MAX_RETRIES_CAP,
            retry_base_delay_ms: 50,
        };
        assert!(config.validate().is_ok());

        config.max_retries = 40;
        assert_eq!(config.validate(), Err(ValidationError::TooManyRetries(40)));
    }
}
