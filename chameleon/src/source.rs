use crate::payload::{ChameleonConfig, TrackingInfo};
use crate::types::{ConfigTypeUrn, ContentUrn, Locale, MemberUrn};
use std::collections::{BTreeMap, HashMap};

/// Identifies which remote config, and which instance of it, to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigQuery {
    config_type: ConfigTypeUrn,
    params: BTreeMap<String, String>,
}

impl ConfigQuery {
    pub fn new(config_type: ConfigTypeUrn) -> Self {
        ConfigQuery {
            config_type,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn config_type(&self) -> &ConfigTypeUrn {
        &self.config_type
    }

    pub fn config_format(&self) -> &str {
        self.config_type.format()
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

/// Content reference to resolve for a given locale.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub urn: ContentUrn,
    pub locale: Locale,
}

impl ContentKey {
    pub fn new(urn: ContentUrn, locale: Locale) -> Self {
        ContentKey { urn, locale }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigSourceError {
    #[error("config source request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("config source returned status {0}")]
    UnexpectedStatus(u16),
    #[error("config source unavailable after {0} retries")]
    RetriesExceeded(u32),
    #[error("content {0} not found")]
    ContentNotFound(String),
}

/// Remote store serving configs and localized content.
///
/// Calls block until the store replies or fails; implementations own their
/// timeouts. Must be safe to share between concurrent requests.
pub trait ConfigSource: Send + Sync {
    fn get_configs(
        &self,
        query: &ConfigQuery,
        subject: &MemberUrn,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<ChameleonConfig>, ConfigSourceError>;

    fn get_content_config(
        &self,
        content_key: &ContentKey,
        subject: &MemberUrn,
        config_id: Option<&str>,
        locale_params: &HashMap<String, String>,
    ) -> Result<ChameleonConfig, ConfigSourceError>;

    /// Fire-and-forget; failures are logged by the implementation.
    fn fire_all_tracking(&self, tracking_info: &TrackingInfo);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_are_ordered() {
        let query = ConfigQuery::new(ConfigTypeUrn::new("voyager-api", "group-trending-hashtag"))
            .with_param("groupId", "urn:li:group:1")
            .with_param("client", "web");

        assert_eq!(query.config_format(), "group-trending-hashtag");
        let keys: Vec<_> = query.params().keys().cloned().collect();
        assert_eq!(keys, vec!["client".to_string(), "groupId".to_string()]);
    }
}
