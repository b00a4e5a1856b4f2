//! Per-group trending hashtag prompts fetched from Chameleon.
//!
//! A group's config holds a list of hashtag cards under `hashtagCards`. Each
//! card becomes one [`GroupTrendingHashtagConfig`]; fields that cannot be
//! resolved are left empty and counted, they never fail the lookup.

use crate::payload::{ChameleonConfig, PayloadObject};
use crate::request::RequestContext;
use crate::sensor::{CounterEvent, CounterSensor};
use crate::service::{ChameleonService, FieldRef};
use crate::source::{ConfigQuery, ConfigSource};
use crate::system_image::{DEFAULT_SYSTEM_IMAGE, SystemImageName};
use crate::types::{ConfigTypeUrn, GroupUrn};
use serde::Serialize;
use std::sync::Arc;

const NAME: &str = "GroupTrendingHashtagChameleonService";

pub const GROUP_TRENDING_HASHTAG_PRODUCT: &str = "voyager-api";
pub const GROUP_TRENDING_HASHTAG_CONFIG_FORMAT: &str = "group-trending-hashtag";
pub const PARAM_GROUP_ID: &str = "groupId";
pub const CHAMELEON_GROUP_ID_TYPE: &str = "groupId";

pub const HASHTAG_CARDS: &str = "hashtagCards";
pub const HASHTAG: &str = "hashtag";
pub const PROMPT: &str = "prompt";
pub const CTA: &str = "cta";
pub const CARD_IMAGE: &str = "cardImage";

/// One hashtag card of a group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTrendingHashtagConfig {
    hashtag: Option<String>,
    prompt: Option<String>,
    cta: Option<String>,
    card_image: Option<SystemImageName>,
}

impl GroupTrendingHashtagConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hashtag<S: Into<String>>(mut self, hashtag: S) -> Self {
        self.hashtag = Some(hashtag.into());
        self
    }

    pub fn with_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_cta<S: Into<String>>(mut self, cta: S) -> Self {
        self.cta = Some(cta.into());
        self
    }

    pub fn with_card_image(mut self, card_image: SystemImageName) -> Self {
        self.card_image = Some(card_image);
        self
    }

    pub fn hashtag(&self) -> Option<&str> {
        self.hashtag.as_deref()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn cta(&self) -> Option<&str> {
        self.cta.as_deref()
    }

    pub fn has_card_image(&self) -> bool {
        self.card_image.is_some()
    }

    /// The configured image, or [`DEFAULT_SYSTEM_IMAGE`] when the card has none.
    pub fn card_image(&self) -> SystemImageName {
        self.card_image.unwrap_or(DEFAULT_SYSTEM_IMAGE)
    }
}

pub fn group_trending_hashtag_config_type() -> ConfigTypeUrn {
    ConfigTypeUrn::new(
        GROUP_TRENDING_HASHTAG_PRODUCT,
        GROUP_TRENDING_HASHTAG_CONFIG_FORMAT,
    )
}

/// Resolves the trending hashtag cards configured for a group.
#[derive(Clone)]
pub struct GroupTrendingHashtagService {
    chameleon: ChameleonService,
}

impl GroupTrendingHashtagService {
    pub fn new(source: Arc<dyn ConfigSource>, sensor: Arc<dyn CounterSensor>) -> Self {
        GroupTrendingHashtagService {
            chameleon: ChameleonService::new(NAME, source, sensor),
        }
    }

    pub fn name(&self) -> &'static str {
        self.chameleon.name()
    }

    /// Fetches the group's config and builds one record per hashtag card.
    ///
    /// Never fails: config source errors, missing configs and unreadable
    /// fields are counted and yield fewer or emptier records.
    pub fn fetch_group_trending_hashtags(
        &self,
        request: &dyn RequestContext,
        group_id: i64,
    ) -> Vec<GroupTrendingHashtagConfig> {
        let query = ConfigQuery::new(group_trending_hashtag_config_type())
            .with_param(PARAM_GROUP_ID, GroupUrn::new(group_id).to_string());

        let group_id_dimension = group_id.to_string();
        let dimensions = [
            ("group_id", group_id_dimension.as_str()),
            ("service", self.name()),
        ];
        let sensor = self.chameleon.sensor();

        sensor.increment(CounterEvent::ConfigRequest, &dimensions);

        let configs = match self.chameleon.get_configs(request, &query) {
            Ok(configs) => configs,
            Err(e) => {
                tracing::error!(
                    group_id,
                    error = %e,
                    "Chameleon group config request failed"
                );
                sensor.increment(CounterEvent::ConfigError, &dimensions);
                Vec::new()
            }
        };

        if configs.is_empty() {
            tracing::warn!(group_id, "No chameleon configs found for group");
            sensor.increment(CounterEvent::ConfigNotFound, &dimensions);
        }

        // TODO: fall back to the next config instead of dropping the rest once
        // a fallback policy for duplicated group configs is agreed on.
        if configs.len() > 1 {
            tracing::warn!(
                group_id,
                count = configs.len(),
                "Multiple chameleon configs found for group, only the first is used"
            );
            sensor.increment(CounterEvent::ConfigDuplicate, &dimensions);
        }

        configs
            .first()
            .map(|config| {
                self.chameleon.fire_event(config);
                self.build_config_list(request, config)
            })
            .unwrap_or_default()
    }

    fn build_config_list(
        &self,
        request: &dyn RequestContext,
        config: &ChameleonConfig,
    ) -> Vec<GroupTrendingHashtagConfig> {
        let payload = config.payload_object();
        let cards = match payload.get_object_list(&[HASHTAG_CARDS]) {
            Ok(cards) => cards,
            Err(e) => {
                tracing::error!(config = %config.urn, error = %e, "Not able to read hashtag cards");
                return Vec::new();
            }
        };

        cards
            .iter()
            .filter_map(|card| self.build_config(request, config, HASHTAG_CARDS, card))
            .collect()
    }

    /// Builds a record from one card; `None` only for a card that is not an object.
    fn build_config(
        &self,
        request: &dyn RequestContext,
        config: &ChameleonConfig,
        key: &str,
        card: &PayloadObject<'_>,
    ) -> Option<GroupTrendingHashtagConfig> {
        if !card.is_object() {
            tracing::warn!(config = %config.urn, key, "Skipping hashtag card that is not an object");
            return None;
        }

        let field = |field: &'static str| FieldRef {
            key_type: CHAMELEON_GROUP_ID_TYPE,
            key,
            field,
        };

        let mut record = GroupTrendingHashtagConfig::new();

        record.hashtag = self
            .chameleon
            .plain_string(config, card, field(HASHTAG))
            .ok()
            .flatten();
        record.prompt = self
            .chameleon
            .i18n_string_content(request, config, card, field(PROMPT))
            .ok()
            .flatten();
        record.cta = self
            .chameleon
            .plain_string_content(config, card, field(CTA))
            .ok()
            .flatten();
        record.card_image = self
            .chameleon
            .plain_string_content(config, card, field(CARD_IMAGE))
            .ok()
            .flatten()
            .map(|name| SystemImageName::from_name_or_default(&name));

        Some(record)
    }
}
