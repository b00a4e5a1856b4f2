use crate::tracking::ClientFlavor;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,
    #[error("share url cannot be a base for query parameters: {0}")]
    InvalidShareUrl(String),
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

fn default_card_type_to_index() -> HashMap<String, usize> {
    HashMap::from([
        ("evtgroups__actions__start_a_post_1".to_string(), 0),
        ("evtgroups__actions__start_a_post_2".to_string(), 1),
        ("evtgroups__actions__start_a_post_3".to_string(), 2),
    ])
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    /// Share box the card's call to action opens.
    pub share_url: Url,
    #[serde(default)]
    pub client: ClientFlavor,
    /// Which of a group's hashtag cards each launchpad card type shows.
    #[serde(default = "default_card_type_to_index")]
    pub card_type_to_index: HashMap<String, usize>,
    /// Per-key overrides of the built-in UI strings.
    #[serde(default)]
    pub translations: HashMap<String, String>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        if self.share_url.cannot_be_a_base() {
            return Err(ValidationError::InvalidShareUrl(self.share_url.to_string()));
        }
        Ok(())
    }
}
