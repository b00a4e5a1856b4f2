//! Launchpad cards as served by the launchpad backend.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attribute_type: String,
    #[serde(default)]
    pub related_entities: Vec<String>,
}

impl Attribute {
    pub fn new<T: Into<String>>(attribute_type: T, related_entities: Vec<String>) -> Self {
        Attribute {
            attribute_type: attribute_type.into(),
            related_entities,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadCard {
    pub card_type: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    pub lego_tracking_token: String,
    #[serde(default)]
    pub completed: bool,
}

impl LaunchpadCard {
    /// Related entities of the first attribute of the given type.
    pub fn related_entities(&self, attribute_type: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|attribute| attribute.attribute_type == attribute_type)
            .map(|attribute| attribute.related_entities.as_slice())
    }
}

/// Surface the launchpad is rendered on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchpadContext {
    #[default]
    Feed,
    MyNetwork,
    Profile,
    Groups,
}
