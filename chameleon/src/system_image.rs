use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Illustration assets a card can use as its background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemImageName {
    #[serde(rename = "ILL_SPT_MAIN_COWORKERS_4_SMALL")]
    IllSptMainCoworkers4Small,
    IllSptMainConversationSmall,
    IllSptMainGroupSmall,
    IllSptMainHashtagSmall,
    IllSptMainPeopleSmall,
    IllSptMainPostSmall,
    IllSptMainCelebrateSmall,
    IllSptMainCompassSmall,
}

pub const DEFAULT_SYSTEM_IMAGE: SystemImageName = SystemImageName::IllSptMainCoworkers4Small;

static BY_LOWERCASE_NAME: LazyLock<HashMap<String, SystemImageName>> = LazyLock::new(|| {
    SystemImageName::ALL
        .iter()
        .map(|image| (image.as_str().to_ascii_lowercase(), *image))
        .collect()
});

impl SystemImageName {
    pub const ALL: &[SystemImageName] = &[
        SystemImageName::IllSptMainCoworkers4Small,
        SystemImageName::IllSptMainConversationSmall,
        SystemImageName::IllSptMainGroupSmall,
        SystemImageName::IllSptMainHashtagSmall,
        SystemImageName::IllSptMainPeopleSmall,
        SystemImageName::IllSptMainPostSmall,
        SystemImageName::IllSptMainCelebrateSmall,
        SystemImageName::IllSptMainCompassSmall,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SystemImageName::IllSptMainCoworkers4Small => "ILL_SPT_MAIN_COWORKERS_4_SMALL",
            SystemImageName::IllSptMainConversationSmall => "ILL_SPT_MAIN_CONVERSATION_SMALL",
            SystemImageName::IllSptMainGroupSmall => "ILL_SPT_MAIN_GROUP_SMALL",
            SystemImageName::IllSptMainHashtagSmall => "ILL_SPT_MAIN_HASHTAG_SMALL",
            SystemImageName::IllSptMainPeopleSmall => "ILL_SPT_MAIN_PEOPLE_SMALL",
            SystemImageName::IllSptMainPostSmall => "ILL_SPT_MAIN_POST_SMALL",
            SystemImageName::IllSptMainCelebrateSmall => "ILL_SPT_MAIN_CELEBRATE_SMALL",
            SystemImageName::IllSptMainCompassSmall => "ILL_SPT_MAIN_COMPASS_SMALL",
        }
    }

    pub fn from_name_ignore_case(name: &str) -> Option<SystemImageName> {
        BY_LOWERCASE_NAME.get(&name.to_ascii_lowercase()).copied()
    }

    /// Unknown names map to [`DEFAULT_SYSTEM_IMAGE`].
    pub fn from_name_or_default(name: &str) -> SystemImageName {
        Self::from_name_ignore_case(name).unwrap_or(DEFAULT_SYSTEM_IMAGE)
    }
}

impl fmt::Display for SystemImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
