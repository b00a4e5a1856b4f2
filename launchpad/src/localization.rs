use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TranslationKey {
    CardsGroupTrendingHashtagPromptStartPosts,
}

impl TranslationKey {
    pub const fn key(&self) -> &'static str {
        match self {
            TranslationKey::CardsGroupTrendingHashtagPromptStartPosts => {
                "cards_group_trending_hashtag_prompt_startposts"
            }
        }
    }

    const fn default_text(&self) -> &'static str {
        match self {
            TranslationKey::CardsGroupTrendingHashtagPromptStartPosts => "Start a post",
        }
    }
}

/// Resolves UI strings owned by the launchpad.
pub trait LocalizationService: Send + Sync {
    fn plain_text(&self, key: TranslationKey) -> String;
}

/// English bundle, optionally overridden per key from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticLocalizationService {
    overrides: HashMap<String, String>,
}

impl StaticLocalizationService {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        StaticLocalizationService { overrides }
    }
}

impl LocalizationService for StaticLocalizationService {
    fn plain_text(&self, key: TranslationKey) -> String {
        self.overrides
            .get(key.key())
            .cloned()
            .unwrap_or_else(|| key.default_text().to_string())
    }
}
