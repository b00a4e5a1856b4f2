//! Formatter for the group hashtag prompt launchpad card.
//!
//! The card asks a new group member to start a post with one of the group's
//! trending hashtags. Which hashtag is shown depends on the card type: each
//! card type maps to an index into the group's configured hashtag cards.

use crate::card::{LaunchpadCard, LaunchpadContext};
use crate::config::Config;
use crate::localization::{LocalizationService, TranslationKey};
use crate::tracking::{
    NEPTUNE_LAUNCHPAD_CARD_EVTGROUPS_ACTIONS_PAGE_KEY, TrackingKeyFormatter,
    VOYAGER_LAUNCHPAD_CARD_EVTGROUPS_ACTIONS_PAGE_KEY,
};
use crate::view_model::{
    ImageViewModel, LaunchpadCta, LaunchpadCtaStyle, PageKey, PresentationStyle, RenderedCard,
    TextViewModel,
};
use chameleon::group_trending_hashtag::{GroupTrendingHashtagConfig, GroupTrendingHashtagService};
use chameleon::request::RequestContext;
use chameleon::types::{GroupUrn, UrnError};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

pub const GROUP_URN_ATTRIBUTE_KEY: &str = "GROUP_URN";
const NEW_LINES_URL_ENCODED: &str = "%0D%0D";
const DEFAULT_CARD_INDEX: usize = 1;

#[derive(thiserror::Error, Debug)]
pub enum FormatterError {
    #[error("no group urn attribute on launchpad card {0}")]
    GroupUrnNotFound(String),
    #[error("invalid group urn on launchpad card: {0}")]
    InvalidGroupUrn(#[from] UrnError),
    #[error("no group trending hashtag configs for group {0}")]
    ConfigsNotFound(i64),
    #[error("no group trending hashtag config at index {index} for card type {card_type}")]
    TargetConfigNotFound { card_type: String, index: usize },
    #[error("group trending hashtag config has no hashtag")]
    MissingHashtag,
    #[error("invalid deeplink url: {0}")]
    InvalidDeeplink(#[from] url::ParseError),
}

impl FormatterError {
    /// Whether the card simply has nothing to show, as opposed to a bad
    /// request or a broken deeplink.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FormatterError::GroupUrnNotFound(_)
                | FormatterError::ConfigsNotFound(_)
                | FormatterError::TargetConfigNotFound { .. }
                | FormatterError::MissingHashtag
        )
    }
}

pub struct GroupHashtagPromptCardFormatter {
    service: GroupTrendingHashtagService,
    localization: Arc<dyn LocalizationService>,
    tracking: TrackingKeyFormatter,
    share_url: Url,
    card_type_to_index: HashMap<String, usize>,
}

impl GroupHashtagPromptCardFormatter {
    pub fn new(
        service: GroupTrendingHashtagService,
        localization: Arc<dyn LocalizationService>,
        config: &Config,
    ) -> Self {
        GroupHashtagPromptCardFormatter {
            service,
            localization,
            tracking: TrackingKeyFormatter::new(config.client),
            share_url: config.share_url.clone(),
            card_type_to_index: config.card_type_to_index.clone(),
        }
    }

    /// Renders the whole card with a single config lookup.
    pub fn format_card(
        &self,
        request: &dyn RequestContext,
        context: LaunchpadContext,
        cta_type: &str,
        card: &LaunchpadCard,
    ) -> Result<RenderedCard, FormatterError> {
        let target = self.find_target_config(request, card)?;
        tracing::debug!(?context, card_type = %card.card_type, "Formatting group hashtag prompt card");

        Ok(RenderedCard {
            title: title_of(&target)?,
            subtitle: Some(subtitle_of(&target)),
            cta: self.cta_for(&target, cta_type, &card.lego_tracking_token)?,
            background_image: Some(ImageViewModel::system_image(target.card_image())),
            page_key: self.page_key(),
        })
    }

    pub fn title(
        &self,
        request: &dyn RequestContext,
        card: &LaunchpadCard,
    ) -> Result<TextViewModel, FormatterError> {
        title_of(&self.find_target_config(request, card)?)
    }

    /// The prompt, or empty text when the card has none.
    pub fn subtitle(
        &self,
        request: &dyn RequestContext,
        card: &LaunchpadCard,
    ) -> Result<Option<TextViewModel>, FormatterError> {
        Ok(Some(subtitle_of(&self.find_target_config(request, card)?)))
    }

    pub fn populate_cta(
        &self,
        request: &dyn RequestContext,
        cta_type: &str,
        card: &LaunchpadCard,
    ) -> Result<LaunchpadCta, FormatterError> {
        let target = self.find_target_config(request, card)?;
        self.cta_for(&target, cta_type, &card.lego_tracking_token)
    }

    pub fn background_image(
        &self,
        request: &dyn RequestContext,
        card: &LaunchpadCard,
    ) -> Result<Option<ImageViewModel>, FormatterError> {
        let target = self.find_target_config(request, card)?;
        Ok(Some(ImageViewModel::system_image(target.card_image())))
    }

    pub fn page_key(&self) -> PageKey {
        self.tracking.format_page_key(
            NEPTUNE_LAUNCHPAD_CARD_EVTGROUPS_ACTIONS_PAGE_KEY,
            VOYAGER_LAUNCHPAD_CARD_EVTGROUPS_ACTIONS_PAGE_KEY,
        )
    }

    /// Link opening the share box prefilled with the hashtag, preceded by two
    /// blank lines so the member starts typing above it.
    pub fn deeplink_url(&self, hashtag: &str, tracking_token: &str) -> Result<Url, FormatterError> {
        let hint = self
            .localization
            .plain_text(TranslationKey::CardsGroupTrendingHashtagPromptStartPosts);

        let mut url = self.share_url.clone();
        url.query_pairs_mut()
            .append_pair("text", hashtag)
            .append_pair("hint", &hint)
            .append_pair("trk", tracking_token);

        let query = url
            .query()
            .unwrap_or_default()
            .replacen("text=", &format!("text={NEW_LINES_URL_ENCODED}"), 1);
        url.set_query(Some(&query));

        // Round-trip through the parser so the result is normalized.
        Ok(Url::parse(url.as_str())?)
    }

    /// Picks the group config this card shows, based on the card's group and type.
    pub fn find_target_config(
        &self,
        request: &dyn RequestContext,
        card: &LaunchpadCard,
    ) -> Result<GroupTrendingHashtagConfig, FormatterError> {
        let group_urn = card
            .related_entities(GROUP_URN_ATTRIBUTE_KEY)
            .and_then(|entities| entities.first())
            .ok_or_else(|| {
                tracing::error!(card_type = %card.card_type, "Group urn not found on launchpad card");
                FormatterError::GroupUrnNotFound(card.card_type.clone())
            })?;
        let group_id = group_urn.parse::<GroupUrn>()?.id();

        let configs = self.service.fetch_group_trending_hashtags(request, group_id);
        if configs.is_empty() {
            tracing::error!(group_id, "Group trending hashtag configs not found");
            return Err(FormatterError::ConfigsNotFound(group_id));
        }

        let index = self
            .card_type_to_index
            .get(&card.card_type)
            .copied()
            .unwrap_or(DEFAULT_CARD_INDEX);

        configs.into_iter().nth(index).ok_or_else(|| {
            tracing::error!(group_id, index, "Target group trending hashtag config not found");
            FormatterError::TargetConfigNotFound {
                card_type: card.card_type.clone(),
                index,
            }
        })
    }

    fn cta_for(
        &self,
        target: &GroupTrendingHashtagConfig,
        cta_type: &str,
        tracking_token: &str,
    ) -> Result<LaunchpadCta, FormatterError> {
        let hashtag = target.hashtag().ok_or(FormatterError::MissingHashtag)?;
        let title = self
            .localization
            .plain_text(TranslationKey::CardsGroupTrendingHashtagPromptStartPosts);

        Ok(LaunchpadCta {
            cta_title: TextViewModel::new(title),
            cta_style: LaunchpadCtaStyle::Primary,
            cta_type: cta_type.to_string(),
            presentation_style: PresentationStyle::Redirect,
            deeplink_url: self.deeplink_url(hashtag, tracking_token)?,
        })
    }
}

fn title_of(target: &GroupTrendingHashtagConfig) -> Result<TextViewModel, FormatterError> {
    target
        .hashtag()
        .map(TextViewModel::new)
        .ok_or(FormatterError::MissingHashtag)
}

fn subtitle_of(target: &GroupTrendingHashtagConfig) -> TextViewModel {
    TextViewModel::new(target.prompt().unwrap_or_default())
}
