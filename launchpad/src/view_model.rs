use chameleon::system_image::SystemImageName;
use serde::Serialize;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextViewModel {
    pub text: String,
}

impl TextViewModel {
    pub fn new<S: Into<String>>(text: S) -> Self {
        TextViewModel { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttribute {
    pub system_image: SystemImageName,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageViewModel {
    pub attributes: Vec<ImageAttribute>,
}

impl ImageViewModel {
    pub fn system_image(system_image: SystemImageName) -> Self {
        ImageViewModel {
            attributes: vec![ImageAttribute { system_image }],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchpadCtaStyle {
    Primary,
    Secondary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresentationStyle {
    Redirect,
    Modal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadCta {
    pub cta_title: TextViewModel,
    pub cta_style: LaunchpadCtaStyle,
    pub cta_type: String,
    pub presentation_style: PresentationStyle,
    pub deeplink_url: Url,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageKey {
    pub page_key: String,
}

/// Everything the client needs to draw one card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCard {
    pub title: TextViewModel,
    pub subtitle: Option<TextViewModel>,
    pub cta: LaunchpadCta,
    pub background_image: Option<ImageViewModel>,
    pub page_key: PageKey,
}
