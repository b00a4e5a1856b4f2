use crate::view_model::PageKey;
use serde::Deserialize;

pub const NEPTUNE_LAUNCHPAD_CARD_EVTGROUPS_ACTIONS_PAGE_KEY: &str =
    "launchpad_card_evtgroups_actions";
pub const VOYAGER_LAUNCHPAD_CARD_EVTGROUPS_ACTIONS_PAGE_KEY: &str =
    "p_flagship3_launchpad_card_evtgroups_actions";

/// Client family whose page key naming scheme is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientFlavor {
    #[default]
    Voyager,
    Neptune,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TrackingKeyFormatter {
    client: ClientFlavor,
}

impl TrackingKeyFormatter {
    pub fn new(client: ClientFlavor) -> Self {
        TrackingKeyFormatter { client }
    }

    pub fn format_page_key(&self, neptune_page_key: &str, voyager_page_key: &str) -> PageKey {
        let page_key = match self.client {
            ClientFlavor::Neptune => neptune_page_key,
            ClientFlavor::Voyager => voyager_page_key,
        };
        PageKey {
            page_key: page_key.to_string(),
        }
    }
}
