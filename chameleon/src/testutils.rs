//! In-memory collaborators for tests of the resolver and its callers.

use crate::payload::{ChameleonConfig, TrackingInfo};
use crate::request::RequestContext;
use crate::sensor::{CounterEvent, CounterSensor};
use crate::source::{ConfigQuery, ConfigSource, ConfigSourceError, ContentKey};
use crate::types::{Locale, LocaleError, MemberUrn};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const TEST_MEMBER_ID: i64 = 100;

#[derive(Default)]
struct SourceState {
    responses: VecDeque<Result<Vec<ChameleonConfig>, ConfigSourceError>>,
    contents: HashMap<(String, String), Value>,
    queries: Vec<ConfigQuery>,
    headers: Vec<HashMap<String, String>>,
    content_requests: Vec<(ContentKey, HashMap<String, String>)>,
    tracking_fired: usize,
}

/// Config source answering from queued responses and a content table.
///
/// Each `get_configs` call pops the next queued response; an empty queue
/// answers with no configs.
#[derive(Default)]
pub struct FakeConfigSource {
    state: Mutex<SourceState>,
}

impl FakeConfigSource {
    pub fn push_configs(&self, configs: Vec<ChameleonConfig>) {
        self.state.lock().unwrap().responses.push_back(Ok(configs));
    }

    pub fn fail_configs_with(&self, error: ConfigSourceError) {
        self.state.lock().unwrap().responses.push_back(Err(error));
    }

    pub fn add_content(&self, urn: &str, locale: &str, value: Value) {
        self.state
            .lock()
            .unwrap()
            .contents
            .insert((urn.to_string(), locale.to_string()), value);
    }

    pub fn queries(&self) -> Vec<ConfigQuery> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn last_headers(&self) -> Option<HashMap<String, String>> {
        self.state.lock().unwrap().headers.last().cloned()
    }

    pub fn content_requests(&self) -> Vec<(ContentKey, HashMap<String, String>)> {
        self.state.lock().unwrap().content_requests.clone()
    }

    pub fn tracking_fired(&self) -> usize {
        self.state.lock().unwrap().tracking_fired
    }
}

impl ConfigSource for FakeConfigSource {
    fn get_configs(
        &self,
        query: &ConfigQuery,
        _subject: &MemberUrn,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<ChameleonConfig>, ConfigSourceError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.clone());
        state.headers.push(headers.clone());
        state.responses.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn get_content_config(
        &self,
        content_key: &ContentKey,
        _subject: &MemberUrn,
        _config_id: Option<&str>,
        locale_params: &HashMap<String, String>,
    ) -> Result<ChameleonConfig, ConfigSourceError> {
        let mut state = self.state.lock().unwrap();
        state
            .content_requests
            .push((content_key.clone(), locale_params.clone()));

        let urn = content_key.urn.to_string();
        state
            .contents
            .get(&(urn.clone(), content_key.locale.to_string()))
            .map(|value| ChameleonConfig::new(urn.clone(), value.clone()))
            .ok_or(ConfigSourceError::ContentNotFound(urn))
    }

    fn fire_all_tracking(&self, _tracking_info: &TrackingInfo) {
        self.state.lock().unwrap().tracking_fired += 1;
    }
}

/// Counter sensor remembering every event with its dimensions.
#[derive(Default)]
pub struct RecordingSensor {
    events: Mutex<Vec<(CounterEvent, Vec<(String, String)>)>>,
}

impl RecordingSensor {
    pub fn count(&self, event: CounterEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == event)
            .count()
    }

    pub fn total(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn dimensions(&self, event: CounterEvent) -> Vec<Vec<(String, String)>> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, dims)| dims.clone())
            .collect()
    }
}

impl CounterSensor for RecordingSensor {
    fn increment(&self, event: CounterEvent, dimensions: &[(&'static str, &str)]) {
        let dims = dimensions
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.events.lock().unwrap().push((event, dims));
    }
}

/// Request context with a fixed member, headers and locale.
#[derive(Clone, Debug)]
pub struct FakeRequest {
    member_urn: MemberUrn,
    headers: HashMap<String, String>,
    locale: Result<Locale, LocaleError>,
}

impl Default for FakeRequest {
    fn default() -> Self {
        FakeRequest {
            member_urn: MemberUrn::new(TEST_MEMBER_ID),
            headers: HashMap::from([("x-li-chameleon-ec-test_id".to_string(), "1".to_string())]),
            locale: Ok(Locale::default()),
        }
    }
}

impl FakeRequest {
    pub fn with_locale(mut self, tag: &str) -> Self {
        self.locale = tag.parse();
        self
    }

    pub fn with_failing_locale(mut self) -> Self {
        self.locale = Err(LocaleError::Unavailable);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

impl RequestContext for FakeRequest {
    fn member_urn(&self) -> MemberUrn {
        self.member_urn
    }

    fn headers(&self) -> HashMap<String, String> {
        self.headers.clone()
    }

    fn locale(&self) -> Result<Locale, LocaleError> {
        self.locale.clone()
    }
}
