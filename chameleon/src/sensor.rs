//! Counter events emitted while resolving configs.

use crate::metrics_defs::{
    GROUP_TRENDING_HASHTAG_CONFIG_DUPLICATE, GROUP_TRENDING_HASHTAG_CONFIG_ERROR,
    GROUP_TRENDING_HASHTAG_CONFIG_NOT_FOUND, GROUP_TRENDING_HASHTAG_CONFIG_REQUEST,
    I18N_RESOLVE_FAILED, STRING_CONTENT_RESOLVE_FAILED, STRING_RESOLVE_FAILED,
};
use shared::counter;
use shared::metrics_defs::MetricDef;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CounterEvent {
    ConfigRequest,
    ConfigError,
    ConfigNotFound,
    ConfigDuplicate,
    I18nResolveFailed,
    StringResolveFailed,
    StringContentResolveFailed,
}

impl CounterEvent {
    pub const fn metric(&self) -> MetricDef {
        match self {
            CounterEvent::ConfigRequest => GROUP_TRENDING_HASHTAG_CONFIG_REQUEST,
            CounterEvent::ConfigError => GROUP_TRENDING_HASHTAG_CONFIG_ERROR,
            CounterEvent::ConfigNotFound => GROUP_TRENDING_HASHTAG_CONFIG_NOT_FOUND,
            CounterEvent::ConfigDuplicate => GROUP_TRENDING_HASHTAG_CONFIG_DUPLICATE,
            CounterEvent::I18nResolveFailed => I18N_RESOLVE_FAILED,
            CounterEvent::StringResolveFailed => STRING_RESOLVE_FAILED,
            CounterEvent::StringContentResolveFailed => STRING_CONTENT_RESOLVE_FAILED,
        }
    }
}

/// Sink for counter events. Implementations must never fail into the caller.
pub trait CounterSensor: Send + Sync {
    fn increment(&self, event: CounterEvent, dimensions: &[(&'static str, &str)]);
}

/// Forwards counter events to the globally installed `metrics` recorder,
/// with each dimension as a label.
#[derive(Clone, Copy, Debug, Default)]
pub struct MetricsCounterSensor;

impl CounterSensor for MetricsCounterSensor {
    fn increment(&self, event: CounterEvent, dimensions: &[(&'static str, &str)]) {
        let labels: Vec<metrics::Label> = dimensions
            .iter()
            .map(|(key, value)| metrics::Label::new(*key, value.to_string()))
            .collect();
        counter!(event.metric(), labels).increment(1);
    }
}
