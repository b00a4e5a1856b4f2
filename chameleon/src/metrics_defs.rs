//! Metrics definitions for the chameleon client.

use shared::metrics_defs::{MetricDef, MetricType};

pub const GROUP_TRENDING_HASHTAG_CONFIG_REQUEST: MetricDef = MetricDef {
    name: "chameleon.group_trending_hashtag.request",
    metric_type: MetricType::Counter,
    description: "Number of group trending hashtag config lookups",
};

pub const GROUP_TRENDING_HASHTAG_CONFIG_ERROR: MetricDef = MetricDef {
    name: "chameleon.group_trending_hashtag.error",
    metric_type: MetricType::Counter,
    description: "Number of group trending hashtag lookups where the config source failed",
};

pub const GROUP_TRENDING_HASHTAG_CONFIG_NOT_FOUND: MetricDef = MetricDef {
    name: "chameleon.group_trending_hashtag.not_found",
    metric_type: MetricType::Counter,
    description: "Number of group trending hashtag lookups that returned no config",
};

pub const GROUP_TRENDING_HASHTAG_CONFIG_DUPLICATE: MetricDef = MetricDef {
    name: "chameleon.group_trending_hashtag.duplicate",
    metric_type: MetricType::Counter,
    description: "Number of group trending hashtag lookups that returned more than one config",
};

pub const I18N_RESOLVE_FAILED: MetricDef = MetricDef {
    name: "chameleon.field.i18n_resolve_failed",
    metric_type: MetricType::Counter,
    description: "Number of localized fields that could not be resolved",
};

pub const STRING_RESOLVE_FAILED: MetricDef = MetricDef {
    name: "chameleon.field.string_resolve_failed",
    metric_type: MetricType::Counter,
    description: "Number of plain string fields that could not be read",
};

pub const STRING_CONTENT_RESOLVE_FAILED: MetricDef = MetricDef {
    name: "chameleon.field.string_content_resolve_failed",
    metric_type: MetricType::Counter,
    description: "Number of content string fields that could not be read",
};

pub const CONFIG_SOURCE_RETRY: MetricDef = MetricDef {
    name: "chameleon.config_source.retry",
    metric_type: MetricType::Counter,
    description: "Number of config source requests retried after a retriable status",
};

pub const CONFIG_SOURCE_DURATION: MetricDef = MetricDef {
    name: "chameleon.config_source.duration",
    metric_type: MetricType::Histogram,
    description: "Time to complete a config source request in seconds",
};

// Listed explicitly so the binary can describe them on start-up.
pub const ALL_METRICS: &[MetricDef] = &[
    GROUP_TRENDING_HASHTAG_CONFIG_REQUEST,
    GROUP_TRENDING_HASHTAG_CONFIG_ERROR,
    GROUP_TRENDING_HASHTAG_CONFIG_NOT_FOUND,
    GROUP_TRENDING_HASHTAG_CONFIG_DUPLICATE,
    I18N_RESOLVE_FAILED,
    STRING_RESOLVE_FAILED,
    STRING_CONTENT_RESOLVE_FAILED,
    CONFIG_SOURCE_RETRY,
    CONFIG_SOURCE_DURATION,
];
