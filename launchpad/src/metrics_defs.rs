//! Metrics definitions for the launchpad card API.

use shared::metrics_defs::{MetricDef, MetricType};

pub const CARD_RENDERED: MetricDef = MetricDef {
    name: "launchpad.card.rendered",
    metric_type: MetricType::Counter,
    description: "Number of group hashtag prompt cards rendered",
};

pub const CARD_NOT_FOUND: MetricDef = MetricDef {
    name: "launchpad.card.not_found",
    metric_type: MetricType::Counter,
    description: "Number of card requests without a usable group config",
};

pub const CARD_FAILED: MetricDef = MetricDef {
    name: "launchpad.card.failed",
    metric_type: MetricType::Counter,
    description: "Number of card requests rejected or failed for other reasons",
};

pub const ALL_METRICS: &[MetricDef] = &[CARD_RENDERED, CARD_NOT_FOUND, CARD_FAILED];
