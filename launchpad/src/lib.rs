pub mod api;
pub mod card;
pub mod config;
pub mod formatter;
pub mod localization;
pub mod metrics_defs;
pub mod tracking;
pub mod view_model;
