pub mod config;
pub mod group_trending_hashtag;
pub mod http_source;
pub mod metrics_defs;
pub mod payload;
pub mod request;
pub mod sensor;
pub mod service;
pub mod source;
pub mod system_image;
pub mod types;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;
