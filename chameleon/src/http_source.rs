use crate::config::ConfigSourceConfig;
use crate::metrics_defs::{CONFIG_SOURCE_DURATION, CONFIG_SOURCE_RETRY};
use crate::payload::{ChameleonConfig, TrackingInfo};
use crate::source::{ConfigQuery, ConfigSource, ConfigSourceError, ContentKey};
use crate::types::MemberUrn;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use shared::{counter, histogram};
use std::collections::HashMap;
use std::thread::sleep;
use std::time::{Duration, Instant};
use url::Url;

const RETRIABLE_STATUS_CODES: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,     // 429
    StatusCode::INTERNAL_SERVER_ERROR, // 500
    StatusCode::BAD_GATEWAY,           // 502
    StatusCode::SERVICE_UNAVAILABLE,   // 503
    StatusCode::GATEWAY_TIMEOUT,       // 504
];

#[derive(Deserialize)]
struct ConfigsResponse {
    elements: Vec<ChameleonConfig>,
}

/// Config source backed by the Chameleon HTTP API.
pub struct HttpConfigSource {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpConfigSource {
    pub fn new(config: &ConfigSourceConfig) -> Result<Self, ConfigSourceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(HttpConfigSource {
            client,
            base_url: config.url.as_str().trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ConfigSourceError> {
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| ConfigSourceError::InvalidUrl(e.to_string()))
    }

    // Retries retriable statuses with exponential backoff. Any other
    // unsuccessful status fails immediately.
    fn send_with_retries<F>(&self, build: F) -> Result<Response, ConfigSourceError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let start = Instant::now();

        let result = loop {
            let response = match build().send() {
                Ok(response) => response,
                Err(e) => break Err(e.into()),
            };
            let status = response.status();

            if status.is_success() {
                break Ok(response);
            }

            if !RETRIABLE_STATUS_CODES.contains(&status) {
                break Err(ConfigSourceError::UnexpectedStatus(status.as_u16()));
            }

            if retries >= self.max_retries {
                break Err(ConfigSourceError::RetriesExceeded(retries));
            }

            let delay = backoff_delay(self.retry_base_delay, retries);
            tracing::debug!(status = status.as_u16(), retries, "Retrying config source request");
            counter!(CONFIG_SOURCE_RETRY).increment(1);
            sleep(delay);
            retries += 1;
        };

        histogram!(CONFIG_SOURCE_DURATION).record(start.elapsed().as_secs_f64());
        result
    }
}

// Doubles `base` per retry, saturating instead of overflowing.
fn backoff_delay(base: Duration, retries: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(retries))
}

fn with_headers(mut builder: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl ConfigSource for HttpConfigSource {
    fn get_configs(
        &self,
        query: &ConfigQuery,
        subject: &MemberUrn,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<ChameleonConfig>, ConfigSourceError> {
        let mut url = self.endpoint("configs")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("configType", query.config_format())
                .append_pair("product", query.config_type().product())
                .append_pair("subject", &subject.to_string());
            for (key, value) in query.params() {
                pairs.append_pair(key, value);
            }
        }

        let response =
            self.send_with_retries(|| with_headers(self.client.get(url.clone()), headers))?;
        let configs = response.json::<ConfigsResponse>()?.elements;

        tracing::debug!(
            config_type = query.config_format(),
            count = configs.len(),
            "Fetched configs from chameleon"
        );
        Ok(configs)
    }

    fn get_content_config(
        &self,
        content_key: &ContentKey,
        subject: &MemberUrn,
        config_id: Option<&str>,
        locale_params: &HashMap<String, String>,
    ) -> Result<ChameleonConfig, ConfigSourceError> {
        let mut url = self.endpoint("contents")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("urn", &content_key.urn.to_string())
                .append_pair("locale", &content_key.locale.to_string())
                .append_pair("subject", &subject.to_string());
            if let Some(id) = config_id {
                pairs.append_pair("configId", id);
            }
        }

        let response = self.send_with_retries(|| {
            self.client.get(url.clone()).query(
                &locale_params
                    .iter()
                    .filter(|(key, _)| key.as_str() != "locale")
                    .collect::<Vec<_>>(),
            )
        });

        match response {
            Ok(response) => Ok(response.json::<ChameleonConfig>()?),
            Err(ConfigSourceError::UnexpectedStatus(404)) => Err(
                ConfigSourceError::ContentNotFound(content_key.urn.to_string()),
            ),
            Err(e) => Err(e),
        }
    }

    fn fire_all_tracking(&self, tracking_info: &TrackingInfo) {
        let url = match self.endpoint("tracking") {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Not able to build tracking url");
                return;
            }
        };

        let result = self
            .client
            .post(url)
            .json(tracking_info)
            .send()
            .and_then(Response::error_for_status);

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to fire chameleon tracking");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfigTypeUrn, Locale};
    use mockito::Matcher;
    use serde_json::json;

    fn source_for(server: &mockito::Server) -> HttpConfigSource {
        HttpConfigSource::new(&ConfigSourceConfig {
            url: Url::parse(&server.url()).unwrap(),
            timeout_ms: 2000,
            max_retries: 3,
            retry_base_delay_ms: 1,
        })
        .unwrap()
    }

    fn query() -> ConfigQuery {
        ConfigQuery::new(ConfigTypeUrn::new("voyager-api", "group-trending-hashtag"))
            .with_param("groupId", "urn:li:group:12345")
    }

    #[test]
    fn fetches_configs() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/configs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("configType".into(), "group-trending-hashtag".into()),
                Matcher::UrlEncoded("product".into(), "voyager-api".into()),
                Matcher::UrlEncoded("subject".into(), "urn:li:member:100".into()),
                Matcher::UrlEncoded("groupId".into(), "urn:li:group:12345".into()),
            ]))
            .match_header("x-li-chameleon-ec-test_id", "1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"elements": [{
                    "urn": "urn:li:chameleonConfig:1",
                    "payload": {"hashtagCards": [{"hashtag": "#FirstHashtag"}]}
                }]})
                .to_string(),
            )
            .create();

        let headers = HashMap::from([("x-li-chameleon-ec-test_id".to_string(), "1".to_string())]);
        let configs = source_for(&server)
            .get_configs(&query(), &MemberUrn::new(100), &headers)
            .unwrap();

        mock.assert();
        assert_eq!(configs.len(), 1);
        assert_eq!(
            configs[0].payload_object().get_object_list(&["hashtagCards"]).unwrap().len(),
            1
        );
    }

    #[test]
    fn retries_retriable_statuses() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/configs")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(4)
            .create();

        let result = source_for(&server).get_configs(&query(), &MemberUrn::new(100), &HashMap::new());

        mock.assert();
        assert!(matches!(result, Err(ConfigSourceError::RetriesExceeded(3))));
    }

    #[test]
    fn many_retries_do_not_overflow() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/configs")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(41)
            .create();

        let source = HttpConfigSource::new(&ConfigSourceConfig {
            url: Url::parse(&server.url()).unwrap(),
            timeout_ms: 2000,
            max_retries: 40,
            retry_base_delay_ms: 0,
        })
        .unwrap();
        let result = source.get_configs(&query(), &MemberUrn::new(100), &HashMap::new());

        mock.assert();
        assert!(matches!(result, Err(ConfigSourceError::RetriesExceeded(40))));
    }

    #[test]
    fn backoff_saturates() {
        let base = Duration::from_millis(50);
        assert_eq!(backoff_delay(base, 0), base);
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(400));
        assert_eq!(backoff_delay(base, 40), base * u32::MAX);
        assert_eq!(backoff_delay(Duration::MAX, 1), Duration::MAX);
        assert_eq!(backoff_delay(Duration::ZERO, 40), Duration::ZERO);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/configs")
            .match_query(Matcher::Any)
            .with_status(400)
            .expect(1)
            .create();

        let result = source_for(&server).get_configs(&query(), &MemberUrn::new(100), &HashMap::new());

        mock.assert();
        assert!(matches!(result, Err(ConfigSourceError::UnexpectedStatus(400))));
    }

    #[test]
    fn fetches_localized_content() {
        let mut server = mockito::Server::new();
        let urn = "urn:li:chameleon:language-pack:voyager-api:group-trending-hashtag-prompt:1662514814632-mpykbrfukki";
        let mock = server
            .mock("GET", "/contents")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("urn".into(), urn.into()),
                Matcher::UrlEncoded("locale".into(), "en_US".into()),
                Matcher::UrlEncoded("configId".into(), "42".into()),
            ]))
            .with_status(200)
            .with_body(json!({"urn": urn, "payload": "View your posts"}).to_string())
            .create();

        let key = ContentKey::new(urn.parse().unwrap(), Locale::default());
        let content = source_for(&server)
            .get_content_config(&key, &MemberUrn::new(100), Some("42"), &HashMap::new())
            .unwrap();

        mock.assert();
        assert_eq!(content.payload_object().get_string(&[]), Ok("View your posts"));
    }

    #[test]
    fn missing_content_is_reported() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/contents")
            .match_query(Matcher::Any)
            .with_status(404)
            .create();

        let urn = "urn:li:chameleon:language-pack:voyager-api:prompt:missing";
        let key = ContentKey::new(urn.parse().unwrap(), Locale::default());
        let result = source_for(&server).get_content_config(
            &key,
            &MemberUrn::new(100),
            None,
            &HashMap::new(),
        );

        assert!(matches!(result, Err(ConfigSourceError::ContentNotFound(u)) if u == urn));
    }

    #[test]
    fn tracking_failures_are_swallowed() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/tracking").with_status(500).create();

        source_for(&server).fire_all_tracking(&TrackingInfo::default());

        mock.assert();
    }
}
