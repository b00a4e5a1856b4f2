//! Config records returned by Chameleon and a read-only view over their payload.

use crate::types::{ContentUrn, UrnError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single config returned by the config source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChameleonConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub urn: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub metadata: Option<ConfigMetadata>,
    #[serde(default)]
    pub tracking_info: TrackingInfo,
}

impl ChameleonConfig {
    pub fn new<U: Into<String>>(urn: U, payload: Value) -> Self {
        ChameleonConfig {
            id: None,
            urn: urn.into(),
            payload,
            metadata: None,
            tracking_info: TrackingInfo::default(),
        }
    }

    pub fn payload_object(&self) -> PayloadObject<'_> {
        PayloadObject::new(&self.payload)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMetadata {
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub targeting: Option<ConfigTargetingInfo>,
}

/// Experiment the member was bucketed into when the config was selected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTargetingInfo {
    pub test_key: String,
    pub treatment: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("field {0:?} is not present")]
    Missing(String),
    #[error("field {path:?} is not {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
    },
    #[error("field {path:?} does not hold a content urn: {source}")]
    InvalidContentUrn { path: String, source: UrnError },
}

/// Borrowed view over a payload value, addressed by field path.
///
/// An empty path addresses the value itself.
#[derive(Clone, Copy, Debug)]
pub struct PayloadObject<'a> {
    value: &'a Value,
}

impl<'a> PayloadObject<'a> {
    pub fn new(value: &'a Value) -> Self {
        PayloadObject { value }
    }

    pub fn is_object(&self) -> bool {
        self.value.is_object()
    }

    pub fn get(&self, path: &[&str]) -> Option<&'a Value> {
        path.iter()
            .try_fold(self.value, |value, field| value.as_object()?.get(*field))
            .filter(|value| !value.is_null())
    }

    pub fn has_string(&self, path: &[&str]) -> bool {
        self.get(path).is_some_and(Value::is_string)
    }

    pub fn get_string(&self, path: &[&str]) -> Result<&'a str, PayloadError> {
        let value = self
            .get(path)
            .ok_or_else(|| PayloadError::Missing(path.join(".")))?;
        value.as_str().ok_or_else(|| PayloadError::TypeMismatch {
            path: path.join("."),
            expected: "a string",
        })
    }

    pub fn has_content_urn(&self, path: &[&str]) -> bool {
        self.get_content_urn(path).is_ok()
    }

    pub fn get_content_urn(&self, path: &[&str]) -> Result<ContentUrn, PayloadError> {
        self.get_string(path)?
            .parse()
            .map_err(|source| PayloadError::InvalidContentUrn {
                path: path.join("."),
                source,
            })
    }

    /// Elements of the array at `path`. A missing field yields no elements.
    pub fn get_object_list(&self, path: &[&str]) -> Result<Vec<PayloadObject<'a>>, PayloadError> {
        match self.get(path) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.iter().map(PayloadObject::new).collect()),
            Some(_) => Err(PayloadError::TypeMismatch {
                path: path.join("."),
                expected: "an array",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_paths() {
        let payload = json!({
            "hashtag": "#FirstHashtag",
            "count": 3,
            "nested": {"cta": "urn:li:chameleon:external:voyager-api:group-trending-hashtag-cta:viewPosts"},
            "empty": null,
        });
        let object = PayloadObject::new(&payload);

        assert!(object.has_string(&["hashtag"]));
        assert_eq!(object.get_string(&["hashtag"]), Ok("#FirstHashtag"));
        assert!(!object.has_string(&["count"]));
        assert!(matches!(
            object.get_string(&["count"]),
            Err(PayloadError::TypeMismatch { .. })
        ));
        assert_eq!(
            object.get_string(&["empty"]),
            Err(PayloadError::Missing("empty".into()))
        );
        assert_eq!(
            object.get_string(&["hashtag", "deeper"]),
            Err(PayloadError::Missing("hashtag.deeper".into()))
        );

        assert!(object.has_content_urn(&["nested", "cta"]));
        assert_eq!(
            object.get_content_urn(&["nested", "cta"]).unwrap().key(),
            "viewPosts"
        );
        assert!(!object.has_content_urn(&["hashtag"]));
    }

    #[test]
    fn root_string() {
        let payload = json!("View your posts");
        assert_eq!(PayloadObject::new(&payload).get_string(&[]), Ok("View your posts"));
    }

    #[test]
    fn object_lists() {
        let payload = json!({"cards": [{"hashtag": "a"}, {"hashtag": "b"}], "scalar": 1});
        let object = PayloadObject::new(&payload);

        let cards = object.get_object_list(&["cards"]).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].get_string(&["hashtag"]), Ok("b"));

        assert!(object.get_object_list(&["missing"]).unwrap().is_empty());
        assert!(object.get_object_list(&["scalar"]).is_err());
    }

    #[test]
    fn deserialize_config() {
        let config: ChameleonConfig = serde_json::from_value(json!({
            "id": "42",
            "urn": "urn:li:chameleonConfig:42",
            "payload": {"hashtagCards": []},
            "metadata": {"segment": "GROWTH:global"},
            "trackingInfo": {
                "trackingId": "abc",
                "targeting": {"testKey": "voyager.api.group-hashtag", "treatment": "enabled"}
            }
        }))
        .unwrap();

        assert_eq!(config.id.as_deref(), Some("42"));
        assert_eq!(
            config.metadata.unwrap().segment.as_deref(),
            Some("GROWTH:global")
        );
        assert_eq!(config.tracking_info.targeting.unwrap().treatment, "enabled");

        let minimal: ChameleonConfig =
            serde_json::from_value(json!({"urn": "urn:li:chameleonConfig:1"})).unwrap();
        assert_eq!(minimal.payload, Value::Null);
        assert_eq!(minimal.tracking_info, TrackingInfo::default());
    }
}
