//! Field readers shared by every service that builds records from Chameleon configs.

use crate::payload::{ChameleonConfig, PayloadError, PayloadObject};
use crate::request::RequestContext;
use crate::sensor::{CounterEvent, CounterSensor};
use crate::source::{ConfigQuery, ConfigSource, ConfigSourceError, ContentKey};
use crate::types::LocaleError;
use std::collections::HashMap;
use std::sync::Arc;

const CHAMELEON_PREVIEW_HEADER_KEY: &str = "x-li-chameleon-mt-preview";
const CHAMELEON_PREVIEW_DEFAULT_FALLBACK_HEADER: &str = "x-li-chameleon-preview-default-fallback";
pub const PARAM_LOCALE: &str = "locale";

/// Why a single field could not be resolved.
#[derive(thiserror::Error, Debug)]
pub enum ResolutionFailure {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
    #[error(transparent)]
    Source(#[from] ConfigSourceError),
}

/// Where a field lives, used as counter dimensions when it fails.
#[derive(Clone, Copy, Debug)]
pub struct FieldRef<'a> {
    pub key_type: &'a str,
    pub key: &'a str,
    pub field: &'a str,
}

impl FieldRef<'_> {
    fn dimensions(&self) -> [(&'static str, &str); 3] {
        [
            ("key_type", self.key_type),
            ("key", self.key),
            ("field", self.field),
        ]
    }
}

/// Config source access and field readers for one named service.
#[derive(Clone)]
pub struct ChameleonService {
    name: &'static str,
    source: Arc<dyn ConfigSource>,
    sensor: Arc<dyn CounterSensor>,
}

impl ChameleonService {
    pub fn new(
        name: &'static str,
        source: Arc<dyn ConfigSource>,
        sensor: Arc<dyn CounterSensor>,
    ) -> Self {
        ChameleonService {
            name,
            source,
            sensor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sensor(&self) -> &dyn CounterSensor {
        self.sensor.as_ref()
    }

    /// Fetches configs for the member of `request`, forwarding its headers.
    pub fn get_configs(
        &self,
        request: &dyn RequestContext,
        query: &ConfigQuery,
    ) -> Result<Vec<ChameleonConfig>, ConfigSourceError> {
        let mut headers = request.headers();
        if headers.contains_key(CHAMELEON_PREVIEW_HEADER_KEY) {
            headers.insert(
                CHAMELEON_PREVIEW_DEFAULT_FALLBACK_HEADER.to_string(),
                "true".to_string(),
            );
        }
        self.source
            .get_configs(query, &request.member_urn(), &headers)
    }

    /// Fires tracking only when the config carries both metadata and targeting info.
    pub fn fire_event(&self, config: &ChameleonConfig) {
        if config.metadata.is_some() && config.tracking_info.targeting.is_some() {
            self.source.fire_all_tracking(&config.tracking_info);
        }
    }

    /// Reads a string stored directly in the payload.
    ///
    /// A field that is absent or not a string is treated as absent.
    pub fn plain_string(
        &self,
        config: &ChameleonConfig,
        object: &PayloadObject<'_>,
        field: FieldRef<'_>,
    ) -> Result<Option<String>, ResolutionFailure> {
        let path = [field.field];
        if !object.has_string(&path) {
            return Ok(None);
        }

        let result = object
            .get_string(&path)
            .map(|s| Some(s.to_string()))
            .map_err(ResolutionFailure::from);

        result.inspect_err(|e| {
            tracing::warn!(
                service = self.name,
                config = %config.urn,
                field = field.field,
                error = %e,
                "Not able to resolve plain string"
            );
            self.sensor
                .increment(CounterEvent::StringResolveFailed, &field.dimensions());
        })
    }

    /// Reads the key of a content urn stored in the payload, without fetching the content.
    ///
    /// A field that is absent or not a string is treated as absent; a string
    /// that is not a content urn is a failure.
    pub fn plain_string_content(
        &self,
        config: &ChameleonConfig,
        object: &PayloadObject<'_>,
        field: FieldRef<'_>,
    ) -> Result<Option<String>, ResolutionFailure> {
        let path = [field.field];
        if !object.has_string(&path) {
            return Ok(None);
        }

        let result = object
            .get_content_urn(&path)
            .map(|urn| Some(urn.key().to_string()))
            .map_err(ResolutionFailure::from);

        result.inspect_err(|e| {
            tracing::warn!(
                service = self.name,
                config = %config.urn,
                field = field.field,
                error = %e,
                "Not able to resolve plain string content"
            );
            self.sensor
                .increment(CounterEvent::StringContentResolveFailed, &field.dimensions());
        })
    }

    /// Resolves a content urn stored in the payload to its text in the request locale.
    ///
    /// A field without a content urn is treated as absent.
    pub fn i18n_string_content(
        &self,
        request: &dyn RequestContext,
        config: &ChameleonConfig,
        object: &PayloadObject<'_>,
        field: FieldRef<'_>,
    ) -> Result<Option<String>, ResolutionFailure> {
        let path = [field.field];
        if !object.has_content_urn(&path) {
            return Ok(None);
        }

        self.fetch_i18n_string(request, config, object, &path)
            .map(Some)
            .inspect_err(|e| {
                tracing::error!(
                    service = self.name,
                    config = %config.urn,
                    field = field.field,
                    error = %e,
                    "Not able to resolve I18N string"
                );
                self.sensor
                    .increment(CounterEvent::I18nResolveFailed, &field.dimensions());
            })
    }

    fn fetch_i18n_string(
        &self,
        request: &dyn RequestContext,
        config: &ChameleonConfig,
        object: &PayloadObject<'_>,
        path: &[&str],
    ) -> Result<String, ResolutionFailure> {
        let locale = request.locale()?;
        let locale_params = HashMap::from([(PARAM_LOCALE.to_string(), locale.to_string())]);
        let content_key = ContentKey::new(object.get_content_urn(path)?, locale);

        let content = self.source.get_content_config(
            &content_key,
            &request.member_urn(),
            config.id.as_deref(),
            &locale_params,
        )?;

        Ok(content.payload_object().get_string(&[])?.to_string())
    }
}
