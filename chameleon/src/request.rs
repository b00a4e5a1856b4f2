//! Values scoped to the request a config is resolved for.

use crate::types::{Locale, LocaleError, MemberUrn};
use std::collections::HashMap;

/// Request-scoped collaborators read while resolving configs: the viewing
/// member, the headers forwarded to the config source and the request locale.
pub trait RequestContext: Send + Sync {
    fn member_urn(&self) -> MemberUrn;

    fn headers(&self) -> HashMap<String, String>;

    fn locale(&self) -> Result<Locale, LocaleError>;
}

/// A request as seen by the card API.
#[derive(Clone, Debug)]
pub struct CurrentRequest {
    member_urn: MemberUrn,
    headers: HashMap<String, String>,
    accept_language: Option<String>,
}

impl CurrentRequest {
    pub fn new(member_urn: MemberUrn) -> Self {
        CurrentRequest {
            member_urn,
            headers: HashMap::new(),
            accept_language: None,
        }
    }

    pub fn with_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_accept_language<S: Into<String>>(mut self, accept_language: S) -> Self {
        self.accept_language = Some(accept_language.into());
        self
    }
}

impl RequestContext for CurrentRequest {
    fn member_urn(&self) -> MemberUrn {
        self.member_urn
    }

    fn headers(&self) -> HashMap<String, String> {
        self.headers.clone()
    }

    /// Uses the first language range of `Accept-Language`, falling back to
    /// `en_US` when the header is absent or only holds a wildcard.
    fn locale(&self) -> Result<Locale, LocaleError> {
        let Some(accept_language) = &self.accept_language else {
            return Ok(Locale::default());
        };

        let first = accept_language
            .split(',')
            .next()
            .and_then(|range| range.split(';').next())
            .map(str::trim)
            .unwrap_or_default();

        match first {
            "" | "*" => Ok(Locale::default()),
            tag => tag.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_from_accept_language() {
        let request = CurrentRequest::new(MemberUrn::new(1))
            .with_accept_language("de-DE;q=0.9, en;q=0.5");
        assert_eq!(request.locale().unwrap().to_string(), "de_DE");

        let request = CurrentRequest::new(MemberUrn::new(1));
        assert_eq!(request.locale().unwrap(), Locale::default());

        let request = CurrentRequest::new(MemberUrn::new(1)).with_accept_language("*");
        assert_eq!(request.locale().unwrap(), Locale::default());

        let request = CurrentRequest::new(MemberUrn::new(1)).with_accept_language("not a locale");
        assert!(request.locale().is_err());
    }

    #[test]
    fn header_names_are_lowercased() {
        let request = CurrentRequest::new(MemberUrn::new(1)).with_header("X-Li-Chameleon-Mt-Preview", "1");
        assert_eq!(
            request.headers().get("x-li-chameleon-mt-preview").map(String::as_str),
            Some("1")
        );
    }
}
