use std::fmt;
use std::str::FromStr;

const MEMBER_URN_PREFIX: &str = "urn:li:member:";
const GROUP_URN_PREFIX: &str = "urn:li:group:";
const CONTENT_URN_PREFIX: &str = "urn:li:chameleon:";
const CONFIG_TYPE_URN_PREFIX: &str = "urn:li:chameleonConfigType:";
const MULTI_PRODUCT_URN_PREFIX: &str = "urn:li:multiProduct:";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UrnError {
    #[error("expected an urn starting with {expected}, got {actual}")]
    WrongPrefix {
        expected: &'static str,
        actual: String,
    },
    #[error("invalid numeric id in urn {0}")]
    InvalidId(String),
    #[error("malformed urn {0}")]
    Malformed(String),
}

fn parse_numeric(s: &str, prefix: &'static str) -> Result<i64, UrnError> {
    let id = s.strip_prefix(prefix).ok_or_else(|| UrnError::WrongPrefix {
        expected: prefix,
        actual: s.to_string(),
    })?;
    id.parse().map_err(|_| UrnError::InvalidId(s.to_string()))
}

/// Subject of a config lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemberUrn(i64);

impl MemberUrn {
    pub fn new(id: i64) -> Self {
        MemberUrn(id)
    }

    pub fn id(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MemberUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MEMBER_URN_PREFIX}{}", self.0)
    }
}

impl FromStr for MemberUrn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numeric(s, MEMBER_URN_PREFIX).map(MemberUrn)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupUrn(i64);

impl GroupUrn {
    pub fn new(id: i64) -> Self {
        GroupUrn(id)
    }

    pub fn id(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for GroupUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{GROUP_URN_PREFIX}{}", self.0)
    }
}

impl FromStr for GroupUrn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_numeric(s, GROUP_URN_PREFIX).map(GroupUrn)
    }
}

/// Reference to a piece of content stored in Chameleon, e.g.
/// `urn:li:chameleon:external:voyager-api:group-trending-hashtag-cta:viewPosts`.
///
/// The last segment is the content key. For `external` content the key is the
/// value itself; `language-pack` content has to be fetched for a locale.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentUrn {
    kind: String,
    product: String,
    content_type: String,
    key: String,
}

impl ContentUrn {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ContentUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CONTENT_URN_PREFIX}{}:{}:{}:{}",
            self.kind, self.product, self.content_type, self.key
        )
    }
}

impl FromStr for ContentUrn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(CONTENT_URN_PREFIX)
            .ok_or_else(|| UrnError::WrongPrefix {
                expected: CONTENT_URN_PREFIX,
                actual: s.to_string(),
            })?;

        let parts: Vec<&str> = rest.splitn(4, ':').collect();
        match parts.as_slice() {
            [kind, product, content_type, key] if parts.iter().all(|p| !p.is_empty()) => {
                Ok(ContentUrn {
                    kind: kind.to_string(),
                    product: product.to_string(),
                    content_type: content_type.to_string(),
                    key: key.to_string(),
                })
            }
            _ => Err(UrnError::Malformed(s.to_string())),
        }
    }
}

/// Identifies a config type, e.g.
/// `urn:li:chameleonConfigType:(urn:li:multiProduct:voyager-api,group-trending-hashtag)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConfigTypeUrn {
    product: String,
    format: String,
}

impl ConfigTypeUrn {
    pub fn new<P, F>(product: P, format: F) -> Self
    where
        P: Into<String>,
        F: Into<String>,
    {
        ConfigTypeUrn {
            product: product.into(),
            format: format.into(),
        }
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl fmt::Display for ConfigTypeUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CONFIG_TYPE_URN_PREFIX}({MULTI_PRODUCT_URN_PREFIX}{},{})",
            self.product, self.format
        )
    }
}

impl FromStr for ConfigTypeUrn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tuple = s
            .strip_prefix(CONFIG_TYPE_URN_PREFIX)
            .ok_or_else(|| UrnError::WrongPrefix {
                expected: CONFIG_TYPE_URN_PREFIX,
                actual: s.to_string(),
            })?
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .ok_or_else(|| UrnError::Malformed(s.to_string()))?;

        let (multi_product, format) = tuple
            .split_once(',')
            .ok_or_else(|| UrnError::Malformed(s.to_string()))?;
        let product = multi_product
            .strip_prefix(MULTI_PRODUCT_URN_PREFIX)
            .ok_or_else(|| UrnError::Malformed(s.to_string()))?;

        if product.is_empty() || format.is_empty() {
            return Err(UrnError::Malformed(s.to_string()));
        }

        Ok(ConfigTypeUrn::new(product, format))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    #[error("invalid locale tag: {0:?}")]
    InvalidTag(String),
    #[error("no locale available for the current request")]
    Unavailable,
}

/// Language plus optional country, rendered as `en_US`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale {
            language: "en".into(),
            country: Some("US".into()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => write!(f, "{}", self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    /// Accepts `en`, `en_US` and `en-US`. A script subtag, as in
    /// `zh-Hant-TW`, is skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LocaleError::InvalidTag(s.to_string());
        let mut parts = s.trim().split(['_', '-']).peekable();

        let language = parts.next().ok_or_else(invalid)?;
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        parts.next_if(|p| p.len() == 4 && p.chars().all(|c| c.is_ascii_alphabetic()));

        let country = match parts.next() {
            None => None,
            Some(c)
                if (c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
                    || (c.len() == 3 && c.chars().all(|ch| ch.is_ascii_digit())) =>
            {
                Some(c.to_ascii_uppercase())
            }
            Some(_) => return Err(invalid()),
        };

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Locale {
            language: language.to_ascii_lowercase(),
            country,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_urns() {
        let group: GroupUrn = "urn:li:group:12345".parse().unwrap();
        assert_eq!(group.id(), 12345);
        assert_eq!(group.to_string(), "urn:li:group:12345");

        let member: MemberUrn = "urn:li:member:100".parse().unwrap();
        assert_eq!(member, MemberUrn::new(100));

        assert!(matches!(
            "urn:li:member:100".parse::<GroupUrn>(),
            Err(UrnError::WrongPrefix { .. })
        ));
        assert_eq!(
            "urn:li:group:abc".parse::<GroupUrn>(),
            Err(UrnError::InvalidId("urn:li:group:abc".into()))
        );
    }

    #[test]
    fn content_urn() {
        let urn: ContentUrn =
            "urn:li:chameleon:language-pack:voyager-api:group-trending-hashtag-prompt:1662514814632-mpykbrfukki"
                .parse()
                .unwrap();
        assert_eq!(urn.kind(), "language-pack");
        assert_eq!(urn.product(), "voyager-api");
        assert_eq!(urn.content_type(), "group-trending-hashtag-prompt");
        assert_eq!(urn.key(), "1662514814632-mpykbrfukki");
        assert_eq!(
            urn.to_string(),
            "urn:li:chameleon:language-pack:voyager-api:group-trending-hashtag-prompt:1662514814632-mpykbrfukki"
        );

        assert!("#FirstHashtag".parse::<ContentUrn>().is_err());
        assert!("urn:li:chameleon:external:voyager-api".parse::<ContentUrn>().is_err());
        assert!("urn:li:chameleon:external:voyager-api:cta:".parse::<ContentUrn>().is_err());
    }

    #[test]
    fn config_type_urn() {
        let s = "urn:li:chameleonConfigType:(urn:li:multiProduct:voyager-api,group-trending-hashtag)";
        let urn: ConfigTypeUrn = s.parse().unwrap();
        assert_eq!(urn.product(), "voyager-api");
        assert_eq!(urn.format(), "group-trending-hashtag");
        assert_eq!(urn.to_string(), s);

        assert!("urn:li:chameleonConfigType:voyager-api".parse::<ConfigTypeUrn>().is_err());
    }

    #[test]
    fn locales() {
        let us: Locale = "en-us".parse().unwrap();
        assert_eq!(us, Locale::default());
        assert_eq!(us.to_string(), "en_US");

        let fr: Locale = "fr".parse().unwrap();
        assert_eq!(fr.country(), None);
        assert_eq!(fr.to_string(), "fr");

        let latam: Locale = "es_419".parse().unwrap();
        assert_eq!(latam.country(), Some("419"));

        assert!("".parse::<Locale>().is_err());
        assert!("english".parse::<Locale>().is_err());
        assert!("en_US_POSIX".parse::<Locale>().is_err());
    }

    #[test]
    fn locales_with_script() {
        let traditional: Locale = "zh-Hant-TW".parse().unwrap();
        assert_eq!(traditional.language(), "zh");
        assert_eq!(traditional.country(), Some("TW"));
        assert_eq!(traditional.to_string(), "zh_TW");

        let serbian: Locale = "sr-Latn".parse().unwrap();
        assert_eq!(serbian.to_string(), "sr");

        assert!("zh-Hant-TW-x".parse::<Locale>().is_err());
    }
}
