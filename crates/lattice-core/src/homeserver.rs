use std::fmt;

use thiserror::Error;
use url::Url;

/// A resolved Matrix homeserver, identified by a validated base URL.
///
/// Only `http`/`https` URLs without query or fragment are representable.
/// Values are produced by discovery or by explicit parsing, never assembled
/// from untrusted input without going through validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Homeserver {
    base_url: Url,
}

/// The string could not be accepted as a homeserver base URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHomeserverUrlError {
    /// Not parseable as a URL at all, or missing a host.
    #[error("homeserver URL could not be parsed")]
    Malformed,
    /// Parseable, but using a scheme other than `http`/`https`.
    #[error("homeserver URL must use http or https, got {0:?}")]
    UnsupportedScheme(String),
    /// Carries a query string or fragment, which a base URL must not.
    #[error("homeserver URL must not carry a query or fragment")]
    ExtraComponents,
}

impl Homeserver {
    /// Validates and normalizes a base URL string.
    pub fn parse(raw: &str) -> Result<Self, InvalidHomeserverUrlError> {
        let url = Url::parse(raw.trim()).map_err(|_| InvalidHomeserverUrlError::Malformed)?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(InvalidHomeserverUrlError::UnsupportedScheme(
                    other.to_owned(),
                ))
            }
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidHomeserverUrlError::ExtraComponents);
        }
        if url.host_str().is_none() {
            return Err(InvalidHomeserverUrlError::Malformed);
        }

        Ok(Self { base_url: url })
    }

    /// The discovery fallback rule: treat `https://{domain}` as the base URL.
    pub fn from_domain(domain: &str) -> Result<Self, InvalidHomeserverUrlError> {
        Self::parse(&format!("https://{domain}"))
    }

    /// The validated base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The base URL in string form, as used for credential store keys.
    pub fn as_str(&self) -> &str {
        self.base_url.as_str()
    }

    /// Joins API path segments onto the base URL, percent-escaping each
    /// segment and avoiding duplicate slashes.
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("http(s) URLs can always be a base")
            .pop_if_empty()
            .extend(segments);
        url
    }
}

impl fmt::Display for Homeserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_normalizes_https_base() {
        let hs = Homeserver::parse("https://matrix.example.org").unwrap();
        assert_eq!(hs.as_str(), "https://matrix.example.org/");
        assert_eq!(hs, Homeserver::parse("https://matrix.example.org/").unwrap());
    }

    #[test]
    fn from_domain_applies_https() {
        let hs = Homeserver::from_domain("example.org").unwrap();
        assert_eq!(hs.as_str(), "https://example.org/");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert_eq!(
            Homeserver::parse("ftp://example.org"),
            Err(InvalidHomeserverUrlError::UnsupportedScheme("ftp".into()))
        );
    }

    #[test]
    fn rejects_query_and_fragment() {
        assert_eq!(
            Homeserver::parse("https://example.org?x=1"),
            Err(InvalidHomeserverUrlError::ExtraComponents)
        );
        assert_eq!(
            Homeserver::parse("https://example.org#frag"),
            Err(InvalidHomeserverUrlError::ExtraComponents)
        );
    }

    #[test]
    fn rejects_unparseable_input() {
        for raw in ["", "not a url", "https://"] {
            assert_eq!(
                Homeserver::parse(raw),
                Err(InvalidHomeserverUrlError::Malformed),
                "input: {raw:?}"
            );
        }
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let hs = Homeserver::parse("https://matrix.example.org/").unwrap();
        let url = hs.endpoint(["_matrix", "client", "v3", "login"]);
        assert_eq!(url.as_str(), "https://matrix.example.org/_matrix/client/v3/login");
    }

    #[test]
    fn endpoint_escapes_segments() {
        let hs = Homeserver::parse("https://matrix.example.org").unwrap();
        let url = hs.endpoint(["_matrix", "client", "v3", "login", "sso", "redirect", "a b"]);
        assert!(url.as_str().ends_with("/redirect/a%20b"));
    }
}
