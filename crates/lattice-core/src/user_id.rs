use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A full Matrix user identifier of the form `@localpart:domain`.
///
/// Values only exist for strings that parsed successfully and are immutable
/// afterwards, so every `UserId` in the program is well-formed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId {
    localpart: String,
    domain: String,
}

/// The string did not form a valid `@localpart:domain` user identifier.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid user name, expected the form @localpart:domain")]
pub struct InvalidUserIdError;

impl UserId {
    /// Parses a raw identifier string.
    ///
    /// The localpart must be non-empty and free of whitespace; the domain
    /// must be a syntactically plausible hostname, optionally carrying an
    /// explicit port.
    pub fn parse(raw: &str) -> Result<Self, InvalidUserIdError> {
        let rest = raw.strip_prefix('@').ok_or(InvalidUserIdError)?;
        let (localpart, domain) = rest.split_once(':').ok_or(InvalidUserIdError)?;

        if localpart.is_empty() || localpart.contains(char::is_whitespace) {
            return Err(InvalidUserIdError);
        }
        if !is_valid_domain(domain) {
            return Err(InvalidUserIdError);
        }

        Ok(Self {
            localpart: localpart.to_owned(),
            domain: domain.to_owned(),
        })
    }

    /// The part before the `:`, without the leading `@`.
    pub fn localpart(&self) -> &str {
        &self.localpart
    }

    /// The server domain the identifier belongs to, including any port.
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

fn is_valid_domain(domain: &str) -> bool {
    let (host, port) = match domain.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    };

    if let Some(port) = port {
        if port.is_empty() || port.parse::<u16>().is_err() {
            return false;
        }
    }

    !host.is_empty()
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
                && !label.starts_with('-')
                && !label.ends_with('-')
        })
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}:{}", self.localpart, self.domain)
    }
}

impl FromStr for UserId {
    type Err = InvalidUserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
