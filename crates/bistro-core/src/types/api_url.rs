//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the dashboard API.
///
/// The URL must be absolute and use HTTPS (HTTP is allowed for localhost).
/// Endpoint paths are appended to it with [`ApiUrl::endpoint`].
///
/// # Example
///
/// ```
/// use bistro_core::ApiUrl;
///
/// let api = ApiUrl::new("https://pos.example.com").unwrap();
/// assert_eq!(api.endpoint("/api/auth/signin"),
///            "https://pos.example.com/api/auth/signin");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the absolute URL for an endpoint path such as `/api/account/`.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
