use super::client::Authentication;
use std::{convert::Infallible, fmt, str::FromStr};

/// Personal access token sent as a bearer credential.
///
/// [GitHub Docs].
///
/// [GitHub Docs]: https://docs.github.com/en/rest/overview/authenticating-to-the-rest-api
#[derive(PartialEq, Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl Authentication for BearerToken {
    fn to_authz_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl FromStr for BearerToken {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
