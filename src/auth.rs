//! Bearer credentials derived from a browser-style cookie string or a raw token.

const COOKIE_NAME: &str = "access_token";
const BEARER_PREFIX: &str = "Bearer ";

/// Pull the `access_token` value out of a `name=value; name=value` cookie string.
/// Surrounding quotes are dropped.
pub fn token_from_cookie(cookie: &str) -> Option<String> {
    cookie.split(';').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() != COOKIE_NAME {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// `Authorization` value for a token, adding the `Bearer ` prefix if missing.
pub fn bearer_header(token: &str) -> String {
    let token = token.trim();
    if token.starts_with(BEARER_PREFIX) {
        token.to_string()
    } else {
        format!("{BEARER_PREFIX}{token}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub authorization: Option<String>,
    pub cookie: Option<String>,
}

impl Credentials {
    /// An explicit token wins over the one embedded in the cookie.
    pub fn from_parts(token: Option<&str>, cookie: Option<&str>) -> Self {
        let cookie = cookie
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        let token = token
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| cookie.as_deref().and_then(token_from_cookie));

        Self {
            authorization: token.as_deref().map(bearer_header),
            cookie,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.authorization.is_none() && self.cookie.is_none()
    }
}
