//! Cookie record and `Set-Cookie` string parsing.
//!
//! The [`Cookie`] struct is what the jar stores and what the JSON store writes to
//! disk. It can be (de)serialized via `serde`.
//!
//! ```rust
//! use cookie_bridge::cookies::Cookie;
//!
//! let c = Cookie::parse("session=abc123; Path=/; Secure; SameSite=lax").unwrap();
//! assert_eq!(c.name, "session");
//! assert_eq!(c.value, "abc123");
//! assert_eq!(c.same_site.as_deref(), Some("Lax"));
//! assert!(c.secure);
//! ```
use serde::{Deserialize, Serialize};

use crate::errors::CookieError;

/// A cookie as stored by the cookie facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping (e.g., `"/"`). When absent, the jar derives a default path from the URL.
    pub path: Option<String>,

    /// Domain scoping (host-only if `None`). The leading dot is stripped.
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Expiration timestamp as given by the caller. Stored, not enforced.
    pub expires: Option<String>,

    /// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
    pub same_site: Option<String>,

    /// If `true`, cookie is hidden from client-side scripts.
    pub http_only: bool,
}

impl Cookie {
    /// Parses a `Set-Cookie` style string such as `"a=b; Path=/; Secure"`.
    ///
    /// Unknown attributes are ignored. A missing `=` or an empty name is rejected.
    pub fn parse(set_cookie: &str) -> Result<Self, CookieError> {
        let mut parts = set_cookie.split(';');

        let pair = parts.next().unwrap_or_default().trim();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| CookieError::InvalidCookie(format!("missing `=` in `{pair}`")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CookieError::InvalidCookie(format!("empty cookie name in `{pair}`")));
        }

        let mut cookie = Cookie {
            name: name.to_string(),
            value: value.trim().to_string(),
            path: None,
            domain: None,
            secure: false,
            expires: None,
            same_site: None,
            http_only: false,
        };

        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((k, v)) = part.split_once('=') {
                let v = v.trim();
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(v.to_string()),
                    "domain" => cookie.domain = Some(v.trim_start_matches('.').to_ascii_lowercase()),
                    "expires" => cookie.expires = Some(v.to_string()),
                    "samesite" => cookie.same_site = Some(normalize_same_site(v)),
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if part.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            }
        }

        Ok(cookie)
    }

    /// `name=value` as sent in a `Cookie` request header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

// normalize to "Lax" | "Strict" | "None", leave unknown values as-is
fn normalize_same_site(value: &str) -> String {
    if value.eq_ignore_ascii_case("lax") {
        "Lax".to_string()
    } else if value.eq_ignore_ascii_case("strict") {
        "Strict".to_string()
    } else if value.eq_ignore_ascii_case("none") {
        "None".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_pair() {
        let c = Cookie::parse("a=b").unwrap();
        assert_eq!(c.name, "a");
        assert_eq!(c.value, "b");
        assert_eq!(c.path, None);
        assert!(!c.secure);
    }

    #[test]
    fn parses_attributes() {
        let c = Cookie::parse("id=42; Domain=.Example.com; Path=/app; HttpOnly; Expires=Wed, 21 Oct 2026 07:28:00 GMT")
            .unwrap();
        assert_eq!(c.domain.as_deref(), Some("example.com"));
        assert_eq!(c.path.as_deref(), Some("/app"));
        assert!(c.http_only);
        assert_eq!(c.expires.as_deref(), Some("Wed, 21 Oct 2026 07:28:00 GMT"));
    }

    #[test]
    fn empty_value_is_allowed() {
        let c = Cookie::parse("flag=; Path=/").unwrap();
        assert_eq!(c.value, "");
        assert_eq!(c.path.as_deref(), Some("/"));
    }

    #[test]
    fn rejects_missing_separator_and_empty_name() {
        assert!(matches!(Cookie::parse("novalue"), Err(CookieError::InvalidCookie(_))));
        assert!(matches!(Cookie::parse("=x"), Err(CookieError::InvalidCookie(_))));
    }
}
