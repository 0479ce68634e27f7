//! HTTP method as a typed enum, plus the fixed tunneling allow-set.
//!
//! The allow-set is its own enum rather than a runtime membership check:
//! once a `_method` token parses to an [`OverrideMethod`], a target outside
//! `HEAD | PUT | DELETE | OPTIONS | PATCH` is unrepresentable. `GET` and
//! `POST` are never valid targets, and the set is not configurable.

use std::fmt;
use std::str::FromStr;

/// A known HTTP method (RFC 9110).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Trace => "TRACE",
        }
    }
}

/// Parses a method token, ignoring case. Hosts hand over uppercase wire
/// methods; tunneling clients put whatever casing they like in `_method`.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONNECT" => Ok(Self::Connect),
            "DELETE" => Ok(Self::Delete),
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH" => Ok(Self::Patch),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "TRACE" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verb eligible as a tunneling target.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OverrideMethod {
    Head,
    Put,
    Delete,
    Options,
    Patch,
}

impl OverrideMethod {
    /// Narrows a method to the allow-set.
    pub fn from_method(method: Method) -> Option<Self> {
        match method {
            Method::Head => Some(Self::Head),
            Method::Put => Some(Self::Put),
            Method::Delete => Some(Self::Delete),
            Method::Options => Some(Self::Options),
            Method::Patch => Some(Self::Patch),
            _ => None,
        }
    }

    /// Parses a raw `_method` body token. Anything outside the allow-set,
    /// garbage included, is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        token.parse().ok().and_then(Self::from_method)
    }

    /// Widens back to the full method enum.
    pub fn as_method(self) -> Method {
        match self {
            Self::Head => Method::Head,
            Self::Put => Method::Put,
            Self::Delete => Method::Delete,
            Self::Options => Method::Options,
            Self::Patch => Method::Patch,
        }
    }
}

impl fmt::Display for OverrideMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_method().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_case() {
        assert_eq!("delete".parse::<Method>(), Ok(Method::Delete));
        assert_eq!("DELETE".parse::<Method>(), Ok(Method::Delete));
        assert_eq!("DeLeTe".parse::<Method>(), Ok(Method::Delete));
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn allow_set_membership() {
        assert_eq!(OverrideMethod::from_token("patch"), Some(OverrideMethod::Patch));
        assert_eq!(OverrideMethod::from_token("HEAD"), Some(OverrideMethod::Head));
        assert_eq!(OverrideMethod::from_token("get"), None);
        assert_eq!(OverrideMethod::from_token("POST"), None);
        assert_eq!(OverrideMethod::from_token("ERRORMETHOD"), None);
    }

    #[test]
    fn wire_form_is_uppercase() {
        assert_eq!(OverrideMethod::Patch.to_string(), "PATCH");
    }
}
