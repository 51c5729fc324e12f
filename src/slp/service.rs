//! Discovered services and scope handling.

use core::fmt;

use super::messages::{ServiceReply, UrlEntry};

/// A service returned by a find: its URL and remaining lifetime in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlpService {
    pub url: String,
    pub lifetime: u16,
}

impl SlpService {
    pub fn new(url: impl Into<String>, lifetime: u16) -> Self {
        Self {
            url: url.into(),
            lifetime,
        }
    }
}

impl fmt::Display for SlpService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.url, self.lifetime)
    }
}

impl From<UrlEntry> for SlpService {
    fn from(entry: UrlEntry) -> Self {
        Self::new(entry.url, entry.lifetime)
    }
}

/// Reply decoder for find: entries in reply order, untouched.
pub(crate) fn services_from_reply(reply: ServiceReply) -> Vec<SlpService> {
    reply.url_entries.into_iter().map(SlpService::from).collect()
}

/// Drop duplicate scopes, keeping the first occurrence of each.
pub fn normalize_scopes<S: AsRef<str>>(scopes: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(scopes.len());
    for scope in scopes {
        let scope = scope.as_ref();
        if !out.iter().any(|s| s == scope) {
            out.push(scope.to_owned());
        }
    }
    out
}
