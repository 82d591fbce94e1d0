//! Inbound message and outbound navigation checks.
//!
//! Every cross-document message is attacker-controlled until proven otherwise.
//! The browser delivers all messages to every listener, so these checks run
//! before any decoding.

use std::sync::OnceLock;

use pymprims_host::MessageData;
use regex::Regex;

use crate::error::{Result, WireError};

/// Origin pattern that accepts every sender.
pub const WILDCARD_ORIGIN: &str = "*";

/// A compiled, end-anchored origin pattern.
///
/// The configured value is a regular expression matched against the end of the
/// sender's origin, so `npr\.org` accepts `https://apps.npr.org`.
#[derive(Debug, Clone)]
pub struct OriginPattern {
    source: String,
    compiled: Option<Regex>,
}

impl OriginPattern {
    /// Compile a pattern. [`WILDCARD_ORIGIN`] accepts any origin.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern == WILDCARD_ORIGIN {
            return Ok(Self::wildcard());
        }

        let compiled = Regex::new(&format!("(?:{pattern})$")).map_err(|err| {
            WireError::InvalidOriginPattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            }
        })?;

        Ok(Self {
            source: pattern.to_string(),
            compiled: Some(compiled),
        })
    }

    /// The pattern that accepts every origin.
    pub fn wildcard() -> Self {
        Self {
            source: WILDCARD_ORIGIN.to_string(),
            compiled: None,
        }
    }

    /// Returns true if this is the wildcard pattern.
    pub fn is_wildcard(&self) -> bool {
        self.compiled.is_none()
    }

    /// The pattern as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `origin` ends with a match of this pattern.
    pub fn matches(&self, origin: &str) -> bool {
        match &self.compiled {
            Some(regex) => regex.is_match(origin),
            None => true,
        }
    }
}

impl Default for OriginPattern {
    fn default() -> Self {
        Self::wildcard()
    }
}

/// Returns true if an inbound message may be decoded.
///
/// Rejects senders whose origin does not match `expected`, and any payload that
/// is not a string.
pub fn is_safe_message(origin: &str, expected: &OriginPattern, data: &MessageData) -> bool {
    if !expected.matches(origin) {
        tracing::trace!(origin, pattern = expected.as_str(), "origin rejected");
        return false;
    }

    if !matches!(data, MessageData::Text(_)) {
        tracing::trace!(origin, "non-string message data ignored");
        return false;
    }

    true
}

/// Returns true if `url` is an acceptable navigation target.
///
/// Accepts `http`, `https`, `mailto` and `ftp` URLs and relative references.
/// Scheme-relative references (`//host/...`) are rejected, including the
/// spellings a browser's URL parser folds into one: leading control characters
/// or spaces, embedded tab/LF/CR, and backslashes in place of slashes.
pub fn is_safe_url(url: &str) -> bool {
    static SAFE_URL: OnceLock<Regex> = OnceLock::new();
    let pattern = SAFE_URL.get_or_init(|| {
        Regex::new(r"(?i)^(?:(?:https?|mailto|ftp):|[^&:/?#]*(?:[/?#]|$))")
            .unwrap_or_else(|err| unreachable!("static pattern compiles: {err}"))
    });

    let url = normalize_url(url);
    let mut leading = url.chars().take(2);
    let is_slash = |c: Option<char>| matches!(c, Some('/' | '\\'));
    if is_slash(leading.next()) && is_slash(leading.next()) {
        tracing::trace!(url = %url, "scheme-relative navigation rejected");
        return false;
    }

    pattern.is_match(&url)
}

/// Apply the browser's pre-parse cleanup: strip leading C0 controls and
/// spaces, then drop every tab, LF and CR.
fn normalize_url(url: &str) -> String {
    url.trim_start_matches(|c: char| c <= '\u{20}')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect()
}
