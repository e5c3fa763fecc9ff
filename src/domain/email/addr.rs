//! Module related to email addresses.
//!
//! Addresses are scanned out of raw header text with a simple
//! pattern. Headers are not parsed as RFC 5322 address lists.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_ADDR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w.-]+@[\w.-]+").unwrap());

/// Finds every substring of the header looking like an email address.
pub fn extract_addrs(header: &str) -> impl Iterator<Item = &str> {
    EMAIL_ADDR.find_iter(header).map(|addr| addr.as_str())
}
