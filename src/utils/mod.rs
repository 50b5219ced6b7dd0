//! Shared helpers.

use regex::Regex;
use std::sync::LazyLock;

/// Dotted-quad IPv4 literal matcher shared by the normalizer and detectors.
pub static IPV4_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})").expect("IPV4_REGEX pattern is valid")
});

/// Clamp a message to at most `max` characters for alert detail payloads.
/// Slices on a char boundary so multi-byte input cannot panic.
pub fn truncate_message(message: &str, max: usize) -> &str {
    match message.char_indices().nth(max) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}
