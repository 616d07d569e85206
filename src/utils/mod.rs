//! Utility functions.
//!
//! Template parsing and value formatting shared by the resolver.

use std::borrow::Cow;

pub mod format;
pub mod parser;

pub use format::{FormatOptions, split_param};
pub use parser::{Marker, Segment, parse_template};

/// Shorten a string for log output.
pub fn truncate_for_log(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        None => Cow::Borrowed(s),
        Some((idx, _)) => Cow::Owned(format!("{}...({} bytes)", &s[..idx], s.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc...(6 bytes)");
    }
}
