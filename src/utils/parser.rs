//! Template marker parser.
//!
//! Marker syntax:
//! - `{namespace:token}` - placeholder without a parameter
//! - `{namespace:token:param}` - everything after the second `:` is the
//!   parameter, verbatim (it may contain more `:`)
//!
//! The first `}` after a `{` closes the marker; braces do not nest and there
//! is no escape for literal braces. Anything that does not form a valid
//! marker stays in the text untouched.

/// A marker found in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    pub namespace: &'a str,
    pub token: &'a str,
    pub param: Option<&'a str>,
    /// The marker as written, braces included.
    pub raw: &'a str,
}

impl<'a> Marker<'a> {
    /// Parameter, or the empty string when the marker has none.
    pub fn param_or_empty(&self) -> &'a str {
        self.param.unwrap_or("")
    }
}

/// A run of a parsed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Marker(Marker<'a>),
}

/// Split a template into literal text and markers, in order.
///
/// Concatenating the `Text` runs and each marker's `raw` gives back the
/// input exactly.
pub fn parse_template(input: &str) -> Vec<Segment<'_>> {
    let mut segments = vec![];
    let mut text_start = 0;
    let mut i = 0;

    while let Some(open) = input[i..].find('{').map(|o| o + i) {
        // No closing brace anywhere after: the rest is plain text.
        let Some(close) = input[open + 1..].find('}').map(|c| c + open + 1) else {
            break;
        };

        let raw = &input[open..=close];
        if let Some(marker) = parse_marker(raw) {
            if text_start < open {
                segments.push(Segment::Text(&input[text_start..open]));
            }
            segments.push(Segment::Marker(marker));
            text_start = close + 1;
        }
        i = close + 1;
    }

    if text_start < input.len() {
        segments.push(Segment::Text(&input[text_start..]));
    }

    segments
}

/// Parse a single `{...}` span.
fn parse_marker(raw: &str) -> Option<Marker<'_>> {
    let content = raw.strip_prefix('{')?.strip_suffix('}')?;

    let (namespace, rest) = content.split_once(':')?;
    let (token, param) = match rest.split_once(':') {
        Some((token, param)) => (token, Some(param)),
        None => (rest, None),
    };

    if namespace.is_empty() || token.is_empty() {
        return None;
    }
    if namespace.contains('{') || token.contains('{') {
        return None;
    }

    Some(Marker {
        namespace,
        token,
        param,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(input: &str) -> Vec<Marker<'_>> {
        parse_template(input)
            .into_iter()
            .filter_map(|s| match s {
                Segment::Marker(m) => Some(m),
                Segment::Text(_) => None,
            })
            .collect()
    }

    fn rebuild(input: &str) -> String {
        parse_template(input)
            .into_iter()
            .map(|s| match s {
                Segment::Text(t) => t,
                Segment::Marker(m) => m.raw,
            })
            .collect()
    }

    #[test]
    fn test_plain_text() {
        let input = "no markers here";
        assert_eq!(parse_template(input), vec![Segment::Text(input)]);
        assert!(parse_template("").is_empty());
    }

    #[test]
    fn test_marker_with_and_without_param() {
        let found = markers("Hi {player:name}, {js:hello:again}");

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].namespace, "player");
        assert_eq!(found[0].token, "name");
        assert_eq!(found[0].param, None);
        assert_eq!(found[1].token, "hello");
        assert_eq!(found[1].param, Some("again"));
    }

    #[test]
    fn test_param_keeps_colons() {
        let found = markers("{ns:token:a:b:c}");
        assert_eq!(found[0].param, Some("a:b:c"));
        assert_eq!(markers("{ns:token:}")[0].param, Some(""));
    }

    #[test]
    fn test_unclosed_marker_is_text() {
        let input = "value {ns:token";
        assert_eq!(parse_template(input), vec![Segment::Text(input)]);
    }

    #[test]
    fn test_malformed_markers_are_text() {
        for input in ["{}", "{name}", "{:token}", "{ns:}", "{a {ns:tok}"] {
            assert!(markers(input).is_empty(), "{} should not parse", input);
            assert_eq!(rebuild(input), input);
        }
    }

    #[test]
    fn test_first_close_brace_ends_marker() {
        let found = markers("{ns:token:x}y}");
        assert_eq!(found[0].param, Some("x"));
        assert_eq!(rebuild("{ns:token:x}y}"), "{ns:token:x}y}");
    }

    #[test]
    fn test_rebuild_is_exact() {
        let input = "欢迎, {player:name}! {js:hello:再次欢迎} {broken {srv:clock}}";
        assert_eq!(rebuild(input), input);
    }
}
