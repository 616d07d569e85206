//! Output formatting options carried in a marker parameter.
//!
//! Options are comma separated segments of the parameter:
//! - `precision=N` - round numeric values to N decimals
//! - `map=<rules>` - pick an output by numeric comparison, e.g.
//!   `map=>=20:Full;>5:Ok;Low` (`>`, `<`, `=`, `>=`, `<=`, `!=`, a trailing rule
//!   without an operator is the fallback)
//! - `bool_map=<rules>` - replace values (compared trimmed), e.g.
//!   `bool_map=true:Yes;false:No`; a later rule for the same value wins
//! - `color_format=...` - accepted and ignored
//!
//! Every other segment is handed to the callback as its parameter.

use std::borrow::Cow;

const PRECISION: &str = "precision=";
const MAP: &str = "map=";
const BOOL_MAP: &str = "bool_map=";
const COLOR_FORMAT: &str = "color_format=";

/// Digits beyond this are noise for an `f64`.
const MAX_PRECISION: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operator {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
    Neq,
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    op: Operator,
    threshold: f64,
    output: String,
}

impl Condition {
    fn parse(rule: &str) -> Option<Self> {
        let (op, rest) = [
            (">=", Operator::Gte),
            ("<=", Operator::Lte),
            ("!=", Operator::Neq),
            (">", Operator::Gt),
            ("<", Operator::Lt),
            ("=", Operator::Eq),
        ]
        .into_iter()
        .find_map(|(prefix, op)| rule.strip_prefix(prefix).map(|rest| (op, rest)))?;

        let (threshold, output) = rest.split_once(':')?;
        Some(Self {
            op,
            threshold: threshold.trim().parse().ok()?,
            output: output.to_string(),
        })
    }

    fn matches(&self, value: f64) -> bool {
        match self.op {
            Operator::Gt => value > self.threshold,
            Operator::Lt => value < self.threshold,
            Operator::Eq => value == self.threshold,
            Operator::Gte => value >= self.threshold,
            Operator::Lte => value <= self.threshold,
            Operator::Neq => value != self.threshold,
        }
    }
}

/// Formatting applied to a resolved value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatOptions {
    precision: Option<usize>,
    conditions: Vec<Condition>,
    fallback: Option<String>,
    bool_map: Vec<(String, String)>,
}

impl FormatOptions {
    /// Apply precision, then `map`, then `bool_map`.
    pub fn apply(&self, value: String) -> String {
        let mut value = value;

        if let Some(precision) = self.precision
            && let Ok(number) = value.trim().parse::<f64>()
        {
            value = format!("{:.*}", precision, number);
        }

        if !self.conditions.is_empty() || self.fallback.is_some() {
            if let Ok(number) = value.trim().parse::<f64>() {
                if let Some(cond) = self.conditions.iter().find(|c| c.matches(number)) {
                    value = cond.output.clone();
                } else if let Some(fallback) = &self.fallback {
                    value = fallback.clone();
                }
            }
        }

        let trimmed = value.trim();
        if let Some((_, mapped)) = self
            .bool_map
            .iter()
            .rev()
            .find(|(from, _)| from == trimmed)
        {
            value = mapped.clone();
        }

        value
    }

    fn parse_map(&mut self, rules: &str) {
        if rules.is_empty() {
            return;
        }
        let parts: Vec<&str> = rules.split(';').collect();
        let last = parts.len() - 1;
        for (idx, rule) in parts.into_iter().enumerate() {
            match Condition::parse(rule) {
                Some(cond) => self.conditions.push(cond),
                None if idx == last => self.fallback = Some(rule.to_string()),
                None => {}
            }
        }
    }

    fn parse_bool_map(&mut self, rules: &str) {
        for rule in rules.split(';') {
            if let Some((from, to)) = rule.split_once(':') {
                self.bool_map.push((from.to_string(), to.to_string()));
            }
        }
    }
}

fn is_option(segment: &str) -> bool {
    [PRECISION, MAP, BOOL_MAP, COLOR_FORMAT]
        .iter()
        .any(|prefix| segment.starts_with(prefix))
}

/// Separate formatting options from the callback parameter.
///
/// Without any option segment the parameter is returned untouched.
pub fn split_param(param: &str) -> (Cow<'_, str>, Option<FormatOptions>) {
    if !param.split(',').any(is_option) {
        return (Cow::Borrowed(param), None);
    }

    let mut options = FormatOptions::default();
    let mut rest = vec![];

    for segment in param.split(',') {
        if let Some(p) = segment.strip_prefix(PRECISION) {
            options.precision = p
                .trim()
                .parse::<usize>()
                .ok()
                .map(|p| p.min(MAX_PRECISION));
        } else if let Some(rules) = segment.strip_prefix(BOOL_MAP) {
            options.parse_bool_map(rules);
        } else if let Some(rules) = segment.strip_prefix(MAP) {
            options.parse_map(rules);
        } else if segment.starts_with(COLOR_FORMAT) {
            continue;
        } else {
            rest.push(segment);
        }
    }

    (Cow::Owned(rest.join(",")), Some(options))
}
