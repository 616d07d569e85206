//! Template resolver - substitutes markers with placeholder values.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::cache::ResolutionCache;
use crate::config::{EngineConfig, FallbackPolicy};
use crate::placeholder::{Context, PlaceholderRegistry};
use crate::utils::{Marker, Segment, parse_template, split_param};

/// Borrowed view over the engine parts needed to resolve a template.
pub struct Resolver<'a> {
    pub registry: &'a PlaceholderRegistry,
    pub cache: &'a ResolutionCache,
    pub config: &'a EngineConfig,
}

impl Resolver<'_> {
    /// Replace every resolvable marker in `template`.
    ///
    /// Markers are resolved one after another in the order they appear.
    /// Unknown placeholders, context mismatches and malformed markers are
    /// copied through verbatim; a failing callback yields the configured
    /// fallback. Text between markers is copied exactly.
    pub async fn replace(&self, template: &str, ctx: &Context) -> String {
        let mut out = String::with_capacity(template.len());

        for segment in parse_template(template) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Marker(marker) => match self.resolve_marker(&marker, ctx).await {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(marker.raw),
                },
            }
        }

        out
    }

    async fn resolve_marker(&self, marker: &Marker<'_>, ctx: &Context) -> Option<String> {
        let Some(definition) = self.registry.lookup(marker.namespace, marker.token) else {
            self.unresolved(marker, "unknown placeholder");
            return None;
        };

        if !definition.kind.accepts(ctx) {
            self.unresolved(
                marker,
                &format!("{} placeholder in a {} context", definition.kind, ctx.kind()),
            );
            return None;
        }

        let (param, options) = if self.config.formatting {
            split_param(marker.param_or_empty())
        } else {
            (Cow::Borrowed(marker.param_or_empty()), None)
        };

        match self.cache.resolve(&definition, ctx, &param).await {
            Ok(value) => Some(match options {
                Some(options) => options.apply(value),
                None => value,
            }),
            Err(_) => match self.config.fallback {
                FallbackPolicy::Marker => None,
                FallbackPolicy::Empty => Some(String::new()),
            },
        }
    }

    fn unresolved(&self, marker: &Marker<'_>, reason: &str) {
        if self.config.debug {
            warn!("Unresolved marker {}: {}", marker.raw, reason);
        } else {
            debug!("Unresolved marker {}: {}", marker.raw, reason);
        }
    }
}
