//! Label-routing data extracted from route configurations.
//!
//! A service's routing rule is an ordered list of match clauses, each
//! steering matching requests to a weighted service version; requests
//! matching no clause fall back to the default version.

use crate::{Matches, StringMatch};
use ahash::AHashMap as HashMap;

/// A single route predicate over a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteRule {
    Header { name: String, value: StringMatch },
    Parameter { name: String, value: StringMatch },
    Path(StringMatch),
}

/// Request attributes consulted during route selection.
#[derive(Clone, Debug, Default)]
pub struct RouteContext {
    pub path: String,
    pub headers: HashMap<String, Vec<String>>,
    pub params: HashMap<String, String>,
}

/// Routes requests matching `rules` to `version` with the given weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchService {
    pub version: String,
    /// Relative weight among clauses routing to the same match, 0..=100.
    pub weight: u32,
    pub rules: Vec<RouteRule>,
}

/// The full routing rule for one target service.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LabelRouteRule {
    pub matches: Vec<MatchService>,
    pub default_version: String,
}

/// Routing data keyed by the service it applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifiedRouteData {
    pub target_service: String,
    pub rule: LabelRouteRule,
}

// === impl RouteRule ===

impl Matches<RouteContext> for RouteRule {
    fn matches(&self, ctx: &RouteContext) -> bool {
        match self {
            Self::Header { name, value } => ctx
                .headers
                .get(name)
                .is_some_and(|vs| vs.iter().any(|v| value.matches(v))),
            Self::Parameter { name, value } => {
                ctx.params.get(name).is_some_and(|v| value.matches(v))
            }
            Self::Path(value) => value.matches(&ctx.path),
        }
    }
}

// === impl MatchService ===

impl MatchService {
    /// True when every rule in the clause matches the request.
    pub fn matches(&self, ctx: &RouteContext) -> bool {
        self.rules.iter().all(|rule| rule.matches(ctx))
    }
}

// === impl LabelRouteRule ===

impl LabelRouteRule {
    /// Selects the version for a request: the first matching clause wins,
    /// otherwise the default version applies.
    pub fn select(&self, ctx: &RouteContext) -> &str {
        self.matches
            .iter()
            .find(|m| m.matches(ctx))
            .map(|m| m.version.as_str())
            .unwrap_or(&self.default_version)
    }
}
