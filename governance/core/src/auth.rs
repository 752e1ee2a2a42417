//! Authorization rules extracted from RBAC filters, and the request-time
//! context they are evaluated against.

use crate::{AndRule, Matches, NetworkMatch, StringMatch};
use ahash::AHashMap as HashMap;
use std::net::IpAddr;

/// A single RBAC predicate, the leaf of an authorization rule tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthCondition {
    /// The directly-connected peer address.
    SourceIp(NetworkMatch),
    /// The original client address, as derived from forwarding headers.
    RemoteIp(NetworkMatch),
    DestIp(NetworkMatch),
    DestPort(u16),
    Host(StringMatch),
    Method(StringMatch),
    Path(StringMatch),
    /// The peer's mTLS identity (certificate SAN).
    Identity(StringMatch),
    /// The authenticated JWT principal, `issuer/subject`.
    RequestPrincipal(StringMatch),
    AuthAudience(StringMatch),
    AuthPresenter(StringMatch),
    AuthClaim {
        key: String,
        value: StringMatch,
    },
    Header {
        name: String,
        value: StringMatch,
    },
}

/// Attributes of an inbound request, supplied by the serving layer.
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    pub source_ip: Option<IpAddr>,
    pub remote_ip: Option<IpAddr>,
    pub dest_ip: Option<IpAddr>,
    pub dest_port: u16,
    pub host: String,
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, Vec<String>>,
    pub identity: Option<String>,
    pub jwt: Option<JwtClaims>,
}

/// Claims of a validated JWT attached to the request.
#[derive(Clone, Debug, Default)]
pub struct JwtClaims {
    /// `issuer/subject`.
    pub principal: Option<String>,
    pub audiences: Vec<String>,
    pub presenter: Option<String>,
    pub claims: HashMap<String, Vec<String>>,
}

/// One named RBAC policy: alternatives of principal rules and permission
/// rules, each an AND-of-OR tree.
///
/// The policy matches when any principal alternative and any permission
/// alternative match; an empty alternative list imposes no constraint.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthPolicy {
    pub principals: Vec<AndRule<AuthCondition>>,
    pub permissions: Vec<AndRule<AuthCondition>>,
}

/// JWT validation requirements for one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtRule {
    pub name: String,
    /// Header name and value prefix (e.g. `Authorization`/`Bearer `) pairs
    /// the token may be read from.
    pub from_headers: Vec<(String, String)>,
    pub issuer: String,
    pub audiences: Vec<String>,
    /// Inline JWKS document used to validate signatures.
    pub jwks: String,
    pub from_params: Vec<String>,
    pub forward_payload_header: String,
    pub forward: bool,
}

// === impl AuthCondition ===

impl Matches<AuthContext> for AuthCondition {
    fn matches(&self, ctx: &AuthContext) -> bool {
        match self {
            Self::SourceIp(net) => ctx.source_ip.is_some_and(|ip| net.matches(ip)),
            Self::RemoteIp(net) => ctx.remote_ip.is_some_and(|ip| net.matches(ip)),
            Self::DestIp(net) => ctx.dest_ip.is_some_and(|ip| net.matches(ip)),
            Self::DestPort(port) => ctx.dest_port == *port,
            Self::Host(m) => m.matches(&ctx.host),
            Self::Method(m) => m.matches(&ctx.method),
            Self::Path(m) => m.matches(&ctx.path),
            Self::Identity(m) => ctx.identity.as_deref().is_some_and(|id| m.matches(id)),
            Self::RequestPrincipal(m) => ctx
                .jwt
                .as_ref()
                .and_then(|jwt| jwt.principal.as_deref())
                .is_some_and(|p| m.matches(p)),
            Self::AuthAudience(m) => ctx
                .jwt
                .as_ref()
                .is_some_and(|jwt| jwt.audiences.iter().any(|aud| m.matches(aud))),
            Self::AuthPresenter(m) => ctx
                .jwt
                .as_ref()
                .and_then(|jwt| jwt.presenter.as_deref())
                .is_some_and(|p| m.matches(p)),
            Self::AuthClaim { key, value } => ctx.jwt.as_ref().is_some_and(|jwt| {
                jwt.claims
                    .get(key)
                    .is_some_and(|vs| vs.iter().any(|v| value.matches(v)))
            }),
            Self::Header { name, value } => ctx
                .headers
                .get(name)
                .is_some_and(|vs| vs.iter().any(|v| value.matches(v))),
        }
    }
}

// === impl AuthPolicy ===

impl AuthPolicy {
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty() && self.permissions.is_empty()
    }

    pub fn evaluate(&self, ctx: &AuthContext) -> bool {
        any_of(&self.principals, ctx) && any_of(&self.permissions, ctx)
    }
}

fn any_of(alternatives: &[AndRule<AuthCondition>], ctx: &AuthContext) -> bool {
    alternatives.is_empty() || alternatives.iter().any(|rule| rule.evaluate(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrRule;
    use std::str::FromStr;

    fn ctx() -> AuthContext {
        AuthContext {
            source_ip: Some(IpAddr::from_str("10.0.0.7").unwrap()),
            dest_port: 8080,
            host: "echo.default.svc".to_string(),
            method: "GET".to_string(),
            path: "/api/echo".to_string(),
            headers: [("x-env".to_string(), vec!["canary".to_string()])]
                .into_iter()
                .collect(),
            identity: Some("spiffe://cluster.local/ns/default/sa/echo".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn conditions_against_context() {
        let ctx = ctx();
        assert!(AuthCondition::DestPort(8080).matches(&ctx));
        assert!(!AuthCondition::DestPort(9090).matches(&ctx));
        assert!(AuthCondition::Path(StringMatch::Prefix("/api".to_string())).matches(&ctx));
        assert!(AuthCondition::Header {
            name: "x-env".to_string(),
            value: StringMatch::exact("canary"),
        }
        .matches(&ctx));
        assert!(
            AuthCondition::Identity(StringMatch::Suffix("/sa/echo".to_string())).matches(&ctx)
        );
        // No JWT on the request: every JWT condition is unmet.
        assert!(!AuthCondition::RequestPrincipal(StringMatch::exact("iss/sub")).matches(&ctx));
    }

    #[test]
    fn empty_policy_permits() {
        assert!(AuthPolicy::default().evaluate(&ctx()));
    }

    #[test]
    fn policy_requires_principals_and_permissions() {
        let principal = AndRule::new(vec![OrRule::new(vec![AuthCondition::Identity(
            StringMatch::Suffix("/sa/echo".to_string()),
        )])]);
        let permission = AndRule::new(vec![OrRule::new(vec![AuthCondition::Method(
            StringMatch::exact("DELETE"),
        )])]);

        let policy = AuthPolicy {
            principals: vec![principal.clone()],
            permissions: vec![],
        };
        assert!(policy.evaluate(&ctx()));

        let policy = AuthPolicy {
            principals: vec![principal],
            permissions: vec![permission],
        };
        assert!(!policy.evaluate(&ctx()));
    }
}
