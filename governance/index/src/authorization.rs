//! Extraction of authorization and JWT rules from the inbound listener.
//!
//! istiod renders authorization policies as RBAC HTTP filters on the
//! `virtualInbound` listener. Each Envoy policy is a disjunction of
//! principal alternatives and permission alternatives; each alternative is
//! an AND of OR-groups, which maps directly onto the core rule tree.
//!
//! Conversion is conservative: an alternative containing a matcher the
//! evaluators cannot express is dropped whole, never weakened.

use crate::convert;
use ahash::AHashMap as HashMap;
use governance_core::auth::{AuthCondition, AuthPolicy, JwtRule};
use governance_core::{AndRule, OrRule};
use governance_xds::proto::{
    self, jwt,
    listener::{self, http_connection_manager::RouteSpecifier, HttpConnectionManager, Listener},
    matcher, rbac, route,
};
use tracing::{debug, warn};

/// The listener istiod renders the sidecar's inbound filter chain on.
const VIRTUAL_INBOUND: &str = "virtualInbound";

/// The metadata filter istiod records JWT authentication results under.
const ISTIO_AUTHN: &str = "istio_authn";

/// Authorization state extracted from one listener snapshot.
#[derive(Clone, Debug, Default)]
pub struct AuthRules {
    pub allow: HashMap<String, AuthPolicy>,
    pub deny: HashMap<String, AuthPolicy>,
    pub jwt: HashMap<String, JwtRule>,
}

/// An OR-group contributed by one policy member, or nothing at all when
/// the member was `any`.
enum Group {
    Rule(OrRule<AuthCondition>),
    Unconstrained,
}

/// Extracts allow/deny policies and JWT requirements from the inbound
/// listener's HTTP filters.
pub fn extract(listeners: &[Listener]) -> AuthRules {
    let mut rules = AuthRules::default();
    for manager in inbound_managers(listeners) {
        for filter in &manager.http_filters {
            let Some(listener::http_filter::ConfigType::TypedConfig(any)) = &filter.config_type
            else {
                continue;
            };
            if let Some(filter) = proto::unpack::<rbac::RbacFilter>(any, proto::RBAC_TYPE_URL) {
                apply_rbac(&mut rules, &filter);
            } else if let Some(authn) =
                proto::unpack::<jwt::JwtAuthentication>(any, proto::JWT_AUTHN_TYPE_URL)
            {
                apply_jwt(&mut rules, &authn);
            }
        }
    }
    rules
}

/// The RDS route configurations referenced by any listener, sorted and
/// deduplicated.
pub fn route_names(listeners: &[Listener]) -> Vec<String> {
    let mut names = listeners
        .iter()
        .flat_map(|l| &l.filter_chains)
        .flat_map(|chain| &chain.filters)
        .filter_map(|filter| {
            let listener::filter::ConfigType::TypedConfig(any) = filter.config_type.as_ref()?;
            let manager: HttpConnectionManager =
                proto::unpack(any, proto::HTTP_CONNECTION_MANAGER_TYPE_URL)?;
            match manager.route_specifier {
                Some(RouteSpecifier::Rds(rds)) => Some(rds.route_config_name),
                _ => None,
            }
        })
        .collect::<Vec<_>>();
    names.sort();
    names.dedup();
    names
}

fn inbound_managers(listeners: &[Listener]) -> impl Iterator<Item = HttpConnectionManager> + '_ {
    listeners
        .iter()
        .filter(|l| l.name == VIRTUAL_INBOUND)
        .flat_map(|l| &l.filter_chains)
        .flat_map(|chain| &chain.filters)
        .filter_map(|filter| {
            let listener::filter::ConfigType::TypedConfig(any) = filter.config_type.as_ref()?;
            proto::unpack(any, proto::HTTP_CONNECTION_MANAGER_TYPE_URL)
        })
}

fn apply_rbac(rules: &mut AuthRules, filter: &rbac::RbacFilter) {
    let Some(rbac) = &filter.rules else { return };
    let target = match rbac.action() {
        rbac::rbac::Action::Allow => &mut rules.allow,
        rbac::rbac::Action::Deny => &mut rules.deny,
        rbac::rbac::Action::Log => {
            debug!("ignoring RBAC filter with log action");
            return;
        }
    };
    for (name, policy) in &rbac.policies {
        let policy = AuthPolicy {
            principals: policy
                .principals
                .iter()
                .filter_map(principal_conjunction)
                .collect(),
            permissions: policy
                .permissions
                .iter()
                .filter_map(permission_conjunction)
                .collect(),
        };
        target.insert(name.clone(), policy);
    }
}

fn apply_jwt(rules: &mut AuthRules, authn: &jwt::JwtAuthentication) {
    for (name, provider) in &authn.providers {
        let jwks = match &provider.local_jwks {
            Some(jwt::DataSource {
                specifier: Some(jwt::data_source::Specifier::InlineString(s)),
            }) => s.clone(),
            _ => String::new(),
        };
        rules.jwt.insert(
            name.clone(),
            JwtRule {
                name: name.clone(),
                from_headers: provider
                    .from_headers
                    .iter()
                    .map(|h| (h.name.clone(), h.value_prefix.clone()))
                    .collect(),
                issuer: provider.issuer.clone(),
                audiences: provider.audiences.clone(),
                jwks,
                from_params: provider.from_params.clone(),
                forward_payload_header: provider.forward_payload_header.clone(),
                forward: provider.forward,
            },
        );
    }
}

// === Principal conversion ===

fn principal_conjunction(principal: &rbac::Principal) -> Option<AndRule<AuthCondition>> {
    use rbac::principal::Identifier;
    let groups = match &principal.identifier {
        Some(Identifier::AndIds(set)) => set
            .ids
            .iter()
            .map(principal_group)
            .collect::<Option<Vec<_>>>()?,
        _ => vec![principal_group(principal)?],
    };
    Some(conjunction(groups))
}

fn principal_group(principal: &rbac::Principal) -> Option<Group> {
    use rbac::principal::Identifier;
    let group = match principal.identifier.as_ref()? {
        Identifier::Any(true) => Group::Unconstrained,
        Identifier::Any(false) => Group::Rule(OrRule::new(vec![])),
        Identifier::OrIds(set) => {
            let mut leaves = Vec::with_capacity(set.ids.len());
            for id in &set.ids {
                if matches!(id.identifier, Some(Identifier::Any(true))) {
                    // `any` swallows the rest of the group.
                    return Some(Group::Unconstrained);
                }
                leaves.push(principal_leaf(id)?);
            }
            Group::Rule(OrRule::new(leaves))
        }
        Identifier::NotId(inner) => negate(principal_group(inner)?),
        _ => Group::Rule(OrRule::new(vec![principal_leaf(principal)?])),
    };
    Some(group)
}

fn principal_leaf(principal: &rbac::Principal) -> Option<AuthCondition> {
    use rbac::principal::Identifier;
    let leaf = match principal.identifier.as_ref()? {
        Identifier::Authenticated(a) => {
            AuthCondition::Identity(convert::string_match(a.principal_name.as_ref()?)?)
        }
        Identifier::Header(header) => header_condition(header)?,
        Identifier::UrlPath(path) => AuthCondition::Path(convert::path_match(path)?),
        Identifier::DirectRemoteIp(cidr) => AuthCondition::SourceIp(convert::network(cidr)?),
        Identifier::RemoteIp(cidr) => AuthCondition::RemoteIp(convert::network(cidr)?),
        Identifier::Metadata(metadata) => metadata_condition(metadata)?,
        _ => {
            warn!("unsupported principal matcher");
            return None;
        }
    };
    Some(leaf)
}

// === Permission conversion ===

fn permission_conjunction(permission: &rbac::Permission) -> Option<AndRule<AuthCondition>> {
    use rbac::permission::Rule;
    let groups = match &permission.rule {
        Some(Rule::AndRules(set)) => set
            .rules
            .iter()
            .map(permission_group)
            .collect::<Option<Vec<_>>>()?,
        _ => vec![permission_group(permission)?],
    };
    Some(conjunction(groups))
}

fn permission_group(permission: &rbac::Permission) -> Option<Group> {
    use rbac::permission::Rule;
    let group = match permission.rule.as_ref()? {
        Rule::Any(true) => Group::Unconstrained,
        Rule::Any(false) => Group::Rule(OrRule::new(vec![])),
        Rule::OrRules(set) => {
            let mut leaves = Vec::with_capacity(set.rules.len());
            for rule in &set.rules {
                if matches!(rule.rule, Some(Rule::Any(true))) {
                    return Some(Group::Unconstrained);
                }
                leaves.push(permission_leaf(rule)?);
            }
            Group::Rule(OrRule::new(leaves))
        }
        Rule::NotRule(inner) => negate(permission_group(inner)?),
        _ => Group::Rule(OrRule::new(vec![permission_leaf(permission)?])),
    };
    Some(group)
}

fn permission_leaf(permission: &rbac::Permission) -> Option<AuthCondition> {
    use rbac::permission::Rule;
    let leaf = match permission.rule.as_ref()? {
        Rule::Header(header) => header_condition(header)?,
        Rule::DestinationIp(cidr) => AuthCondition::DestIp(convert::network(cidr)?),
        Rule::DestinationPort(port) => {
            let port = u16::try_from(*port).ok().filter(|p| *p != 0)?;
            AuthCondition::DestPort(port)
        }
        Rule::UrlPath(path) => AuthCondition::Path(convert::path_match(path)?),
        _ => {
            warn!("unsupported permission matcher");
            return None;
        }
    };
    Some(leaf)
}

// === Shared pieces ===

fn conjunction(groups: Vec<Group>) -> AndRule<AuthCondition> {
    groups
        .into_iter()
        .filter_map(|group| match group {
            Group::Rule(or) => Some(or),
            Group::Unconstrained => None,
        })
        .collect()
}

fn negate(group: Group) -> Group {
    match group {
        Group::Rule(or) => Group::Rule(OrRule {
            negated: !or.negated,
            ..or
        }),
        // not(any) can never match.
        Group::Unconstrained => Group::Rule(OrRule::new(vec![])),
    }
}

fn header_condition(header: &route::HeaderMatcher) -> Option<AuthCondition> {
    let value = convert::header_match(header)?;
    let condition = match header.name.as_str() {
        ":authority" => AuthCondition::Host(value),
        ":method" => AuthCondition::Method(value),
        ":path" => AuthCondition::Path(value),
        name => AuthCondition::Header {
            name: name.to_string(),
            value,
        },
    };
    Some(condition)
}

fn metadata_condition(metadata: &matcher::MetadataMatcher) -> Option<AuthCondition> {
    if metadata.filter != ISTIO_AUTHN {
        warn!(filter = %metadata.filter, "unsupported metadata filter");
        return None;
    }
    let value = convert::value_match(metadata.value.as_ref()?)?;
    let mut keys = metadata.path.iter().filter_map(|segment| {
        match segment.segment.as_ref()? {
            matcher::metadata_matcher::path_segment::Segment::Key(key) => Some(key.as_str()),
        }
    });
    let condition = match keys.next()? {
        "request.auth.principal" => AuthCondition::RequestPrincipal(value),
        "request.auth.audiences" => AuthCondition::AuthAudience(value),
        "request.auth.presenter" => AuthCondition::AuthPresenter(value),
        "request.auth.claims" => AuthCondition::AuthClaim {
            key: keys.next()?.to_string(),
            value,
        },
        key => {
            warn!(key, "unsupported istio_authn metadata key");
            return None;
        }
    };
    Some(condition)
}
