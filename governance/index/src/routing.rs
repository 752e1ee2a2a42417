//! Extraction of label-routing rules from route configurations.
//!
//! istiod names virtual hosts `<service>.<namespace>.svc.cluster.local:<port>`
//! and clusters `<direction>|<port>|<subset>|<service host>`; the subset is
//! the service version a clause routes to. The last route in a virtual host
//! is the catch-all, so its version becomes the default.

use crate::convert;
use governance_core::route::{LabelRouteRule, MatchService, RouteRule, UnifiedRouteData};
use governance_core::StringMatch;
use governance_xds::proto::route::{
    route::Action, route_action::ClusterSpecifier, route_match::PathSpecifier, RouteConfiguration,
    RouteMatch, VirtualHost,
};
use tracing::debug;

/// istiod's catch-all virtual host for unmatched outbound traffic.
const ALLOW_ANY: &str = "allow_any";

pub fn extract(route_configs: &[RouteConfiguration]) -> Vec<UnifiedRouteData> {
    route_configs
        .iter()
        .flat_map(|rc| &rc.virtual_hosts)
        .filter(|vh| vh.name != ALLOW_ANY)
        .filter_map(virtual_host_rule)
        .collect()
}

fn virtual_host_rule(vh: &VirtualHost) -> Option<UnifiedRouteData> {
    let host = vh.name.split(':').next().unwrap_or(&vh.name);
    let target_service = host.split('.').next().unwrap_or(host).to_string();

    let mut services = Vec::new();
    for route in &vh.routes {
        let Some(Action::Route(action)) = &route.action else {
            continue;
        };
        let rules = route.r#match.as_ref().map(match_rules).unwrap_or_default();
        match &action.cluster_specifier {
            Some(ClusterSpecifier::Cluster(name)) => {
                if let Some(version) = cluster_version(name) {
                    services.push(MatchService {
                        version,
                        weight: 100,
                        rules,
                    });
                }
            }
            Some(ClusterSpecifier::WeightedClusters(weighted)) => {
                for cluster in &weighted.clusters {
                    if let Some(version) = cluster_version(&cluster.name) {
                        services.push(MatchService {
                            version,
                            weight: cluster.weight.unwrap_or(0),
                            rules: rules.clone(),
                        });
                    }
                }
            }
            _ => debug!(route = %route.name, "route without a direct cluster"),
        }
    }

    // The catch-all route comes last; it supplies the default version.
    let default_version = services.last()?.version.clone();
    let matches = services.into_iter().filter(|s| !s.rules.is_empty()).collect();
    Some(UnifiedRouteData {
        target_service,
        rule: LabelRouteRule {
            matches,
            default_version,
        },
    })
}

/// The subset (version) segment of an istio cluster name.
fn cluster_version(cluster: &str) -> Option<String> {
    let version = cluster.split('|').nth(2)?;
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

fn match_rules(m: &RouteMatch) -> Vec<RouteRule> {
    let mut rules = Vec::new();
    match &m.path_specifier {
        // A bare "/" prefix is the catch-all and carries no intent.
        Some(PathSpecifier::Prefix(p)) if p.is_empty() || p == "/" => {}
        Some(PathSpecifier::Prefix(p)) => {
            rules.push(RouteRule::Path(StringMatch::Prefix(p.clone())));
        }
        Some(PathSpecifier::Path(p)) => rules.push(RouteRule::Path(StringMatch::exact(p.clone()))),
        Some(PathSpecifier::SafeRegex(re)) => {
            if let Some(re) = convert::regex(&re.regex) {
                rules.push(RouteRule::Path(StringMatch::Regex(re)));
            }
        }
        None => {}
    }
    for header in &m.headers {
        if let Some(value) = convert::header_match(header) {
            rules.push(RouteRule::Header {
                name: header.name.clone(),
                value,
            });
        }
    }
    for param in &m.query_parameters {
        if let Some(value) = convert::query_match(param) {
            rules.push(RouteRule::Parameter {
                name: param.name.clone(),
                value,
            });
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use governance_core::route::RouteContext;
    use governance_xds::proto::route::{
        header_matcher::HeaderMatchSpecifier, weighted_cluster::ClusterWeight, HeaderMatcher,
        Route, RouteAction, WeightedCluster,
    };

    fn route_to(cluster: &str, rules: Option<RouteMatch>) -> Route {
        Route {
            r#match: rules,
            name: String::new(),
            action: Some(Action::Route(RouteAction {
                cluster_specifier: Some(ClusterSpecifier::Cluster(cluster.to_string())),
            })),
        }
    }

    fn header_route_match(name: &str, value: &str) -> RouteMatch {
        RouteMatch {
            headers: vec![HeaderMatcher {
                name: name.to_string(),
                invert_match: false,
                header_match_specifier: Some(HeaderMatchSpecifier::ExactMatch(value.to_string())),
            }],
            query_parameters: vec![],
            path_specifier: Some(PathSpecifier::Prefix("/".to_string())),
        }
    }

    fn echo_config() -> RouteConfiguration {
        RouteConfiguration {
            name: "8080".to_string(),
            virtual_hosts: vec![
                VirtualHost {
                    name: "allow_any".to_string(),
                    domains: vec!["*".to_string()],
                    routes: vec![route_to("PassthroughCluster", None)],
                },
                VirtualHost {
                    name: "echo.default.svc.cluster.local:8080".to_string(),
                    domains: vec!["echo".to_string()],
                    routes: vec![
                        route_to(
                            "outbound|8080|v2|echo.default.svc.cluster.local",
                            Some(header_route_match("x-env", "gray")),
                        ),
                        route_to(
                            "outbound|8080|v1|echo.default.svc.cluster.local",
                            Some(RouteMatch {
                                headers: vec![],
                                query_parameters: vec![],
                                path_specifier: Some(PathSpecifier::Prefix("/".to_string())),
                            }),
                        ),
                    ],
                },
            ],
        }
    }

    #[test]
    fn extracts_versions_and_skips_allow_any() {
        let data = extract(&[echo_config()]);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].target_service, "echo");
        assert_eq!(data[0].rule.default_version, "v1");
        assert_eq!(data[0].rule.matches.len(), 1);
        assert_eq!(data[0].rule.matches[0].version, "v2");

        let mut ctx = RouteContext::default();
        ctx.headers
            .insert("x-env".to_string(), vec!["gray".to_string()]);
        assert_eq!(data[0].rule.select(&ctx), "v2");
        assert_eq!(data[0].rule.select(&RouteContext::default()), "v1");
    }

    #[test]
    fn weighted_clusters_fan_out() {
        let rc = RouteConfiguration {
            name: "8080".to_string(),
            virtual_hosts: vec![VirtualHost {
                name: "echo.default.svc.cluster.local:8080".to_string(),
                domains: vec![],
                routes: vec![Route {
                    r#match: Some(header_route_match("x-env", "gray")),
                    name: String::new(),
                    action: Some(Action::Route(RouteAction {
                        cluster_specifier: Some(ClusterSpecifier::WeightedClusters(
                            WeightedCluster {
                                clusters: vec![
                                    ClusterWeight {
                                        name: "outbound|8080|v1|echo.default.svc.cluster.local"
                                            .to_string(),
                                        weight: Some(80),
                                    },
                                    ClusterWeight {
                                        name: "outbound|8080|v2|echo.default.svc.cluster.local"
                                            .to_string(),
                                        weight: Some(20),
                                    },
                                ],
                            },
                        )),
                    })),
                }],
            }],
        };
        let data = extract(&[rc]);
        assert_eq!(data[0].rule.matches.len(), 2);
        assert_eq!(data[0].rule.matches[0].weight, 80);
        assert_eq!(data[0].rule.matches[1].weight, 20);
    }

    #[test]
    fn cluster_names_without_a_subset_are_skipped() {
        assert_eq!(cluster_version("outbound|8080|v1|echo"), Some("v1".into()));
        assert_eq!(cluster_version("outbound|8080||echo"), None);
        assert_eq!(cluster_version("PassthroughCluster"), None);
    }
}
