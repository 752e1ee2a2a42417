//! `envoy.config.route.v3` subset.

use super::matcher::{RegexMatcher, StringMatcher};

/// `envoy.config.route.v3.RouteConfiguration`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteConfiguration {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub virtual_hosts: Vec<VirtualHost>,
}

/// `envoy.config.route.v3.VirtualHost`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VirtualHost {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, repeated, tag = "2")]
    pub domains: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub routes: Vec<Route>,
}

/// `envoy.config.route.v3.Route`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Route {
    #[prost(message, optional, tag = "1")]
    pub r#match: Option<RouteMatch>,
    #[prost(string, tag = "14")]
    pub name: String,
    #[prost(oneof = "route::Action", tags = "2")]
    pub action: Option<route::Action>,
}

pub mod route {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Action {
        #[prost(message, tag = "2")]
        Route(super::RouteAction),
    }
}

/// `envoy.config.route.v3.RouteMatch`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteMatch {
    #[prost(message, repeated, tag = "6")]
    pub headers: Vec<HeaderMatcher>,
    #[prost(message, repeated, tag = "7")]
    pub query_parameters: Vec<QueryParameterMatcher>,
    #[prost(oneof = "route_match::PathSpecifier", tags = "1, 2, 10")]
    pub path_specifier: Option<route_match::PathSpecifier>,
}

pub mod route_match {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PathSpecifier {
        #[prost(string, tag = "1")]
        Prefix(String),
        #[prost(string, tag = "2")]
        Path(String),
        #[prost(message, tag = "10")]
        SafeRegex(super::RegexMatcher),
    }
}

/// `envoy.config.route.v3.HeaderMatcher`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeaderMatcher {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, tag = "8")]
    pub invert_match: bool,
    #[prost(
        oneof = "header_matcher::HeaderMatchSpecifier",
        tags = "4, 7, 9, 10, 11, 12, 13"
    )]
    pub header_match_specifier: Option<header_matcher::HeaderMatchSpecifier>,
}

pub mod header_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum HeaderMatchSpecifier {
        #[prost(string, tag = "4")]
        ExactMatch(String),
        #[prost(bool, tag = "7")]
        PresentMatch(bool),
        #[prost(string, tag = "9")]
        PrefixMatch(String),
        #[prost(string, tag = "10")]
        SuffixMatch(String),
        #[prost(message, tag = "11")]
        SafeRegexMatch(super::RegexMatcher),
        #[prost(string, tag = "12")]
        ContainsMatch(String),
        #[prost(message, tag = "13")]
        StringMatch(super::StringMatcher),
    }
}

/// `envoy.config.route.v3.QueryParameterMatcher`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryParameterMatcher {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(
        oneof = "query_parameter_matcher::QueryParameterMatchSpecifier",
        tags = "5, 6"
    )]
    pub query_parameter_match_specifier:
        Option<query_parameter_matcher::QueryParameterMatchSpecifier>,
}

pub mod query_parameter_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum QueryParameterMatchSpecifier {
        #[prost(message, tag = "5")]
        StringMatch(super::StringMatcher),
        #[prost(bool, tag = "6")]
        PresentMatch(bool),
    }
}

/// `envoy.config.route.v3.RouteAction`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteAction {
    #[prost(oneof = "route_action::ClusterSpecifier", tags = "1, 2, 3")]
    pub cluster_specifier: Option<route_action::ClusterSpecifier>,
}

pub mod route_action {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterSpecifier {
        #[prost(string, tag = "1")]
        Cluster(String),
        #[prost(string, tag = "2")]
        ClusterHeader(String),
        #[prost(message, tag = "3")]
        WeightedClusters(super::WeightedCluster),
    }
}

/// `envoy.config.route.v3.WeightedCluster`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WeightedCluster {
    #[prost(message, repeated, tag = "1")]
    pub clusters: Vec<weighted_cluster::ClusterWeight>,
}

pub mod weighted_cluster {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ClusterWeight {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(message, optional, tag = "2")]
        pub weight: Option<u32>,
    }
}
