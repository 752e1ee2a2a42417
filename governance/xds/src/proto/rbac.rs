//! `envoy.config.rbac.v3` and the RBAC HTTP filter wrapper.

use super::matcher::{MetadataMatcher, PathMatcher, StringMatcher};
use super::CidrRange;
use std::collections::HashMap;

/// `envoy.extensions.filters.http.rbac.v3.RBAC` (the filter config).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RbacFilter {
    #[prost(message, optional, tag = "1")]
    pub rules: Option<Rbac>,
}

/// `envoy.config.rbac.v3.RBAC`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rbac {
    #[prost(enumeration = "rbac::Action", tag = "1")]
    pub action: i32,
    #[prost(map = "string, message", tag = "2")]
    pub policies: HashMap<String, Policy>,
}

pub mod rbac {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Action {
        Allow = 0,
        Deny = 1,
        Log = 2,
    }
}

/// `envoy.config.rbac.v3.Policy`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Policy {
    #[prost(message, repeated, tag = "1")]
    pub permissions: Vec<Permission>,
    #[prost(message, repeated, tag = "2")]
    pub principals: Vec<Principal>,
}

/// `envoy.config.rbac.v3.Permission`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Permission {
    #[prost(
        oneof = "permission::Rule",
        tags = "1, 2, 3, 4, 5, 6, 8, 10"
    )]
    pub rule: Option<permission::Rule>,
}

pub mod permission {
    /// `envoy.config.rbac.v3.Permission.Set`.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Set {
        #[prost(message, repeated, tag = "1")]
        pub rules: Vec<super::Permission>,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Rule {
        #[prost(message, tag = "1")]
        AndRules(Set),
        #[prost(message, tag = "2")]
        OrRules(Set),
        #[prost(bool, tag = "3")]
        Any(bool),
        #[prost(message, tag = "4")]
        Header(super::super::route::HeaderMatcher),
        #[prost(message, tag = "5")]
        DestinationIp(super::CidrRange),
        #[prost(uint32, tag = "6")]
        DestinationPort(u32),
        #[prost(message, tag = "8")]
        NotRule(Box<super::Permission>),
        #[prost(message, tag = "10")]
        UrlPath(super::PathMatcher),
    }
}

/// `envoy.config.rbac.v3.Principal`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Principal {
    #[prost(
        oneof = "principal::Identifier",
        tags = "1, 2, 3, 4, 6, 7, 8, 9, 10, 11"
    )]
    pub identifier: Option<principal::Identifier>,
}

pub mod principal {
    /// `envoy.config.rbac.v3.Principal.Set`.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Set {
        #[prost(message, repeated, tag = "1")]
        pub ids: Vec<super::Principal>,
    }

    /// `envoy.config.rbac.v3.Principal.Authenticated`.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Authenticated {
        #[prost(message, optional, tag = "2")]
        pub principal_name: Option<super::StringMatcher>,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Identifier {
        #[prost(message, tag = "1")]
        AndIds(Set),
        #[prost(message, tag = "2")]
        OrIds(Set),
        #[prost(bool, tag = "3")]
        Any(bool),
        #[prost(message, tag = "4")]
        Authenticated(Authenticated),
        #[prost(message, tag = "6")]
        Header(super::super::route::HeaderMatcher),
        #[prost(message, tag = "7")]
        Metadata(super::MetadataMatcher),
        #[prost(message, tag = "8")]
        NotId(Box<super::Principal>),
        #[prost(message, tag = "9")]
        UrlPath(super::PathMatcher),
        #[prost(message, tag = "10")]
        DirectRemoteIp(super::CidrRange),
        #[prost(message, tag = "11")]
        RemoteIp(super::CidrRange),
    }
}
