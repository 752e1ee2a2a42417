//! Core domain model for the governance client.
//!
//! This crate holds the types shared by the xDS layer and the request-time
//! evaluators: leaf matchers (strings, networks), the two-level
//! `AndRule`/`OrRule` boolean tree, the authorization conditions extracted
//! from RBAC filters, and the label-routing data extracted from route
//! configurations.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod auth;
mod network_match;
pub mod route;
mod rule;
mod string_match;

pub use self::{
    network_match::NetworkMatch,
    rule::{AndRule, Matches, OrRule},
    string_match::StringMatch,
};
pub use ipnet::{IpNet, Ipv4Net, Ipv6Net};
