//! `envoy.extensions.filters.http.jwt_authn.v3` subset.

use std::collections::HashMap;

/// `envoy.extensions.filters.http.jwt_authn.v3.JwtAuthentication`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JwtAuthentication {
    #[prost(map = "string, message", tag = "1")]
    pub providers: HashMap<String, JwtProvider>,
}

/// `envoy.extensions.filters.http.jwt_authn.v3.JwtProvider`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JwtProvider {
    #[prost(string, tag = "1")]
    pub issuer: String,
    #[prost(string, repeated, tag = "2")]
    pub audiences: Vec<String>,
    #[prost(message, optional, tag = "4")]
    pub local_jwks: Option<DataSource>,
    #[prost(bool, tag = "5")]
    pub forward: bool,
    #[prost(message, repeated, tag = "6")]
    pub from_headers: Vec<JwtHeader>,
    #[prost(string, repeated, tag = "7")]
    pub from_params: Vec<String>,
    #[prost(string, tag = "8")]
    pub forward_payload_header: String,
}

/// `envoy.extensions.filters.http.jwt_authn.v3.JwtHeader`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JwtHeader {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value_prefix: String,
}

/// `envoy.config.core.v3.DataSource`, inline-string form only.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataSource {
    #[prost(oneof = "data_source::Specifier", tags = "3")]
    pub specifier: Option<data_source::Specifier>,
}

pub mod data_source {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Specifier {
        #[prost(string, tag = "3")]
        InlineString(String),
    }
}
