//! `envoy.config.cluster.v3` subset.
//!
//! Clusters are subscribed only to warm the stream after a reconnect, so a
//! name is all the client reads.

/// `envoy.config.cluster.v3.Cluster`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cluster {
    #[prost(string, tag = "1")]
    pub name: String,
}
