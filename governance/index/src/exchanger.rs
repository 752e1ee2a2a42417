//! Wires the typed xDS protocols to the governance stores.
//!
//! Listener pushes drive authorization extraction and determine which
//! route configurations to watch; route pushes drive routing extraction.
//! A cluster watch is held open so the management server warms clusters
//! ahead of listeners after a reconnect.

use crate::store::{AuthStore, RouteStore};
use crate::{authorization, routing};
use governance_xds::proto::{cluster::Cluster, listener::Listener, route::RouteConfiguration};
use governance_xds::{AdsChannel, XdsProtocol};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct Exchanger {
    lds: XdsProtocol<Listener>,
    rds: XdsProtocol<RouteConfiguration>,
    cds: XdsProtocol<Cluster>,
    auth: Arc<AuthStore>,
    routes: Arc<RouteStore>,
}

// === impl Exchanger ===

impl Exchanger {
    pub fn new(channel: &AdsChannel, request_timeout: Duration) -> Self {
        Self {
            lds: XdsProtocol::new(channel.clone(), request_timeout),
            rds: XdsProtocol::new(channel.clone(), request_timeout),
            cds: XdsProtocol::new(channel.clone(), request_timeout),
            auth: Arc::new(AuthStore::default()),
            routes: Arc::new(RouteStore::default()),
        }
    }

    pub fn auth_store(&self) -> Arc<AuthStore> {
        self.auth.clone()
    }

    pub fn route_store(&self) -> Arc<RouteStore> {
        self.routes.clone()
    }

    /// Applies a listener snapshot, returning the route configurations it
    /// references.
    pub fn apply_listeners(&self, listeners: &[Listener]) -> Vec<String> {
        let rules = authorization::extract(listeners);
        info!(
            allow = rules.allow.len(),
            deny = rules.deny.len(),
            jwt = rules.jwt.len(),
            "applied listener snapshot",
        );
        self.auth.replace(rules);
        authorization::route_names(listeners)
    }

    pub fn apply_route_configs(&self, route_configs: &[RouteConfiguration]) {
        let data = routing::extract(route_configs);
        info!(services = data.len(), "applied route snapshot");
        self.routes.replace(data);
    }

    /// Consumes pushes until shutdown.
    pub async fn run(self, drain: drain::Watch) {
        let _cds = self.cds.observe(vec![]);
        let mut lds = self.lds.observe(vec![]);
        let mut route_names: Vec<String> = vec![];
        let mut rds = self.rds.observe(route_names.clone());

        let shutdown = drain.signaled();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("shutting down");
                    return;
                }
                snapshot = lds.recv() => {
                    let Some(listeners) = snapshot else { return };
                    let names = self.apply_listeners(&listeners);
                    if names != route_names {
                        debug!(?names, "watching route configurations");
                        route_names = names;
                        rds = self.rds.observe(route_names.clone());
                    }
                }
                snapshot = rds.recv() => {
                    let Some(route_configs) = snapshot else { return };
                    self.apply_route_configs(&route_configs);
                }
            }
        }
    }
}
