//! Shared snapshots of the extracted governance state.
//!
//! Each store holds an `Arc` that is swapped whole on every update, so
//! request-path readers never observe a partially applied snapshot.

use crate::authorization::AuthRules;
use ahash::AHashMap as HashMap;
use governance_core::route::UnifiedRouteData;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct AuthStore {
    inner: RwLock<Arc<AuthRules>>,
}

#[derive(Debug, Default)]
pub struct RouteStore {
    inner: RwLock<Arc<HashMap<String, UnifiedRouteData>>>,
}

// === impl AuthStore ===

impl AuthStore {
    pub fn snapshot(&self) -> Arc<AuthRules> {
        self.inner.read().clone()
    }

    pub fn replace(&self, rules: AuthRules) {
        *self.inner.write() = Arc::new(rules);
    }
}

// === impl RouteStore ===

impl RouteStore {
    pub fn snapshot(&self) -> Arc<HashMap<String, UnifiedRouteData>> {
        self.inner.read().clone()
    }

    /// The routing rule for one target service, if any.
    pub fn get(&self, service: &str) -> Option<UnifiedRouteData> {
        self.inner.read().get(service).cloned()
    }

    pub fn replace(&self, data: Vec<UnifiedRouteData>) {
        let keyed = data
            .into_iter()
            .map(|d| (d.target_service.clone(), d))
            .collect();
        *self.inner.write() = Arc::new(keyed);
    }
}
