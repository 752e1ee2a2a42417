//! The request-time authorization decision.

use crate::store::AuthStore;
use governance_core::auth::AuthContext;
use std::sync::Arc;

/// Decides whether a request is authorized against the current snapshot.
///
/// Deny policies veto first; with no allow policies everything else is
/// permitted; otherwise some allow policy must match.
#[derive(Clone)]
pub struct AuthValidator {
    store: Arc<AuthStore>,
}

// === impl AuthValidator ===

impl AuthValidator {
    pub fn new(store: Arc<AuthStore>) -> Self {
        Self { store }
    }

    pub fn validate(&self, ctx: &AuthContext) -> bool {
        let rules = self.store.snapshot();
        if rules.deny.values().any(|policy| policy.evaluate(ctx)) {
            return false;
        }
        rules.allow.is_empty() || rules.allow.values().any(|policy| policy.evaluate(ctx))
    }
}
