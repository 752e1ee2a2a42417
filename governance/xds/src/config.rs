use crate::{proto, XdsError};
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration for the aggregated discovery stream.
#[derive(Clone, Debug)]
pub struct XdsConfig {
    /// Management server address, e.g. `http://istiod.istio-system:15010`.
    /// Discovery is disabled when unset.
    pub address: Option<String>,

    /// Node identity reported to the management server.
    pub node_id: String,
    pub node_cluster: String,

    /// Path to a bearer token attached to the stream, read at connect time
    /// so rotated tokens are picked up on reconnect.
    pub token_path: Option<PathBuf>,

    /// Deadline for one-shot resource fetches.
    pub request_timeout: Duration,

    /// Reconnect backoff bounds.
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
}

impl Default for XdsConfig {
    fn default() -> Self {
        Self {
            address: None,
            node_id: "governance".to_string(),
            node_cluster: "Kubernetes".to_string(),
            token_path: None,
            request_timeout: Duration::from_secs(30),
            backoff_initial: Duration::from_secs(3),
            backoff_max: Duration::from_secs(60),
        }
    }
}

// === impl XdsConfig ===

impl XdsConfig {
    /// The endpoint to dial, with a scheme defaulted for bare `host:port`
    /// addresses.
    pub(crate) fn target(&self) -> Result<String, XdsError> {
        let address = self.address.as_deref().ok_or(XdsError::NotConfigured)?;
        if address.contains("://") {
            Ok(address.to_string())
        } else {
            Ok(format!("http://{address}"))
        }
    }

    pub(crate) fn bearer_token(&self) -> Result<Option<String>, XdsError> {
        let Some(path) = &self.token_path else {
            return Ok(None);
        };
        let token = std::fs::read_to_string(path).map_err(|source| XdsError::Token {
            path: path.clone(),
            source,
        })?;
        Ok(Some(token.trim().to_string()))
    }

    pub(crate) fn node(&self) -> proto::Node {
        proto::Node {
            id: self.node_id.clone(),
            cluster: self.node_cluster.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_requires_address() {
        assert!(matches!(
            XdsConfig::default().target(),
            Err(XdsError::NotConfigured)
        ));
    }

    #[test]
    fn target_defaults_scheme() {
        let config = XdsConfig {
            address: Some("istiod.istio-system:15010".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.target().unwrap(),
            "http://istiod.istio-system:15010"
        );

        let config = XdsConfig {
            address: Some("https://istiod:15012".to_string()),
            ..Default::default()
        };
        assert_eq!(config.target().unwrap(), "https://istiod:15012");
    }
}
