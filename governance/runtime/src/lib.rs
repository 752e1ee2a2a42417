//! Process bootstrap: argument parsing, logging, and task wiring.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use governance_index::Exchanger;
use governance_xds::{AdsChannel, XdsConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "governance", about = "xDS-driven service governance client", version)]
pub struct Args {
    /// Management server address, e.g. `istiod.istio-system:15010`.
    /// Discovery is disabled when unset.
    #[arg(long, env = "GOVERNANCE_ADS_ADDRESS")]
    ads_address: Option<String>,

    /// Node id reported on the discovery stream.
    #[arg(long, env = "GOVERNANCE_NODE_ID", default_value = "governance")]
    node_id: String,

    #[arg(long, env = "GOVERNANCE_NODE_CLUSTER", default_value = "Kubernetes")]
    node_cluster: String,

    /// File holding a bearer token attached to the stream.
    #[arg(long, env = "GOVERNANCE_TOKEN_PATH")]
    token_path: Option<PathBuf>,

    /// Deadline, in seconds, for one-shot resource fetches.
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// Initial reconnect backoff, in seconds.
    #[arg(long, default_value_t = 3)]
    backoff_initial: u64,

    /// Maximum reconnect backoff, in seconds.
    #[arg(long, default_value_t = 60)]
    backoff_max: u64,

    #[arg(long, env = "GOVERNANCE_LOG", default_value = "governance=info,warn")]
    log_level: String,
}

// === impl Args ===

impl Args {
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    async fn run(self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_new(&self.log_level)?)
            .init();

        let request_timeout = Duration::from_secs(self.request_timeout);
        let config = XdsConfig {
            address: self.ads_address,
            node_id: self.node_id,
            node_cluster: self.node_cluster,
            token_path: self.token_path,
            request_timeout,
            backoff_initial: Duration::from_secs(self.backoff_initial),
            backoff_max: Duration::from_secs(self.backoff_max),
        };

        let channel = AdsChannel::new(config);
        let exchanger = Exchanger::new(&channel, request_timeout);

        let (drain_tx, drain_rx) = drain::channel();
        let stream = tokio::spawn(channel.run(drain_rx.clone()));
        let pump = tokio::spawn(exchanger.run(drain_rx));

        tokio::signal::ctrl_c().await?;
        info!("shutdown signal received");
        drain_tx.drain().await;
        stream.await?;
        pump.await?;
        Ok(())
    }
}
