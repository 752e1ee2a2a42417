//! The shared aggregated-discovery stream.
//!
//! A single bidirectional gRPC stream carries requests and responses for
//! every subscribed resource type. Outbound requests fan in through a
//! broadcast channel that each connection subscribes to; inbound responses
//! are dispatched to the handler registered for their type URL and ACKed
//! only after the handler has decoded them.

use crate::proto::{
    self, aggregated_discovery_service_client::AggregatedDiscoveryServiceClient, DiscoveryRequest,
    DiscoveryResponse,
};
use crate::{XdsConfig, XdsError};
use ahash::AHashMap;
use futures::{future, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

/// Health of the discovery stream, observable via [`AdsChannel::state`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Decodes responses for one resource type.
#[async_trait::async_trait]
pub(crate) trait ResponseHandler: Send + Sync + 'static {
    /// Applies a response, returning the resource names to echo in the ACK.
    async fn handle(&self, response: DiscoveryResponse) -> Vec<String>;

    /// The names this handler wants re-requested on reconnect, or `None`
    /// when nothing is subscribed.
    fn interest(&self) -> Option<Vec<String>>;
}

/// Handle to the shared discovery stream. Clones share one connection.
#[derive(Clone)]
pub struct AdsChannel {
    inner: Arc<Inner>,
}

struct Inner {
    config: XdsConfig,
    node: proto::Node,
    requests: broadcast::Sender<DiscoveryRequest>,
    handlers: RwLock<AHashMap<String, Arc<dyn ResponseHandler>>>,
    state: watch::Sender<ConnectionState>,
}

struct Backoff {
    next: Duration,
    initial: Duration,
    max: Duration,
}

// === impl AdsChannel ===

impl AdsChannel {
    pub fn new(config: XdsConfig) -> Self {
        let (requests, _) = broadcast::channel(16);
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                node: config.node(),
                config,
                requests,
                handlers: RwLock::new(AHashMap::new()),
                state,
            }),
        }
    }

    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Drives the stream until shutdown, reconnecting with exponential
    /// backoff whenever it fails.
    pub async fn run(self, drain: drain::Watch) {
        if self.inner.config.address.is_none() {
            info!("no management server configured; discovery is disabled");
            let _ = drain.signaled().await;
            return;
        }

        let shutdown = drain.signaled();
        tokio::pin!(shutdown);
        let mut backoff = Backoff::new(
            self.inner.config.backoff_initial,
            self.inner.config.backoff_max,
        );
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("shutting down");
                    return;
                }
                res = self.connection(&mut backoff) => match res {
                    Ok(()) => info!("discovery stream closed by server"),
                    Err(error) => warn!(%error, "discovery stream failed"),
                },
            }
            self.inner.state.send_replace(ConnectionState::Disconnected);

            let delay = backoff.advance();
            debug!(?delay, "reconnecting after backoff");
            tokio::select! {
                _ = &mut shutdown => return,
                _ = time::sleep(delay) => {}
            }
        }
    }

    async fn connection(&self, backoff: &mut Backoff) -> Result<(), XdsError> {
        self.inner.state.send_replace(ConnectionState::Connecting);

        let target = self.inner.config.target()?;
        debug!(%target, "connecting to management server");
        let mut client = AggregatedDiscoveryServiceClient::connect(target).await?;

        let requests = BroadcastStream::new(self.inner.requests.subscribe())
            .filter_map(|req| future::ready(req.ok()));
        let mut request = tonic::Request::new(requests);
        // The token is re-read on every connect so rotations take effect.
        if let Some(token) = self.inner.config.bearer_token()? {
            let value = format!("Bearer {token}")
                .parse()
                .map_err(|_| XdsError::InvalidToken)?;
            request.metadata_mut().insert("authorization", value);
        }

        let mut responses = client
            .stream_aggregated_resources(request)
            .await?
            .into_inner();
        info!("discovery stream established");
        self.inner.state.send_replace(ConnectionState::Connected);
        backoff.reset();
        self.replay_interest();

        while let Some(rsp) = responses.message().await? {
            self.dispatch(rsp).await;
        }
        Ok(())
    }

    /// Re-requests every live subscription on a fresh stream, warming
    /// clusters before listener and route subscriptions.
    pub(crate) fn replay_interest(&self) {
        let mut interests = self
            .inner
            .handlers
            .read()
            .iter()
            .filter_map(|(url, handler)| handler.interest().map(|names| (url.clone(), names)))
            .collect::<Vec<_>>();
        interests.sort_by_key(|(url, _)| url != proto::CLUSTER_TYPE_URL);
        for (type_url, resource_names) in interests {
            self.send(DiscoveryRequest {
                type_url,
                resource_names,
                ..Default::default()
            });
        }
    }

    /// Routes a response to the handler registered for its type URL and
    /// ACKs it with the decoded resource names. The stream task calls this
    /// for every inbound frame; tests inject responses through it directly.
    pub async fn dispatch(&self, rsp: DiscoveryResponse) {
        let handler = self.inner.handlers.read().get(&rsp.type_url).cloned();
        let Some(handler) = handler else {
            debug!(type_url = %rsp.type_url, "response for an unsubscribed type");
            return;
        };
        debug!(
            type_url = %rsp.type_url,
            version = %rsp.version_info,
            resources = rsp.resources.len(),
            "dispatching response",
        );
        let (version_info, response_nonce, type_url) =
            (rsp.version_info.clone(), rsp.nonce.clone(), rsp.type_url.clone());
        let resource_names = handler.handle(rsp).await;
        self.send(DiscoveryRequest {
            version_info,
            response_nonce,
            type_url,
            resource_names,
            ..Default::default()
        });
    }

    pub(crate) fn send(&self, mut request: DiscoveryRequest) {
        if request.node.is_none() {
            request.node = Some(self.inner.node.clone());
        }
        // Dropped when no stream is up; live interest is replayed on
        // (re)connect.
        let _ = self.inner.requests.send(request);
    }

    pub(crate) fn register(&self, type_url: &str, handler: Arc<dyn ResponseHandler>) {
        self.inner
            .handlers
            .write()
            .insert(type_url.to_string(), handler);
    }

    #[cfg(test)]
    pub(crate) fn requests(&self) -> broadcast::Receiver<DiscoveryRequest> {
        self.inner.requests.subscribe()
    }
}

// === impl Backoff ===

impl Backoff {
    fn new(initial: Duration, max: Duration) -> Self {
        Self {
            next: initial,
            initial,
            max,
        }
    }

    fn reset(&mut self) {
        self.next = self.initial;
    }

    fn advance(&mut self) -> Duration {
        let delay = self.next;
        self.next = (delay * 2).min(self.max);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<String>);

    #[async_trait::async_trait]
    impl ResponseHandler for Fixed {
        async fn handle(&self, _rsp: DiscoveryResponse) -> Vec<String> {
            self.0.clone()
        }

        fn interest(&self) -> Option<Vec<String>> {
            None
        }
    }

    #[tokio::test]
    async fn dispatch_acks_registered_types_only() {
        let channel = AdsChannel::new(XdsConfig::default());
        channel.register(
            proto::LISTENER_TYPE_URL,
            Arc::new(Fixed(vec!["a".to_string(), "b".to_string()])),
        );
        let mut rx = channel.requests();

        channel
            .dispatch(DiscoveryResponse {
                version_info: "7".to_string(),
                nonce: "n1".to_string(),
                type_url: proto::LISTENER_TYPE_URL.to_string(),
                resources: vec![],
            })
            .await;
        let ack = rx.recv().await.unwrap();
        assert_eq!(ack.version_info, "7");
        assert_eq!(ack.response_nonce, "n1");
        assert_eq!(ack.type_url, proto::LISTENER_TYPE_URL);
        assert_eq!(ack.resource_names, vec!["a", "b"]);
        assert!(ack.node.is_some());

        // No handler registered for routes: the response is ignored and
        // nothing is ACKed.
        channel
            .dispatch(DiscoveryResponse {
                type_url: proto::ROUTE_TYPE_URL.to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn run_idles_until_shutdown_without_an_address() {
        let channel = AdsChannel::new(XdsConfig::default());
        let mut state = channel.state();
        let (signal, watch) = drain::channel();
        let task = tokio::spawn(channel.run(watch));

        signal.drain().await;
        task.await.unwrap();
        assert_eq!(*state.borrow_and_update(), ConnectionState::Disconnected);
    }

    #[test]
    fn backoff_doubles_to_max_and_resets() {
        let mut backoff = Backoff::new(Duration::from_secs(3), Duration::from_secs(10));
        assert_eq!(backoff.advance(), Duration::from_secs(3));
        assert_eq!(backoff.advance(), Duration::from_secs(6));
        assert_eq!(backoff.advance(), Duration::from_secs(10));
        assert_eq!(backoff.advance(), Duration::from_secs(10));
        backoff.reset();
        assert_eq!(backoff.advance(), Duration::from_secs(3));
    }
}
