//! Typed access to one xDS resource type over the shared stream.
//!
//! An [`XdsProtocol`] registers itself as the stream's handler for its type
//! URL. Each accepted response replaces the type's cached snapshot, answers
//! any one-shot fetches in flight, and is pushed to every subscriber.

use crate::channel::{AdsChannel, ResponseHandler};
use crate::proto::{self, DiscoveryRequest, DiscoveryResponse};
use crate::{ResourceCache, XdsError};
use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time;
use tracing::{debug, warn};

/// A discovery resource type the client understands.
pub trait XdsResource: prost::Message + Default + Clone + Send + Sync + 'static {
    const TYPE_URL: &'static str;

    fn name(&self) -> &str;
}

impl XdsResource for proto::listener::Listener {
    const TYPE_URL: &'static str = proto::LISTENER_TYPE_URL;

    fn name(&self) -> &str {
        &self.name
    }
}

impl XdsResource for proto::route::RouteConfiguration {
    const TYPE_URL: &'static str = proto::ROUTE_TYPE_URL;

    fn name(&self) -> &str {
        &self.name
    }
}

impl XdsResource for proto::cluster::Cluster {
    const TYPE_URL: &'static str = proto::CLUSTER_TYPE_URL;

    fn name(&self) -> &str {
        &self.name
    }
}

/// Client for one resource type.
pub struct XdsProtocol<R> {
    channel: AdsChannel,
    state: Arc<State<R>>,
    timeout: Duration,
}

/// A live watch on a resource type; dropping it cancels the watch.
pub struct Subscription<R> {
    id: u64,
    rx: watch::Receiver<Option<Arc<[R]>>>,
    state: Arc<State<R>>,
}

struct State<R> {
    cache: ResourceCache<R>,
    subscriptions: Mutex<AHashMap<u64, Watcher<R>>>,
    pending: Mutex<Vec<oneshot::Sender<Arc<[R]>>>>,
    next_id: AtomicU64,
}

struct Watcher<R> {
    names: Vec<String>,
    tx: watch::Sender<Option<Arc<[R]>>>,
}

// === impl XdsProtocol ===

impl<R: XdsResource> XdsProtocol<R> {
    pub fn new(channel: AdsChannel, timeout: Duration) -> Self {
        let state = Arc::new(State {
            cache: ResourceCache::default(),
            subscriptions: Mutex::new(AHashMap::new()),
            pending: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        });
        channel.register(R::TYPE_URL, state.clone());
        Self {
            channel,
            state,
            timeout,
        }
    }

    /// The most recently accepted snapshot.
    pub fn cache(&self) -> Arc<[R]> {
        self.state.cache.snapshot()
    }

    /// Requests the named resources and awaits the next response of this
    /// type, up to the configured deadline.
    pub async fn get(&self, names: Vec<String>) -> Result<Arc<[R]>, XdsError> {
        let (tx, rx) = oneshot::channel();
        self.state.pending.lock().push(tx);
        self.request(names);
        match time::timeout(self.timeout, rx).await {
            Ok(Ok(resources)) => Ok(resources),
            Ok(Err(_)) | Err(_) => {
                self.state.pending.lock().retain(|tx| !tx.is_closed());
                Err(XdsError::Timeout {
                    type_url: R::TYPE_URL,
                    timeout: self.timeout,
                })
            }
        }
    }

    /// Subscribes to the named resources (all of them when empty); every
    /// accepted response is delivered as a whole snapshot.
    pub fn observe(&self, names: Vec<String>) -> Subscription<R> {
        let (tx, rx) = watch::channel(None);
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        self.state.subscriptions.lock().insert(
            id,
            Watcher {
                names: names.clone(),
                tx,
            },
        );
        self.request(names);
        Subscription {
            id,
            rx,
            state: self.state.clone(),
        }
    }

    pub fn type_url(&self) -> &'static str {
        R::TYPE_URL
    }

    fn request(&self, resource_names: Vec<String>) {
        self.channel.send(DiscoveryRequest {
            type_url: R::TYPE_URL.to_string(),
            resource_names,
            ..Default::default()
        });
    }
}

// === impl State ===

#[async_trait::async_trait]
impl<R: XdsResource> ResponseHandler for State<R> {
    async fn handle(&self, rsp: DiscoveryResponse) -> Vec<String> {
        let resources = decode_resources::<R>(&rsp);
        let names = resources
            .iter()
            .map(|r| r.name().to_string())
            .collect::<Vec<_>>();
        let snapshot: Arc<[R]> = resources.into();

        self.cache.replace(snapshot.clone());
        for tx in std::mem::take(&mut *self.pending.lock()) {
            let _ = tx.send(snapshot.clone());
        }
        // A watcher that has fallen behind observes only the newest
        // snapshot when it next reads.
        for watcher in self.subscriptions.lock().values() {
            let _ = watcher.tx.send(Some(snapshot.clone()));
        }
        names
    }

    fn interest(&self) -> Option<Vec<String>> {
        let subscriptions = self.subscriptions.lock();
        if subscriptions.is_empty() {
            return None;
        }
        // An empty name set watches every resource of the type and subsumes
        // any named subscriptions.
        if subscriptions.values().any(|w| w.names.is_empty()) {
            return Some(vec![]);
        }
        let mut names = subscriptions
            .values()
            .flat_map(|w| w.names.iter().cloned())
            .collect::<Vec<_>>();
        names.sort();
        names.dedup();
        Some(names)
    }
}

/// Decodes a response's resources in order, skipping entries that are
/// malformed or of an unexpected type.
fn decode_resources<R: XdsResource>(rsp: &DiscoveryResponse) -> Vec<R> {
    let mut resources = Vec::with_capacity(rsp.resources.len());
    for any in &rsp.resources {
        if any.type_url != R::TYPE_URL {
            debug!(
                type_url = %any.type_url,
                expected = %R::TYPE_URL,
                "skipping resource of unexpected type",
            );
            continue;
        }
        match R::decode(any.value.as_slice()) {
            Ok(resource) => resources.push(resource),
            Err(source) => {
                let error = XdsError::Decode {
                    type_url: any.type_url.clone(),
                    source,
                };
                warn!(%error, "skipping undecodable resource");
            }
        }
    }
    resources
}

// === impl Subscription ===

impl<R: XdsResource> Subscription<R> {
    /// Awaits the next snapshot; `None` once the protocol is gone.
    pub async fn recv(&mut self) -> Option<Arc<[R]>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    /// Stops delivery; equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl<R> Drop for Subscription<R> {
    fn drop(&mut self) {
        self.state.subscriptions.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::listener::Listener;
    use crate::XdsConfig;

    fn listener_any(name: &str) -> proto::Any {
        proto::pack(
            &Listener {
                name: name.to_string(),
                filter_chains: vec![],
            },
            proto::LISTENER_TYPE_URL,
        )
    }

    fn response(resources: Vec<proto::Any>) -> DiscoveryResponse {
        DiscoveryResponse {
            version_info: "1".to_string(),
            nonce: "n".to_string(),
            type_url: proto::LISTENER_TYPE_URL.to_string(),
            resources,
        }
    }

    #[test]
    fn decode_skips_malformed_and_preserves_order() {
        let malformed = proto::Any {
            type_url: proto::LISTENER_TYPE_URL.to_string(),
            value: vec![0xff],
        };
        let wrong_type = proto::Any {
            type_url: proto::ROUTE_TYPE_URL.to_string(),
            value: vec![],
        };
        let rsp = response(vec![
            listener_any("a"),
            malformed,
            wrong_type,
            listener_any("c"),
        ]);

        let decoded = decode_resources::<Listener>(&rsp);
        let names = decoded.iter().map(|l| l.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn get_times_out_without_a_response() {
        let channel = AdsChannel::new(XdsConfig::default());
        let protocol = XdsProtocol::<Listener>::new(channel, Duration::from_millis(10));
        assert!(matches!(
            protocol.get(vec![]).await,
            Err(XdsError::Timeout { .. })
        ));
        // The abandoned fetch is pruned.
        assert!(protocol.state.pending.lock().is_empty());
    }

    #[tokio::test]
    async fn get_completes_on_the_next_response() {
        let channel = AdsChannel::new(XdsConfig::default());
        let protocol = XdsProtocol::<Listener>::new(channel.clone(), Duration::from_secs(1));

        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            channel.dispatch(response(vec![listener_any("a")])).await;
        });

        let resources = protocol.get(vec!["a".to_string()]).await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "a");
        assert_eq!(&*protocol.cache(), &*resources);
    }

    #[tokio::test]
    async fn subscriptions_deliver_independently_until_dropped() {
        let channel = AdsChannel::new(XdsConfig::default());
        let protocol = XdsProtocol::<Listener>::new(channel.clone(), Duration::from_secs(1));

        let mut first = protocol.observe(vec![]);
        let mut second = protocol.observe(vec![]);

        channel.dispatch(response(vec![listener_any("a")])).await;
        assert_eq!(first.recv().await.unwrap().len(), 1);
        assert_eq!(second.recv().await.unwrap().len(), 1);

        second.cancel();
        let malformed = proto::Any {
            type_url: proto::LISTENER_TYPE_URL.to_string(),
            value: vec![0xff],
        };
        channel
            .dispatch(response(vec![
                listener_any("a"),
                malformed,
                listener_any("b"),
            ]))
            .await;
        // One delivery, holding only the resources that decoded.
        let snapshot = first.recv().await.unwrap();
        let names = snapshot.iter().map(|l| l.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(protocol.state.subscriptions.lock().len(), 1);
    }

    #[tokio::test]
    async fn slow_subscriber_sees_the_newest_snapshot() {
        let channel = AdsChannel::new(XdsConfig::default());
        let protocol = XdsProtocol::<Listener>::new(channel.clone(), Duration::from_secs(1));

        let mut sub = protocol.observe(vec![]);
        for name in ["v1", "v2", "v3", "v4", "v5", "v6"] {
            channel.dispatch(response(vec![listener_any(name)])).await;
        }

        // Reading only now, after falling six pushes behind, yields the
        // push the cache holds rather than a stale queued one.
        let snapshot = sub.recv().await.unwrap();
        assert_eq!(snapshot[0].name, "v6");
        assert_eq!(&*protocol.cache(), &*snapshot);
    }

    #[tokio::test]
    async fn interest_unions_names_and_widens_to_wildcard() {
        let channel = AdsChannel::new(XdsConfig::default());
        let protocol = XdsProtocol::<Listener>::new(channel, Duration::from_secs(1));

        let named = protocol.observe(vec!["b".to_string(), "a".to_string()]);
        let also_a = protocol.observe(vec!["a".to_string()]);
        assert_eq!(
            protocol.state.interest(),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        // A no-name subscription watches everything, so the replayed
        // request must not narrow it to the named set.
        let wildcard = protocol.observe(vec![]);
        assert_eq!(protocol.state.interest(), Some(vec![]));
        wildcard.cancel();
        assert_eq!(
            protocol.state.interest(),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        drop(named);
        drop(also_a);
        assert_eq!(protocol.state.interest(), None);
    }

    #[tokio::test]
    async fn reconnect_replays_interest_and_preserves_the_cache() {
        let channel = AdsChannel::new(XdsConfig::default());
        let lds = XdsProtocol::<Listener>::new(channel.clone(), Duration::from_secs(1));
        let cds =
            XdsProtocol::<proto::cluster::Cluster>::new(channel.clone(), Duration::from_secs(1));

        let _clusters = cds.observe(vec![]);
        let mut listeners = lds.observe(vec!["a".to_string()]);
        channel.dispatch(response(vec![listener_any("a")])).await;
        assert_eq!(listeners.recv().await.unwrap()[0].name, "a");

        // The stream drops and comes back: nothing is pushed in between,
        // so the last accepted snapshot stands.
        let mut requests = channel.requests();
        channel.replay_interest();
        assert_eq!(lds.cache()[0].name, "a");

        let first = requests.recv().await.unwrap();
        assert_eq!(first.type_url, proto::CLUSTER_TYPE_URL);
        let second = requests.recv().await.unwrap();
        assert_eq!(second.type_url, proto::LISTENER_TYPE_URL);
        assert_eq!(second.resource_names, vec!["a"]);

        channel.dispatch(response(vec![listener_any("b")])).await;
        assert_eq!(listeners.recv().await.unwrap()[0].name, "b");
        assert_eq!(lds.cache()[0].name, "b");
    }
}
