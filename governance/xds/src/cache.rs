use parking_lot::RwLock;
use std::sync::Arc;

/// The latest accepted snapshot of one resource type.
///
/// Each discovery response replaces the whole snapshot; readers hold an
/// `Arc` to whichever snapshot was current when they looked, so a
/// concurrent replace never shows them a half-applied update.
#[derive(Debug)]
pub struct ResourceCache<R> {
    inner: RwLock<Arc<[R]>>,
}

// === impl ResourceCache ===

impl<R> Default for ResourceCache<R> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Arc::new([])),
        }
    }
}

impl<R> ResourceCache<R> {
    pub fn snapshot(&self) -> Arc<[R]> {
        self.inner.read().clone()
    }

    pub fn replace(&self, resources: Arc<[R]>) {
        *self.inner.write() = resources;
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_swaps_whole_snapshot() {
        let cache = ResourceCache::<u32>::default();
        assert!(cache.is_empty());

        cache.replace(vec![1, 2, 3].into());
        let before = cache.snapshot();

        cache.replace(vec![4].into());
        // The earlier snapshot is unaffected by the swap.
        assert_eq!(&*before, &[1, 2, 3]);
        assert_eq!(&*cache.snapshot(), &[4]);
    }

    #[test]
    fn concurrent_reads_see_whole_snapshots() {
        let cache = Arc::new(ResourceCache::<u32>::default());
        cache.replace(vec![1, 1, 1].into());

        let writer = {
            let cache = cache.clone();
            std::thread::spawn(move || {
                for i in 0..1000u32 {
                    let v = 1 + i % 2;
                    cache.replace(vec![v, v, v].into());
                }
            })
        };
        for _ in 0..1000 {
            let snapshot = cache.snapshot();
            // Never a mix of the old and new values.
            assert!(snapshot.iter().all(|v| *v == snapshot[0]));
        }
        writer.join().unwrap();
    }
}
