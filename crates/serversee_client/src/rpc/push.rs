//! Fan-out of push frames to independent, bounded subscribers.
//!
//! Every subscriber owns a ring of `capacity` events. A slow subscriber
//! loses its oldest events and never slows the publisher or its peers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::Stream;
use futures_util::stream;
use tokio::sync::Notify;

use super::envelope::InboundFrame;

#[derive(Debug, Default)]
struct Ring {
    events: VecDeque<InboundFrame>,
    dropped: u64,
    closed: bool,
}

#[derive(Debug)]
struct Slot {
    ring: Mutex<Ring>,
    notify: Notify,
}

impl Slot {
    fn lock(&self) -> MutexGuard<'_, Ring> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct HubInner {
    capacity: usize,
    subscribers: Mutex<Vec<Weak<Slot>>>,
}

impl Drop for HubInner {
    fn drop(&mut self) {
        let subscribers = self
            .subscribers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for slot in subscribers.drain(..).filter_map(|weak| weak.upgrade()) {
            slot.lock().closed = true;
            slot.notify.notify_one();
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushHub {
    inner: Arc<HubInner>,
}

impl PushHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                capacity: capacity.max(1),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn subscribe(&self) -> PushSubscription {
        let slot = Arc::new(Slot {
            ring: Mutex::new(Ring::default()),
            notify: Notify::new(),
        });
        self.subscribers().push(Arc::downgrade(&slot));
        PushSubscription { slot }
    }

    /// Delivers `event` to every live subscriber, evicting the oldest event
    /// of any subscriber whose ring is full.
    pub fn publish(&self, event: InboundFrame) {
        let mut subscribers = self.subscribers();
        subscribers.retain(|weak| weak.strong_count() > 0);

        for slot in subscribers.iter().filter_map(Weak::upgrade) {
            {
                let mut ring = slot.lock();
                if ring.events.len() >= self.inner.capacity {
                    ring.events.pop_front();
                    ring.dropped += 1;
                }
                ring.events.push_back(event.clone());
            }
            slot.notify.notify_one();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Weak<Slot>>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// One consumer's view of the push feed. Dropping it unsubscribes.
#[derive(Debug)]
pub struct PushSubscription {
    slot: Arc<Slot>,
}

impl PushSubscription {
    /// Waits for the next event. Returns `None` once the hub is gone and
    /// the ring is drained.
    pub async fn recv(&mut self) -> Option<InboundFrame> {
        loop {
            {
                let mut ring = self.slot.lock();
                if let Some(event) = ring.events.pop_front() {
                    return Some(event);
                }
                if ring.closed {
                    return None;
                }
            }
            self.slot.notify.notified().await;
        }
    }

    pub fn try_recv(&mut self) -> Option<InboundFrame> {
        self.slot.lock().events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.slot.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events evicted from this subscriber's ring so far.
    pub fn dropped(&self) -> u64 {
        self.slot.lock().dropped
    }

    pub fn into_stream(self) -> impl Stream<Item = InboundFrame> + Send + 'static {
        stream::unfold(self, |mut subscription| async move {
            let event = subscription.recv().await?;
            Some((event, subscription))
        })
    }
}
