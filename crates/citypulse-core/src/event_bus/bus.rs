use super::types::{BusEvent, BusTopic};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default broadcast capacity for async receivers
pub const DEFAULT_CAPACITY: usize = 64;

/// Error a listener may report; it is logged and dropped by the bus
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Listener return type
pub type ListenerResult = std::result::Result<(), ListenerError>;

type Listener = Arc<dyn Fn(&BusEvent) -> ListenerResult + Send + Sync>;

struct Registration {
    id: u64,
    topic: BusTopic,
    active: Arc<AtomicBool>,
    listener: Listener,
}

struct Inner {
    registrations: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
    sender: broadcast::Sender<BusEvent>,
}

impl Inner {
    fn registrations(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.registrations.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Process-wide publish/subscribe bus.
///
/// Cloning is cheap and every clone publishes to the same listeners.
/// Synchronous listeners run in registration order inside [`publish`];
/// a listener error or panic is logged and never reaches the publisher.
/// There is no replay: a listener registered after a publish never sees it.
///
/// [`publish`]: EventBus::publish
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    /// Create a bus whose async receivers buffer up to `capacity` events.
    ///
    /// Receivers that fall further behind get `RecvError::Lagged` and miss
    /// events; delivery is at-most-once.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                registrations: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                sender,
            }),
        }
    }

    /// Register a synchronous listener for one topic.
    ///
    /// The returned [`Subscription`] is the disposer. Dropping it does not
    /// unsubscribe.
    pub fn subscribe<F>(&self, topic: BusTopic, listener: F) -> Subscription
    where
        F: Fn(&BusEvent) -> ListenerResult + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));

        self.inner.registrations().push(Registration {
            id,
            topic,
            active: active.clone(),
            listener: Arc::new(listener),
        });
        debug!(%topic, listener_id = id, "Listener registered");

        Subscription {
            id,
            topic,
            active,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Receiver for every future event on every topic.
    #[must_use]
    pub fn watch(&self) -> broadcast::Receiver<BusEvent> {
        self.inner.sender.subscribe()
    }

    /// Deliver an event to the listeners of its topic, then to async
    /// receivers.
    ///
    /// The listener list is snapshotted before delivery, so listeners may
    /// subscribe or unsubscribe (themselves included) while running. A
    /// listener unsubscribed earlier in the same delivery is skipped.
    ///
    /// Returns the number of synchronous listeners invoked.
    pub fn publish(&self, event: BusEvent) -> usize {
        let topic = event.topic();
        let targets: Vec<(u64, Arc<AtomicBool>, Listener)> = self
            .inner
            .registrations()
            .iter()
            .filter(|r| r.topic == topic)
            .map(|r| (r.id, r.active.clone(), r.listener.clone()))
            .collect();

        let mut delivered = 0;
        for (id, active, listener) in targets {
            if !active.load(Ordering::SeqCst) {
                continue;
            }
            delivered += 1;

            match panic::catch_unwind(AssertUnwindSafe(|| listener(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(%topic, listener_id = id, error = %e, "Event listener failed");
                }
                Err(_) => {
                    warn!(%topic, listener_id = id, "Event listener panicked");
                }
            }
        }

        // No async receivers is fine
        let _ = self.inner.sender.send(event);
        debug!(%topic, listeners = delivered, "Event published");
        delivered
    }

    /// Number of synchronous listeners on a topic
    #[must_use]
    pub fn listener_count(&self, topic: BusTopic) -> usize {
        self.inner
            .registrations()
            .iter()
            .filter(|r| r.topic == topic)
            .count()
    }

    /// Number of async receivers
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.inner.registrations().len())
            .field("receivers", &self.receiver_count())
            .finish()
    }
}

/// Disposer for a synchronous listener
pub struct Subscription {
    id: u64,
    topic: BusTopic,
    active: Arc<AtomicBool>,
    bus: Weak<Inner>,
}

impl Subscription {
    /// Topic the listener is registered on
    #[must_use]
    pub fn topic(&self) -> BusTopic {
        self.topic
    }

    /// Whether the listener is still registered
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Remove the listener. Calling this again is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(inner) = self.bus.upgrade() {
            inner.registrations().retain(|r| r.id != self.id);
            debug!(topic = %self.topic, listener_id = self.id, "Listener removed");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("active", &self.is_active())
            .finish()
    }
}
