//! District-scoped alert distribution.
//!
//! [`AlertHub`] owns the priority queue and a registry of subscribers
//! keyed by district. Publishing enqueues the alert, then hands the
//! original (pre-collapse) alert to the subscribers of that district
//! plus the island-wide subscribers. Each subscriber runs on its own
//! worker task fed by an unbounded channel, so a slow or failing
//! subscriber never blocks the publisher or its peers, and every
//! subscriber sees publishes in order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::{Alert, District};
use crate::queue::AlertQueue;
use crate::EngineError;

/// Receives alerts for a subscribed district.
///
/// Implementations run on a dedicated worker task; returning an error
/// (or panicking) affects only that subscriber and is logged at the hub
/// boundary.
#[async_trait]
pub trait DistrictSubscriber: Send + Sync {
    /// Stable subscriber name; one registration per (district, name)
    fn name(&self) -> &str;

    /// Handle one delivered alert
    async fn on_alert(&self, alert: &Alert) -> Result<(), EngineError>;
}

struct SubscriberSlot {
    tx: mpsc::UnboundedSender<Alert>,
    token: Uuid,
}

struct HubInner {
    queue: Mutex<AlertQueue>,
    topics: RwLock<HashMap<District, HashMap<String, SubscriberSlot>>>,
}

/// Publish/subscribe hub that owns the alert queue.
///
/// Cloning is cheap; clones share the queue and the subscriber
/// registry.
#[derive(Clone)]
pub struct AlertHub {
    inner: Arc<HubInner>,
}

impl AlertHub {
    /// Hub with a fresh, empty queue
    pub fn new() -> Self {
        Self::with_queue(AlertQueue::new())
    }

    /// Hub taking ownership of an existing queue
    pub fn with_queue(queue: AlertQueue) -> Self {
        Self {
            inner: Arc::new(HubInner {
                queue: Mutex::new(queue),
                topics: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Register a subscriber for one district.
    ///
    /// Subscribing the same name to the same district again replaces the
    /// earlier registration; the replaced worker drains what it already
    /// received, then exits. Must be called inside a tokio runtime.
    pub fn subscribe(
        &self,
        district: impl Into<District>,
        subscriber: Arc<dyn DistrictSubscriber>,
    ) -> Subscription {
        let district = district.into();
        let name = subscriber.name().to_string();
        let token = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel::<Alert>();

        let worker_name = name.clone();
        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if let Err(error) = subscriber.on_alert(&alert).await {
                    tracing::warn!(
                        subscriber = %worker_name,
                        alert_id = %alert.id,
                        %error,
                        "subscriber failed to handle alert"
                    );
                }
            }
        });

        let replaced = self
            .inner
            .topics
            .write()
            .entry(district.clone())
            .or_default()
            .insert(name.clone(), SubscriberSlot { tx, token })
            .is_some();
        tracing::debug!(
            district = %district,
            subscriber = %name,
            replaced,
            "subscriber registered"
        );

        Subscription {
            hub: self.clone(),
            district,
            name,
            token,
        }
    }

    /// Publish an alert: enqueue it, then notify district subscribers.
    ///
    /// Subscribers of the alert's district and of the island-wide
    /// wildcard each receive the original alert exactly once per
    /// publish; an island-wide alert reaches wildcard subscribers once.
    /// Delivery happens on the subscriber workers; this call never waits
    /// on a subscriber.
    pub fn publish(&self, alert: Alert) {
        self.inner.queue.lock().enqueue(alert.clone());

        let mut delivered = 0usize;
        let mut dead: Vec<(District, String, Uuid)> = Vec::new();
        {
            let topics = self.inner.topics.read();
            let mut notify = |district: &District| {
                if let Some(subscribers) = topics.get(district) {
                    for (name, slot) in subscribers {
                        if slot.tx.send(alert.clone()).is_ok() {
                            delivered += 1;
                        } else {
                            dead.push((district.clone(), name.clone(), slot.token));
                        }
                    }
                }
            };
            notify(&alert.district);
            if !alert.district.is_all() {
                notify(&District::All);
            }
        }
        for (district, name, token) in dead {
            tracing::warn!(
                district = %district,
                subscriber = %name,
                "pruning dead subscriber channel"
            );
            self.remove_entry(&district, &name, Some(token));
        }

        tracing::info!(
            alert_id = %alert.id,
            district = %alert.district,
            delivered,
            "alert published"
        );
    }

    /// Highest-priority queued alert, cloned out of the shared queue
    pub fn peek(&self) -> Option<Alert> {
        self.inner.queue.lock().peek().cloned()
    }

    /// Remove and return the highest-priority queued alert
    pub fn dequeue(&self) -> Option<Alert> {
        self.inner.queue.lock().dequeue()
    }

    /// Number of queue entries
    pub fn len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Whether the queue holds no entries
    pub fn is_empty(&self) -> bool {
        self.inner.queue.lock().is_empty()
    }

    /// Ordered copy of the queued alerts
    pub fn queue_snapshot(&self) -> Vec<Alert> {
        self.inner.queue.lock().iter().cloned().collect()
    }

    /// Ordered (alert, priority) copy for display surfaces
    pub fn ranked_snapshot(&self) -> Vec<(Alert, f64)> {
        self.inner
            .queue
            .lock()
            .ranked()
            .map(|(alert, priority)| (alert.clone(), priority))
            .collect()
    }

    /// Remove a named subscriber from a district.
    ///
    /// Returns whether a registration was removed; a no-op when no
    /// subscriber of that name listens on the district.
    pub fn unsubscribe(&self, district: impl Into<District>, name: &str) -> bool {
        self.remove_entry(&district.into(), name, None)
    }

    /// Number of subscribers registered for a district
    pub fn subscriber_count(&self, district: &District) -> usize {
        self.inner
            .topics
            .read()
            .get(district)
            .map_or(0, HashMap::len)
    }

    /// Remove a registration, optionally only when the token matches.
    ///
    /// The token guard keeps a stale handle from tearing down a newer
    /// registration under the same name.
    fn remove_entry(&self, district: &District, name: &str, expected: Option<Uuid>) -> bool {
        let mut topics = self.inner.topics.write();
        let Some(subscribers) = topics.get_mut(district) else {
            return false;
        };
        let matches = subscribers
            .get(name)
            .is_some_and(|slot| expected.map_or(true, |token| slot.token == token));
        if matches {
            subscribers.remove(name);
            tracing::debug!(district = %district, subscriber = %name, "subscriber removed");
        }
        if subscribers.is_empty() {
            topics.remove(district);
        }
        matches
    }
}

impl Default for AlertHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`AlertHub::subscribe`].
///
/// Dropping the handle keeps the subscription alive; call
/// [`Subscription::unsubscribe`] to end it.
#[derive(Clone)]
pub struct Subscription {
    hub: AlertHub,
    district: District,
    name: String,
    token: Uuid,
}

impl Subscription {
    /// District this subscription listens on
    pub fn district(&self) -> &District {
        &self.district
    }

    /// Registered subscriber name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// End the subscription.
    ///
    /// A no-op when the registration is already gone or was replaced by
    /// a newer subscription under the same name.
    pub fn unsubscribe(self) {
        self.hub
            .remove_entry(&self.district, &self.name, Some(self.token));
    }
}

/// Subscriber that reports deliveries through `tracing`.
pub struct LogSubscriber {
    name: String,
}

impl LogSubscriber {
    /// Create a log subscriber with the given registration name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl DistrictSubscriber for LogSubscriber {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_alert(&self, alert: &Alert) -> Result<(), EngineError> {
        tracing::info!(
            subscriber = %self.name,
            alert_id = %alert.id,
            severity = %alert.severity,
            district = %alert.district,
            title = %alert.title,
            "alert received"
        );
        Ok(())
    }
}
