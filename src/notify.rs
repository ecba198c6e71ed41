// Observer channel shared by both simulators (broadcast-backed).

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant};

/// Rate limit for "no receivers" logging (a simulator ticks whether or not anyone listens).
const NO_RECEIVERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Fan-out of events to any number of independent subscribers.
/// Slow subscribers may lag; they skip missed events rather than block publishers.
pub struct Notifier<T> {
    topic: &'static str,
    tx: broadcast::Sender<T>,
    next_subscription_id: AtomicU64,
    last_no_receivers_log: Mutex<Option<Instant>>,
}

impl<T: Clone + Send + 'static> Notifier<T> {
    pub fn new(topic: &'static str, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            topic,
            tx,
            next_subscription_id: AtomicU64::new(1),
            last_no_receivers_log: Mutex::new(None),
        }
    }

    /// Publishes to all current subscribers; returns how many received it.
    pub fn publish(&self, event: T) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            Err(_) => {
                let mut last = self
                    .last_no_receivers_log
                    .lock()
                    .unwrap_or_else(|e| e.into_inner());
                if last.is_none_or(|t| t.elapsed() >= NO_RECEIVERS_LOG_INTERVAL) {
                    tracing::debug!(
                        topic = self.topic,
                        operation = "publish",
                        "No subscribers; event dropped"
                    );
                    *last = Some(Instant::now());
                }
                0
            }
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(topic = self.topic, subscription_id = id, "subscribed");
        Subscription {
            id,
            topic: self.topic,
            rx: self.tx.subscribe(),
        }
    }

    /// Callback-style subscription: `callback` runs on a dedicated task for every event
    /// until the returned handle is unsubscribed or dropped. Must be called inside a Tokio runtime.
    pub fn on_event<F>(&self, mut callback: F) -> SubscriptionHandle
    where
        F: FnMut(T) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        let id = subscription.id();
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                callback(event);
            }
        });
        SubscriptionHandle {
            id,
            task: Some(task),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Pull-style subscription. Dropping it unsubscribes.
pub struct Subscription<T> {
    id: u64,
    topic: &'static str,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event, or `None` once the notifier is gone. Lagged events are skipped.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        topic = self.topic,
                        subscription_id = self.id,
                        "subscriber lagged, skipped {} events",
                        n
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll; `None` when nothing is queued (or the notifier is gone).
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {
        tracing::debug!(
            topic = self.topic,
            subscription_id = self.id,
            "unsubscribed"
        );
    }
}

/// Handle for a callback subscription; aborts the forwarding task on unsubscribe or drop.
pub struct SubscriptionHandle {
    id: u64,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
