// ── Error event bridge ──
//
// Decouples "a request failed somewhere" from whoever shows it to the
// user. Synchronous listeners are registered per topic; async consumers
// can also take a `broadcast` receiver.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{trace, warn};

const EVENT_CHANNEL_SIZE: usize = 64;

/// Event names consumers can listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum Topic {
    #[strum(serialize = "API_ERROR")]
    ApiError,
}

/// Payload of an `API_ERROR` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorEvent {
    pub url: String,
    pub method: String,
    pub message: String,
}

/// Anything published on the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    ApiError(ApiErrorEvent),
}

impl BridgeEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::ApiError(_) => Topic::ApiError,
        }
    }
}

/// Handle returned by [`EventBridge::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&BridgeEvent) + Send + Sync>;

/// In-process publish/subscribe hub.
pub struct EventBridge {
    listeners: DashMap<Topic, IndexMap<ListenerId, Listener>>,
    next_id: AtomicU64,
    tx: broadcast::Sender<BridgeEvent>,
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
            tx,
        }
    }

    /// Register a listener for `topic`.
    pub fn on<F>(&self, topic: Topic, listener: F) -> ListenerId
    where
        F: Fn(&BridgeEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .entry(topic)
            .or_default()
            .insert(id, Arc::new(listener));
        trace!(%topic, ?id, "listener registered");
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, topic: Topic, id: ListenerId) -> bool {
        self.listeners
            .get_mut(&topic)
            .is_some_and(|mut set| set.shift_remove(&id).is_some())
    }

    /// Number of listeners currently registered for `topic`.
    pub fn listener_count(&self, topic: Topic) -> usize {
        self.listeners.get(&topic).map_or(0, |set| set.len())
    }

    /// Async subscription to every event.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }

    /// Deliver `event` to every listener of its topic, then to async
    /// subscribers. A panicking listener is logged and skipped.
    pub fn emit(&self, event: &BridgeEvent) {
        let topic = event.topic();
        // Snapshot first so listeners may call `on`/`off` re-entrantly.
        let listeners: Vec<Listener> = self
            .listeners
            .get(&topic)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!(%topic, "event listener panicked");
            }
        }

        // No receivers is fine.
        let _ = self.tx.send(event.clone());
    }
}
