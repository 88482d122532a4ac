// ── Error banner model ──
//
// Screen-independent state of the "data unavailable" banner: shown for a
// few seconds after any `API_ERROR`, dismissible. Hosts poll `message()`
// when they render.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use tracing::trace;

use motorlog_api::{ApiErrorEvent, BridgeEvent, EventBridge, ListenerId, Topic};

pub const BANNER_MESSAGE: &str = "Data unavailable, try again later";
pub const BANNER_DURATION: Duration = Duration::from_secs(5);

/// Subscribes to `API_ERROR` for as long as it lives.
pub struct ErrorBanner {
    bridge: Arc<EventBridge>,
    listener: ListenerId,
    raised_at: Arc<ArcSwapOption<Instant>>,
    last: Arc<ArcSwapOption<ApiErrorEvent>>,
}

impl ErrorBanner {
    pub fn attach(bridge: Arc<EventBridge>) -> Self {
        let raised_at: Arc<ArcSwapOption<Instant>> = Arc::new(ArcSwapOption::empty());
        let last: Arc<ArcSwapOption<ApiErrorEvent>> = Arc::new(ArcSwapOption::empty());
        let (raised_slot, last_slot) = (Arc::clone(&raised_at), Arc::clone(&last));
        let listener = bridge.on(Topic::ApiError, move |event| {
            let BridgeEvent::ApiError(event) = event;
            trace!(url = %event.url, "error banner raised");
            last_slot.store(Some(Arc::new(event.clone())));
            raised_slot.store(Some(Arc::new(Instant::now())));
        });

        Self {
            bridge,
            listener,
            raised_at,
            last,
        }
    }

    /// The banner text, if it should be visible now.
    pub fn message(&self) -> Option<&'static str> {
        self.message_at(Instant::now())
    }

    pub fn message_at(&self, now: Instant) -> Option<&'static str> {
        let at = self.raised_at.load_full()?;
        (now.saturating_duration_since(*at) < BANNER_DURATION).then_some(BANNER_MESSAGE)
    }

    pub fn is_visible(&self) -> bool {
        self.message().is_some()
    }

    /// The event that last raised the banner, even if it has since expired
    /// or was dismissed.
    pub fn last_error(&self) -> Option<ApiErrorEvent> {
        self.last.load_full().map(|e| (*e).clone())
    }

    /// Hide the banner until the next error.
    pub fn dismiss(&self) {
        self.raised_at.store(None);
    }
}

impl Drop for ErrorBanner {
    fn drop(&mut self) {
        self.bridge.off(Topic::ApiError, self.listener);
    }
}
