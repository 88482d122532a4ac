// Session state shared by the dispatcher and every login flow.
//
// The bearer token and the guest flag are held in memory and mirrored to
// the persisted key-value store. The dispatcher reads the token through
// the same `Arc<Session>` that login/logout write through, so there is a
// single current value per process.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::Error;
use crate::storage::KeyValueStore;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key for the guest-mode flag (`"true"` / `"false"`).
pub const GUEST_MODE_KEY: &str = "guest_mode";

/// Bearer token and guest flag for the current device.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    token: ArcSwapOption<SecretString>,
    guest: AtomicBool,
}

impl Session {
    /// Empty session backed by `store`. Nothing is read yet; call
    /// [`restore()`](Self::restore) to pick up persisted state.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            token: ArcSwapOption::empty(),
            guest: AtomicBool::new(false),
        }
    }

    /// Load token and guest flag from storage.
    pub fn restore(&self) -> Result<(), Error> {
        self.reload()?;
        let guest = self
            .store
            .get(GUEST_MODE_KEY)?
            .is_some_and(|v| v.trim() == "true");
        self.guest.store(guest, Ordering::SeqCst);
        debug!(
            authenticated = self.is_authenticated(),
            guest, "session restored"
        );
        Ok(())
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // ── Token ────────────────────────────────────────────────────────

    /// Current in-memory token.
    pub fn token(&self) -> Option<Arc<SecretString>> {
        self.token.load_full()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.load().is_some()
    }

    /// Persist and activate a new token.
    pub fn set_token(&self, token: SecretString) -> Result<(), Error> {
        self.store.set(TOKEN_KEY, token.expose_secret())?;
        self.token.store(Some(Arc::new(token)));
        debug!("session token stored");
        Ok(())
    }

    /// Drop the token from memory and storage. Calling this on an empty
    /// session is a no-op.
    pub fn remove_token(&self) -> Result<(), Error> {
        self.token.store(None);
        self.store.remove(TOKEN_KEY)?;
        debug!("session token removed");
        Ok(())
    }

    /// Re-read the persisted token into memory.
    ///
    /// Only needed when something wrote `auth_token` to storage without
    /// going through [`set_token()`](Self::set_token).
    pub fn reload(&self) -> Result<(), Error> {
        let token = self
            .store
            .get(TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(|t| Arc::new(SecretString::from(t)));
        self.token.store(token);
        Ok(())
    }

    // ── Guest mode ───────────────────────────────────────────────────

    pub fn is_guest(&self) -> bool {
        self.guest.load(Ordering::SeqCst)
    }

    /// Persist and apply the guest flag.
    pub fn set_guest_mode(&self, enabled: bool) -> Result<(), Error> {
        self.store
            .set(GUEST_MODE_KEY, if enabled { "true" } else { "false" })?;
        self.guest.store(enabled, Ordering::SeqCst);
        debug!(enabled, "guest mode updated");
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("guest", &self.is_guest())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session() -> (Arc<MemoryStore>, Session) {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        (store, session)
    }

    #[test]
    fn set_token_then_reload_keeps_value() {
        let (_, session) = session();
        session.set_token(SecretString::from("t-123".to_string())).unwrap();
        session.reload().unwrap();
        assert_eq!(session.token().unwrap().expose_secret(), "t-123");
    }

    #[test]
    fn remove_token_twice_is_fine() {
        let (store, session) = session();
        session.set_token(SecretString::from("t-123".to_string())).unwrap();

        session.remove_token().unwrap();
        assert!(session.token().is_none());
        session.remove_token().unwrap();
        assert!(session.token().is_none());
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn reload_picks_up_out_of_band_write() {
        let (store, session) = session();
        store.set(TOKEN_KEY, "from-social-login").unwrap();
        assert!(!session.is_authenticated());

        session.reload().unwrap();
        assert_eq!(session.token().unwrap().expose_secret(), "from-social-login");
    }

    #[test]
    fn restore_reads_guest_flag() {
        let (store, session) = session();
        store.set(GUEST_MODE_KEY, "true").unwrap();
        session.restore().unwrap();
        assert!(session.is_guest());
        assert!(!session.is_authenticated());

        session.set_guest_mode(false).unwrap();
        assert_eq!(store.get(GUEST_MODE_KEY).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn debug_output_hides_token() {
        let (_, session) = session();
        session.set_token(SecretString::from("super-secret".to_string())).unwrap();
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("authenticated: true"));
    }
}
