// ── Reference dictionary cache ──
//
// Stale-while-revalidate over the locale-dependent reference lists.
// A fresh entry is returned immediately and refreshed in the background;
// a stale or missing one waits on the network and falls back to the old
// value if the backend cannot be reached. Entries are never deleted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use motorlog_api::{ApiClient, DictionaryItem, DictionaryResource, KeyValueStore, StoreExt};

use crate::error::CoreError;
use crate::stamped::Stamped;

/// Storage key for one resource in one locale.
pub fn cache_key(resource: DictionaryResource, locale: &str) -> String {
    format!("dictionary:{resource}:{locale}")
}

/// Where a dictionary lookup got its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Fresh cache hit; a background refresh was started.
    Fresh,
    /// Fetched from the backend during this call.
    Network,
    /// The backend failed and an expired entry was served.
    Stale,
}

/// Result of [`DictionaryCache::lookup`].
#[derive(Debug)]
pub struct DictionaryLookup {
    pub items: Vec<DictionaryItem>,
    pub source: CacheSource,
    /// Handle of the background refresh, present on a fresh hit. Callers
    /// normally drop it; tests await it.
    pub refresh: Option<JoinHandle<()>>,
}

type Entry = Stamped<Vec<DictionaryItem>>;

pub struct DictionaryCache {
    client: Arc<ApiClient>,
    store: Arc<dyn KeyValueStore>,
    max_age: Duration,
}

impl DictionaryCache {
    pub fn new(client: Arc<ApiClient>, store: Arc<dyn KeyValueStore>, max_age: Duration) -> Self {
        Self {
            client,
            store,
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Items of `resource` in `locale`.
    pub async fn get(
        &self,
        resource: DictionaryResource,
        locale: &str,
    ) -> Result<Vec<DictionaryItem>, CoreError> {
        Ok(self.lookup(resource, locale).await?.items)
    }

    pub async fn lookup(
        &self,
        resource: DictionaryResource,
        locale: &str,
    ) -> Result<DictionaryLookup, CoreError> {
        let key = cache_key(resource, locale);
        let cached = read_entry(self.store.as_ref(), &key);

        if let Some(entry) = cached.as_ref() {
            if entry.is_fresh_at(Utc::now(), self.max_age) {
                debug!(%key, "dictionary cache hit");
                let refresh = self.spawn_refresh(resource, locale, key);
                return Ok(DictionaryLookup {
                    items: entry.data.clone(),
                    source: CacheSource::Fresh,
                    refresh: Some(refresh),
                });
            }
        }

        match fetch_and_store(&self.client, self.store.as_ref(), resource, locale, &key).await {
            Ok(items) => Ok(DictionaryLookup {
                items,
                source: CacheSource::Network,
                refresh: None,
            }),
            Err(err) => match cached {
                Some(entry) => {
                    warn!(%key, error = %err, saved_at = %entry.saved_at, "serving stale dictionary");
                    Ok(DictionaryLookup {
                        items: entry.data,
                        source: CacheSource::Stale,
                        refresh: None,
                    })
                }
                None => Err(err.into()),
            },
        }
    }

    fn spawn_refresh(
        &self,
        resource: DictionaryResource,
        locale: &str,
        key: String,
    ) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        let store = Arc::clone(&self.store);
        let locale = locale.to_owned();
        tokio::spawn(async move {
            if let Err(e) = fetch_and_store(&client, store.as_ref(), resource, &locale, &key).await {
                debug!(%key, error = %e, "background dictionary refresh failed");
            }
        })
    }
}

/// Fetch from the backend and overwrite the cache entry. A guest-gate
/// answer is returned but not cached.
async fn fetch_and_store(
    client: &ApiClient,
    store: &dyn KeyValueStore,
    resource: DictionaryResource,
    locale: &str,
    key: &str,
) -> Result<Vec<DictionaryItem>, motorlog_api::Error> {
    let resp = client.get_dictionary(resource, locale).await?;
    if resp.short_circuited {
        return Ok(resp.data);
    }

    let entry = Stamped::new(resp.data);
    if let Err(e) = store.set_json(key, &entry) {
        warn!(%key, error = %e, "failed to persist dictionary");
    }
    Ok(entry.data)
}

/// Unreadable entries are treated as missing.
fn read_entry(store: &dyn KeyValueStore, key: &str) -> Option<Entry> {
    match store.get_json::<Entry>(key) {
        Ok(entry) => entry,
        Err(e) => {
            warn!(%key, error = %e, "ignoring unreadable dictionary entry");
            None
        }
    }
}
