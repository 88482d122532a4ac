// ── Offline fallback store ──
//
// Local mirrors of the last successful list fetches, served when the
// backend is unreachable, plus the queue of changes made while offline.
// The queue is only recorded here; nothing replays it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};
use uuid::Uuid;

use motorlog_api::{
    EntityId, KeyValueStore, Reminder, ServiceRecord, StoreExt, User, Vehicle,
};

use crate::error::CoreError;
use crate::stamped::Stamped;

pub const LAST_SYNC_KEY: &str = "offline:last_sync";
pub const PENDING_CHANGES_KEY: &str = "offline:pending_changes";

// ── Mirrors ──────────────────────────────────────────────────────────

/// The collections kept for offline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MirrorKind {
    Vehicles,
    Reminders,
    ServiceHistory,
    User,
}

impl MirrorKind {
    pub fn key(self) -> String {
        format!("offline:{self}")
    }
}

/// A payload type with a mirror slot.
pub trait Mirrored: Serialize + DeserializeOwned {
    const KIND: MirrorKind;
}

impl Mirrored for Vec<Vehicle> {
    const KIND: MirrorKind = MirrorKind::Vehicles;
}

impl Mirrored for Vec<Reminder> {
    const KIND: MirrorKind = MirrorKind::Reminders;
}

impl Mirrored for Vec<ServiceRecord> {
    const KIND: MirrorKind = MirrorKind::ServiceHistory;
}

impl Mirrored for User {
    const KIND: MirrorKind = MirrorKind::User;
}

/// Records that can be located inside a mirrored list.
pub trait Identified {
    fn id(&self) -> &EntityId;
}

impl Identified for Vehicle {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Identified for Reminder {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Identified for ServiceRecord {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

// ── Fetch results ────────────────────────────────────────────────────

/// Where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// The backend answered just now.
    Live,
    /// The backend failed; this is the mirror saved at `as_of`.
    Mirror { as_of: DateTime<Utc> },
    /// Guest mode answered locally with an empty payload.
    Guest,
}

/// Data plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            source: DataSource::Live,
        }
    }

    pub fn guest(data: T) -> Self {
        Self {
            data,
            source: DataSource::Guest,
        }
    }

    pub fn mirror(data: T, as_of: DateTime<Utc>) -> Self {
        Self {
            data,
            source: DataSource::Mirror { as_of },
        }
    }

    /// `true` when the data came from the local mirror.
    pub fn is_stale(&self) -> bool {
        matches!(self.source, DataSource::Mirror { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            source: self.source,
        }
    }
}

// ── Pending changes ──────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Vehicle,
    Reminder,
    ServiceRecord,
    Expense,
}

/// A mutation recorded while offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub entity: EntityKind,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

// ── Connectivity ─────────────────────────────────────────────────────

/// Host-reported network reachability. Starts online.
pub struct Connectivity(AtomicBool);

impl Default for Connectivity {
    fn default() -> Self {
        Self(AtomicBool::new(true))
    }
}

impl Connectivity {
    pub fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns the previous value.
    pub fn set_online(&self, online: bool) -> bool {
        self.0.swap(online, Ordering::SeqCst)
    }
}

impl fmt::Debug for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Connectivity").field(&self.is_online()).finish()
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// Mirror and queue persistence on top of a [`KeyValueStore`].
pub struct OfflineStore {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles on a single key.
    write_lock: Mutex<()>,
}

impl OfflineStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Overwrite the mirror for `T` and bump the last-sync time.
    pub fn save<T: Mirrored>(&self, data: &T) -> Result<(), CoreError> {
        let entry = Stamped {
            data,
            saved_at: Utc::now(),
        };
        self.store.set_json(&T::KIND.key(), &entry)?;
        self.store.set_json(LAST_SYNC_KEY, &entry.saved_at)?;
        debug!(mirror = %T::KIND, "mirror updated");
        Ok(())
    }

    /// The mirrored value, if any. Unreadable mirrors count as absent.
    pub fn load<T: Mirrored>(&self) -> Option<Stamped<T>> {
        let key = T::KIND.key();
        match self.store.get_json(&key) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(%key, error = %e, "ignoring unreadable mirror");
                None
            }
        }
    }

    /// Apply `f` to an existing mirror, keeping its `savedAt`. Does nothing
    /// when no mirror exists yet.
    pub fn update<T: Mirrored>(&self, f: impl FnOnce(&mut T)) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(mut entry) = self.load::<T>() else {
            return Ok(());
        };
        f(&mut entry.data);
        self.store.set_json(&T::KIND.key(), &entry)?;
        Ok(())
    }

    /// Insert or replace `record` (matched by id) in a list mirror.
    pub fn upsert<R>(&self, record: &R) -> Result<(), CoreError>
    where
        R: Identified + Clone,
        Vec<R>: Mirrored,
    {
        self.update::<Vec<R>>(|list| {
            match list.iter_mut().find(|r| r.id() == record.id()) {
                Some(slot) => *slot = record.clone(),
                None => list.push(record.clone()),
            }
        })
    }

    /// Drop the record with `id` from a list mirror.
    pub fn remove<R>(&self, id: &EntityId) -> Result<(), CoreError>
    where
        R: Identified,
        Vec<R>: Mirrored,
    {
        self.update::<Vec<R>>(|list| list.retain(|r| r.id() != id))
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.store.get_json(LAST_SYNC_KEY).ok().flatten()
    }

    // ── Queue ────────────────────────────────────────────────────────

    pub fn pending_changes(&self) -> Result<Vec<PendingChange>, CoreError> {
        Ok(self
            .store
            .get_json(PENDING_CHANGES_KEY)?
            .unwrap_or_default())
    }

    /// Append a change and return it.
    pub fn enqueue(
        &self,
        kind: ChangeKind,
        entity: EntityKind,
        data: Value,
    ) -> Result<PendingChange, CoreError> {
        let change = PendingChange {
            id: Uuid::new_v4(),
            kind,
            entity,
            data,
            timestamp: Utc::now(),
        };

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut queue = self.pending_changes()?;
        queue.push(change.clone());
        self.store.set_json(PENDING_CHANGES_KEY, &queue)?;
        info!(id = %change.id, %kind, %entity, queued = queue.len(), "change queued offline");
        Ok(change)
    }

    /// Returns `false` if no change had that id.
    pub fn remove_pending_change(&self, id: Uuid) -> Result<bool, CoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut queue = self.pending_changes()?;
        let before = queue.len();
        queue.retain(|c| c.id != id);
        if queue.len() == before {
            return Ok(false);
        }
        self.store.set_json(PENDING_CHANGES_KEY, &queue)?;
        Ok(true)
    }

    /// Remove every mirror, the last-sync time and the queue.
    pub fn clear_all(&self) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        for kind in MirrorKind::iter() {
            self.store.remove(&kind.key())?;
        }
        self.store.remove(LAST_SYNC_KEY)?;
        self.store.remove(PENDING_CHANGES_KEY)?;
        info!("offline data cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use motorlog_api::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn offline() -> (Arc<MemoryStore>, OfflineStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), OfflineStore::new(store))
    }

    fn vehicle(id: u64, brand: &str) -> Vehicle {
        Vehicle {
            id: id.into(),
            brand: brand.into(),
            ..Vehicle::default()
        }
    }

    #[test]
    fn mirror_keys() {
        assert_eq!(MirrorKind::Vehicles.key(), "offline:vehicles");
        assert_eq!(MirrorKind::ServiceHistory.key(), "offline:service_history");
        assert_eq!(MirrorKind::User.key(), "offline:user");
    }

    #[test]
    fn save_and_load_round_trip_sets_last_sync() {
        let (_, offline) = offline();
        assert!(offline.last_sync().is_none());

        offline.save(&vec![vehicle(1, "Toyota")]).unwrap();
        let loaded = offline.load::<Vec<Vehicle>>().unwrap();

        assert_eq!(loaded.data[0].brand, "Toyota");
        assert_eq!(offline.last_sync(), Some(loaded.saved_at));
    }

    #[test]
    fn upsert_and_remove() {
        let (_, offline) = offline();
        // No mirror yet: optimistic updates are skipped.
        offline.upsert(&vehicle(1, "Toyota")).unwrap();
        assert!(offline.load::<Vec<Vehicle>>().is_none());

        offline.save(&vec![vehicle(1, "Toyota")]).unwrap();
        offline.upsert(&vehicle(1, "Lexus")).unwrap();
        offline.upsert(&vehicle(2, "Mazda")).unwrap();
        let brands: Vec<String> = offline
            .load::<Vec<Vehicle>>()
            .unwrap()
            .data
            .into_iter()
            .map(|v| v.brand)
            .collect();
        assert_eq!(brands, ["Lexus", "Mazda"]);

        offline.remove::<Vehicle>(&EntityId::from(1_u64)).unwrap();
        assert_eq!(offline.load::<Vec<Vehicle>>().unwrap().data.len(), 1);
    }

    #[test]
    fn corrupt_mirror_reads_as_missing() {
        let (store, offline) = offline();
        store.set("offline:vehicles", "{not json").unwrap();
        assert!(offline.load::<Vec<Vehicle>>().is_none());
    }

    #[test]
    fn queue_wire_format() {
        let (store, offline) = offline();
        let change = offline
            .enqueue(ChangeKind::Create, EntityKind::ServiceRecord, json!({ "mileage": 1200 }))
            .unwrap();

        let raw: Value = serde_json::from_str(&store.get(PENDING_CHANGES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw[0]["id"], change.id.to_string());
        assert_eq!(raw[0]["type"], "create");
        assert_eq!(raw[0]["entity"], "service_record");
        assert_eq!(raw[0]["data"]["mileage"], 1200);
    }

    #[test]
    fn remove_pending_change() {
        let (_, offline) = offline();
        let a = offline.enqueue(ChangeKind::Delete, EntityKind::Vehicle, json!({ "id": 3 })).unwrap();
        let b = offline.enqueue(ChangeKind::Update, EntityKind::Reminder, json!({ "id": 4 })).unwrap();

        assert!(offline.remove_pending_change(a.id).unwrap());
        assert!(!offline.remove_pending_change(a.id).unwrap());
        assert_eq!(offline.pending_changes().unwrap(), vec![b]);
    }

    #[test]
    fn clear_all_removes_everything() {
        let (store, offline) = offline();
        offline.save(&vec![vehicle(1, "Toyota")]).unwrap();
        offline.save(&User::default()).unwrap();
        offline.enqueue(ChangeKind::Create, EntityKind::Expense, json!({})).unwrap();
        store.set("auth_token", "keep-me").unwrap();

        offline.clear_all().unwrap();

        assert!(offline.load::<Vec<Vehicle>>().is_none());
        assert!(offline.load::<User>().is_none());
        assert!(offline.last_sync().is_none());
        assert!(offline.pending_changes().unwrap().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn fetched_staleness() {
        assert!(!Fetched::live(1).is_stale());
        assert!(!Fetched::guest(1).is_stale());
        let mirrored = Fetched::mirror(vec![1, 2], Utc::now()).map(|v| v.len());
        assert!(mirrored.is_stale());
        assert_eq!(mirrored.data, 2);
    }

    #[test]
    fn connectivity_defaults_online() {
        let c = Connectivity::default();
        assert!(c.is_online());
        assert!(c.set_online(false));
        assert!(!c.is_online());
    }
}
