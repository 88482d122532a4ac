// ── Garage: the client facade ──
//
// One handle per signed-in device. Every public operation goes through
// the API client (and so through the guest gate and the error bridge);
// list reads write through to the offline mirrors and fall back to them
// on failure, mutations update the mirrors optimistically or queue a
// pending change when the host reports it is offline.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use motorlog_api::{
    ApiClient, ApiResponse, DictionaryItem, DictionaryResource, EntityId, EventBridge, Expense,
    ExpenseInput, KeyValueStore, ProfileUpdate, Registration, Reminder, ReminderInput,
    ServiceRecord, ServiceRecordInput, ServiceStation, Session, SocialProvider, Statistics,
    StatisticsPeriod, User, Vehicle, VehicleInput,
};

use crate::config::ClientConfig;
use crate::dictionary::{DictionaryCache, DictionaryLookup};
use crate::error::CoreError;
use crate::offline::{
    ChangeKind, Connectivity, EntityKind, Fetched, Identified, Mirrored, OfflineStore,
    PendingChange,
};

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<GarageInner>`. Owns the session, the API
/// client, the dictionary cache and the offline store for one backend.
#[derive(Clone)]
pub struct Garage {
    inner: Arc<GarageInner>,
}

struct GarageInner {
    config: ClientConfig,
    client: Arc<ApiClient>,
    offline: OfflineStore,
    dictionaries: DictionaryCache,
    connectivity: Connectivity,
}

impl Garage {
    /// Build a garage on top of `store` and restore the persisted session.
    /// No network traffic happens here.
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let session = Arc::new(Session::new(Arc::clone(&store)));
        session.restore()?;
        let events = Arc::new(EventBridge::new());

        let client = Arc::new(ApiClient::new(
            config.base_url.clone(),
            &config.api_key,
            &config.transport(),
            session,
            events,
        )?);

        let dictionaries = DictionaryCache::new(
            Arc::clone(&client),
            Arc::clone(&store),
            config.dictionary_max_age,
        );

        Ok(Self {
            inner: Arc::new(GarageInner {
                config,
                client,
                offline: OfflineStore::new(store),
                dictionaries,
                connectivity: Connectivity::default(),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.inner.client
    }

    pub fn session(&self) -> &Arc<Session> {
        self.inner.client.session()
    }

    /// The `API_ERROR` bridge. Subscribe here to surface failures.
    pub fn events(&self) -> &Arc<EventBridge> {
        self.inner.client.events()
    }

    pub fn offline(&self) -> &OfflineStore {
        &self.inner.offline
    }

    // ── Session ──────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, CoreError> {
        let user = self.inner.client.login(email, password).await?;
        self.mirror(&user);
        Ok(user)
    }

    pub async fn register(&self, registration: &Registration) -> Result<User, CoreError> {
        let user = self.inner.client.register(registration).await?;
        self.mirror(&user);
        Ok(user)
    }

    pub async fn social_login(
        &self,
        provider: SocialProvider,
        access_token: &SecretString,
    ) -> Result<User, CoreError> {
        let user = self.inner.client.social_login(provider, access_token).await?;
        self.mirror(&user);
        Ok(user)
    }

    /// Sign out. Mirrors and queued changes are kept; see
    /// [`clear_all_data`](Self::clear_all_data).
    pub async fn logout(&self) -> Result<(), CoreError> {
        self.inner.client.logout().await?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn is_guest(&self) -> bool {
        self.session().is_guest()
    }

    /// Browse without an account. Protected requests answer empty.
    pub fn enter_guest_mode(&self) -> Result<(), CoreError> {
        self.session().set_guest_mode(true)?;
        Ok(())
    }

    pub fn exit_guest_mode(&self) -> Result<(), CoreError> {
        self.session().set_guest_mode(false)?;
        Ok(())
    }

    /// Re-read the persisted token, e.g. after another process wrote it.
    pub fn reload_session(&self) -> Result<(), CoreError> {
        self.session().reload()?;
        Ok(())
    }

    // ── User ─────────────────────────────────────────────────────────

    pub async fn get_user(&self) -> Result<Fetched<User>, CoreError> {
        self.mirrored(self.inner.client.get_user()).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, CoreError> {
        let resp = self.inner.client.update_profile(update).await?;
        if !resp.short_circuited {
            self.mirror(&resp.data);
        }
        Ok(resp.data)
    }

    // ── Vehicles ─────────────────────────────────────────────────────

    pub async fn get_vehicles(&self) -> Result<Fetched<Vec<Vehicle>>, CoreError> {
        self.mirrored(self.inner.client.list_vehicles()).await
    }

    /// One vehicle; falls back to its entry in the vehicles mirror.
    pub async fn get_vehicle(&self, id: &EntityId) -> Result<Fetched<Vehicle>, CoreError> {
        match self.inner.client.get_vehicle(id).await {
            Ok(resp) if resp.short_circuited => Ok(Fetched::guest(resp.data)),
            Ok(resp) => Ok(Fetched::live(resp.data)),
            Err(err) => self.find_in_mirror(id).ok_or_else(|| err.into()),
        }
    }

    pub async fn add_vehicle(&self, input: &VehicleInput) -> Result<Vehicle, CoreError> {
        self.guard_offline(ChangeKind::Create, EntityKind::Vehicle, None, input)?;
        let resp = self.inner.client.create_vehicle(input).await?;
        Ok(self.upsert_mirror(resp))
    }

    pub async fn update_vehicle(
        &self,
        id: &EntityId,
        input: &VehicleInput,
    ) -> Result<Vehicle, CoreError> {
        self.guard_offline(ChangeKind::Update, EntityKind::Vehicle, Some(id), input)?;
        let resp = self.inner.client.update_vehicle(id, input).await?;
        Ok(self.upsert_mirror(resp))
    }

    pub async fn delete_vehicle(&self, id: &EntityId) -> Result<(), CoreError> {
        self.guard_offline(ChangeKind::Delete, EntityKind::Vehicle, Some(id), &())?;
        let resp = self.inner.client.delete_vehicle(id).await?;
        self.remove_from_mirror::<Vehicle>(id, &resp);
        Ok(())
    }

    // ── Reminders ────────────────────────────────────────────────────

    pub async fn get_reminders(&self) -> Result<Fetched<Vec<Reminder>>, CoreError> {
        self.mirrored(self.inner.client.list_reminders()).await
    }

    pub async fn create_reminder(&self, input: &ReminderInput) -> Result<Reminder, CoreError> {
        self.guard_offline(ChangeKind::Create, EntityKind::Reminder, None, input)?;
        let resp = self.inner.client.create_reminder(input).await?;
        Ok(self.upsert_mirror(resp))
    }

    pub async fn update_reminder(
        &self,
        id: &EntityId,
        input: &ReminderInput,
    ) -> Result<Reminder, CoreError> {
        self.guard_offline(ChangeKind::Update, EntityKind::Reminder, Some(id), input)?;
        let resp = self.inner.client.update_reminder(id, input).await?;
        Ok(self.upsert_mirror(resp))
    }

    pub async fn delete_reminder(&self, id: &EntityId) -> Result<(), CoreError> {
        self.guard_offline(ChangeKind::Delete, EntityKind::Reminder, Some(id), &())?;
        let resp = self.inner.client.delete_reminder(id).await?;
        self.remove_from_mirror::<Reminder>(id, &resp);
        Ok(())
    }

    // ── Service history ──────────────────────────────────────────────

    pub async fn get_service_history(&self) -> Result<Fetched<Vec<ServiceRecord>>, CoreError> {
        self.mirrored(self.inner.client.list_service_history()).await
    }

    /// Records of one vehicle. Not mirrored on its own; on failure the
    /// full service-history mirror is filtered by vehicle.
    pub async fn get_vehicle_service_history(
        &self,
        vehicle_id: &EntityId,
    ) -> Result<Fetched<Vec<ServiceRecord>>, CoreError> {
        match self.inner.client.list_vehicle_service_history(vehicle_id).await {
            Ok(resp) if resp.short_circuited => Ok(Fetched::guest(resp.data)),
            Ok(resp) => Ok(Fetched::live(resp.data)),
            Err(err) => match self.inner.offline.load::<Vec<ServiceRecord>>() {
                Some(entry) => {
                    let records = entry
                        .data
                        .into_iter()
                        .filter(|r| &r.vehicle_id == vehicle_id)
                        .collect();
                    Ok(Fetched::mirror(records, entry.saved_at))
                }
                None => Err(err.into()),
            },
        }
    }

    pub async fn add_service_record(
        &self,
        input: &ServiceRecordInput,
    ) -> Result<ServiceRecord, CoreError> {
        self.guard_offline(ChangeKind::Create, EntityKind::ServiceRecord, None, input)?;
        let resp = self.inner.client.create_service_record(input).await?;
        Ok(self.upsert_mirror(resp))
    }

    pub async fn delete_service_record(&self, id: &EntityId) -> Result<(), CoreError> {
        self.guard_offline(ChangeKind::Delete, EntityKind::ServiceRecord, Some(id), &())?;
        let resp = self.inner.client.delete_service_record(id).await?;
        self.remove_from_mirror::<ServiceRecord>(id, &resp);
        Ok(())
    }

    // ── Expenses & statistics ────────────────────────────────────────

    /// One page of expenses with its pagination block.
    pub async fn get_expenses(
        &self,
        page: u32,
        vehicle_id: Option<&EntityId>,
    ) -> Result<ApiResponse<Vec<Expense>>, CoreError> {
        Ok(self.inner.client.list_expenses(page, vehicle_id).await?)
    }

    pub async fn add_expense(&self, input: &ExpenseInput) -> Result<Expense, CoreError> {
        self.guard_offline(ChangeKind::Create, EntityKind::Expense, None, input)?;
        Ok(self.inner.client.create_expense(input).await?.data)
    }

    pub async fn get_statistics(
        &self,
        vehicle_id: Option<&EntityId>,
        period: StatisticsPeriod,
    ) -> Result<Statistics, CoreError> {
        Ok(self.inner.client.get_statistics(vehicle_id, period).await?.data)
    }

    // ── Service stations ─────────────────────────────────────────────

    pub async fn get_service_stations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: u32,
    ) -> Result<Vec<ServiceStation>, CoreError> {
        Ok(self
            .inner
            .client
            .list_service_stations(latitude, longitude, radius_km)
            .await?
            .data)
    }

    pub async fn get_user_stations(&self) -> Result<Vec<ServiceStation>, CoreError> {
        Ok(self.inner.client.list_user_stations().await?.data)
    }

    pub async fn save_user_station(&self, station_id: &EntityId) -> Result<ServiceStation, CoreError> {
        Ok(self.inner.client.save_user_station(station_id).await?.data)
    }

    // ── Dictionaries ─────────────────────────────────────────────────

    /// Look up a dictionary in the configured locale.
    pub async fn dictionary(
        &self,
        resource: DictionaryResource,
    ) -> Result<DictionaryLookup, CoreError> {
        self.inner
            .dictionaries
            .lookup(resource, &self.inner.config.locale)
            .await
    }

    pub async fn expense_types(&self) -> Result<Vec<DictionaryItem>, CoreError> {
        Ok(self.dictionary(DictionaryResource::ExpenseTypes).await?.items)
    }

    pub async fn reminder_types(&self) -> Result<Vec<DictionaryItem>, CoreError> {
        Ok(self.dictionary(DictionaryResource::ReminderTypes).await?.items)
    }

    pub async fn manual_sections(&self) -> Result<Vec<DictionaryItem>, CoreError> {
        Ok(self.dictionary(DictionaryResource::ManualSections).await?.items)
    }

    pub async fn advice_sections(&self) -> Result<Vec<DictionaryItem>, CoreError> {
        Ok(self.dictionary(DictionaryResource::AdviceSections).await?.items)
    }

    // ── Offline state ────────────────────────────────────────────────

    pub fn is_online(&self) -> bool {
        self.inner.connectivity.is_online()
    }

    /// Record the host's connectivity. While offline, mutations are queued
    /// instead of sent.
    pub fn set_online(&self, online: bool) {
        let was = self.inner.connectivity.set_online(online);
        if was != online {
            debug!(online, "connectivity changed");
        }
    }

    pub fn pending_changes(&self) -> Result<Vec<PendingChange>, CoreError> {
        self.inner.offline.pending_changes()
    }

    pub fn remove_pending_change(&self, id: Uuid) -> Result<bool, CoreError> {
        self.inner.offline.remove_pending_change(id)
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.inner.offline.last_sync()
    }

    /// Wipe mirrors, last-sync time and the pending queue. The session
    /// and dictionary cache are untouched.
    pub fn clear_all_data(&self) -> Result<(), CoreError> {
        self.inner.offline.clear_all()
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Live fetch with write-through; mirror on failure.
    async fn mirrored<T, F>(&self, fetch: F) -> Result<Fetched<T>, CoreError>
    where
        T: Mirrored,
        F: Future<Output = Result<ApiResponse<T>, motorlog_api::Error>>,
    {
        match fetch.await {
            Ok(resp) if resp.short_circuited => Ok(Fetched::guest(resp.data)),
            Ok(resp) => {
                self.mirror(&resp.data);
                Ok(Fetched::live(resp.data))
            }
            Err(err) => match self.inner.offline.load::<T>() {
                Some(entry) => {
                    debug!(mirror = %T::KIND, saved_at = %entry.saved_at, error = %err, "serving offline mirror");
                    Ok(Fetched::mirror(entry.data, entry.saved_at))
                }
                None => Err(err.into()),
            },
        }
    }

    /// Overwrite a mirror. Storage failures are logged, not returned.
    fn mirror<T: Mirrored>(&self, data: &T) {
        if let Err(e) = self.inner.offline.save(data) {
            warn!(mirror = %T::KIND, error = %e, "failed to update offline mirror");
        }
    }

    fn upsert_mirror<R>(&self, resp: ApiResponse<R>) -> R
    where
        R: Identified + Clone,
        Vec<R>: Mirrored,
    {
        if !resp.short_circuited {
            if let Err(e) = self.inner.offline.upsert(&resp.data) {
                warn!(error = %e, "failed to update offline mirror");
            }
        }
        resp.data
    }

    fn remove_from_mirror<R>(&self, id: &EntityId, resp: &ApiResponse<Value>)
    where
        R: Identified,
        Vec<R>: Mirrored,
    {
        if resp.short_circuited {
            return;
        }
        if let Err(e) = self.inner.offline.remove::<R>(id) {
            warn!(%id, error = %e, "failed to update offline mirror");
        }
    }

    fn find_in_mirror(&self, id: &EntityId) -> Option<Fetched<Vehicle>> {
        let entry = self.inner.offline.load::<Vec<Vehicle>>()?;
        let vehicle = entry.data.into_iter().find(|v| &v.id == id)?;
        Some(Fetched::mirror(vehicle, entry.saved_at))
    }

    /// While offline, queue the change and fail with `QueuedOffline`.
    fn guard_offline(
        &self,
        kind: ChangeKind,
        entity: EntityKind,
        id: Option<&EntityId>,
        body: &impl Serialize,
    ) -> Result<(), CoreError> {
        if self.is_online() {
            return Ok(());
        }

        let mut data = serde_json::to_value(body).map_err(|e| CoreError::UnexpectedResponse {
            message: format!("cannot record offline change: {e}"),
        })?;
        if let Some(id) = id {
            let id = serde_json::to_value(id).unwrap_or(Value::Null);
            if let Value::Object(map) = &mut data {
                map.insert("id".into(), id);
            } else {
                data = serde_json::json!({ "id": id });
            }
        }

        let change = self.inner.offline.enqueue(kind, entity, data)?;
        Err(CoreError::QueuedOffline {
            change_id: change.id,
        })
    }
}

impl std::fmt::Debug for Garage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Garage")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("session", self.session())
            .field("online", &self.is_online())
            .finish_non_exhaustive()
    }
}
