// motorlog-core: offline-aware client layer for the motorlog backend.
//
// `Garage` is the entry point: it owns the session, the API client, the
// reference-dictionary cache and the offline mirrors, and exposes the
// operations screens call.

pub mod banner;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod garage;
pub mod offline;
pub mod stamped;

pub use banner::{BANNER_DURATION, BANNER_MESSAGE, ErrorBanner};
pub use config::{ClientConfig, TlsVerification};
pub use dictionary::{CacheSource, DictionaryCache, DictionaryLookup};
pub use error::CoreError;
pub use garage::Garage;
pub use offline::{
    ChangeKind, Connectivity, DataSource, EntityKind, Fetched, MirrorKind, OfflineStore,
    PendingChange,
};
pub use stamped::Stamped;

// Re-exported so consumers need only this crate.
pub use motorlog_api::{
    ApiErrorEvent, ApiResponse, BridgeEvent, DictionaryItem, DictionaryResource, EntityId,
    EventBridge, Expense, ExpenseInput, FieldErrors, FileStore, KeyValueStore, MemoryStore,
    Pagination, ProfileUpdate, Registration, Reminder, ReminderInput, ServiceRecord,
    ServiceRecordInput, ServiceStation, Session, SocialProvider, Statistics, StatisticsPeriod,
    Topic, User, Vehicle, VehicleInput,
};
