// motorlog-api: async client for the motorlog vehicle-maintenance backend.
//
// Request dispatch, session state, guest-mode gating and the error event
// bridge. Caching and offline fallback live in `motorlog-core`.

pub mod client;
pub mod endpoints;
pub mod entity_id;
pub mod error;
pub mod events;
pub mod models;
pub mod routes;
pub mod session;
pub mod storage;
pub mod transport;

pub use client::{ApiClient, ApiRequest, Reply};
pub use endpoints::auth::SocialProvider;
pub use endpoints::reference::DictionaryResource;
pub use entity_id::EntityId;
pub use error::{Error, FieldErrors};
pub use events::{ApiErrorEvent, BridgeEvent, EventBridge, ListenerId, Topic};
pub use models::*;
pub use routes::{Access, EmptyShape, GateDecision, Route};
pub use session::Session;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreExt};
pub use transport::{TlsMode, TransportConfig};
