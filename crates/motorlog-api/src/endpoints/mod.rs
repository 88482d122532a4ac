// Typed endpoint methods, one module per backend resource. Each module
// adds inherent methods to `ApiClient`.

pub mod auth;
pub mod expenses;
pub mod history;
pub mod reference;
pub mod reminders;
pub mod stations;
pub mod user;
pub mod vehicles;
