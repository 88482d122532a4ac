// Wire types for the motorlog backend.
//
// The backend is authoritative; these are the client's shadow of its
// records. Every payload type derives `Default` with `#[serde(default)]`
// so partial records and the guest gate's empty `{}` decode cleanly.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity_id::EntityId;

// ── Envelopes ────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

/// `{ data, success, message?, pagination? }` envelope around every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub data: T,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Set when the guest-mode gate answered instead of the backend.
    #[serde(skip)]
    pub short_circuited: bool,
}

/// Page metadata on paginated list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    pub has_more: bool,
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Body of a successful login / registration / social sign-in.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// New-account request.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ── User ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

// ── Vehicles ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    pub id: EntityId,
    pub brand: String,
    pub model: String,
    pub year: Option<u16>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub mileage: Option<u32>,
    pub fuel_type: Option<String>,
    pub color: Option<String>,
    pub photo_url: Option<String>,
}

/// Create/update body for a vehicle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VehicleInput {
    pub brand: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ── Reminders ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reminder {
    pub id: EntityId,
    pub vehicle_id: EntityId,
    pub reminder_type_id: Option<EntityId>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_mileage: Option<u32>,
    pub repeat_interval_days: Option<u32>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderInput {
    pub vehicle_id: EntityId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_type_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_interval_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

// ── Service history ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRecord {
    pub id: EntityId,
    pub vehicle_id: EntityId,
    pub service_type: String,
    pub description: Option<String>,
    pub performed_at: Option<NaiveDate>,
    pub mileage: Option<u32>,
    pub cost: Option<f64>,
    pub currency: Option<String>,
    pub station_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceRecordInput {
    pub vehicle_id: EntityId,
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
}

// ── Expenses & statistics ────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expense {
    pub id: EntityId,
    pub vehicle_id: EntityId,
    pub expense_type_id: Option<EntityId>,
    pub amount: f64,
    pub currency: Option<String>,
    pub spent_at: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseInput {
    pub vehicle_id: EntityId,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_type_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Spending report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_spent: f64,
    pub currency: Option<String>,
    pub by_category: Vec<CategoryTotal>,
    pub by_month: Vec<MonthTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthTotal {
    /// `YYYY-MM`.
    pub month: String,
    pub amount: f64,
}

/// Reporting window for [`Statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StatisticsPeriod {
    Month,
    Quarter,
    #[default]
    Year,
    All,
}

// ── Service stations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceStation {
    pub id: EntityId,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub rating: Option<f32>,
    pub distance_km: Option<f64>,
}

// ── Reference dictionaries ───────────────────────────────────────────

/// One entry of a reference list (expense type, reminder type, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryItem {
    pub id: EntityId,
    pub name: String,
    pub slug: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_defaults() {
        let resp: ApiResponse<Vec<Vehicle>> = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(resp.success);
        assert!(resp.data.is_empty());
        assert!(!resp.short_circuited);
    }

    #[test]
    fn empty_object_decodes_to_default_record() {
        let resp: ApiResponse<User> =
            serde_json::from_value(json!({ "data": {}, "success": true })).unwrap();
        assert_eq!(resp.data, User::default());
    }

    #[test]
    fn paginated_envelope() {
        let resp: ApiResponse<Vec<Expense>> = serde_json::from_value(json!({
            "data": [{ "id": 1, "vehicle_id": 3, "amount": 42.5 }],
            "success": true,
            "pagination": {
                "current_page": 1, "per_page": 20, "total": 41,
                "last_page": 3, "has_more": true
            }
        }))
        .unwrap();
        let page = resp.pagination.unwrap();
        assert_eq!(page.last_page, 3);
        assert!(page.has_more);
        assert!((resp.data[0].amount - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn auth_payload_debug_redacts_token() {
        let payload = AuthPayload {
            token: "secret-token".into(),
            user: User::default(),
        };
        assert!(!format!("{payload:?}").contains("secret-token"));
    }

    #[test]
    fn statistics_period_names() {
        assert_eq!(StatisticsPeriod::Quarter.to_string(), "quarter");
        assert_eq!("all".parse::<StatisticsPeriod>().unwrap(), StatisticsPeriod::All);
    }
}
