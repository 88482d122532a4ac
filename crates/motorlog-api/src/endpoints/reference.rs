// Reference dictionaries (expense types, reminder types, manual and
// advice sections). Public routes; the response depends on the locale.

use crate::client::{ApiClient, ApiRequest};
use crate::error::Error;
use crate::models::{ApiResponse, DictionaryItem};
use crate::routes::{self, Route};

/// A slowly-changing reference list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum DictionaryResource {
    ExpenseTypes,
    ReminderTypes,
    ManualSections,
    AdviceSections,
}

impl DictionaryResource {
    pub fn route(self) -> Route {
        match self {
            Self::ExpenseTypes => routes::EXPENSE_TYPES,
            Self::ReminderTypes => routes::REMINDER_TYPES,
            Self::ManualSections => routes::MANUAL_SECTIONS,
            Self::AdviceSections => routes::ADVICE_SECTIONS,
        }
    }
}

impl ApiClient {
    pub async fn get_dictionary(
        &self,
        resource: DictionaryResource,
        locale: &str,
    ) -> Result<ApiResponse<Vec<DictionaryItem>>, Error> {
        self.execute(ApiRequest::get(resource.route().path()).query("lang", locale))
            .await
    }
}
