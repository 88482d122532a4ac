use serde_json::Value;

use crate::client::ApiClient;
use crate::entity_id::EntityId;
use crate::error::Error;
use crate::models::{ApiResponse, Reminder, ReminderInput};
use crate::routes;

impl ApiClient {
    pub async fn list_reminders(&self) -> Result<ApiResponse<Vec<Reminder>>, Error> {
        self.get(routes::REMINDERS.path()).await
    }

    pub async fn create_reminder(
        &self,
        input: &ReminderInput,
    ) -> Result<ApiResponse<Reminder>, Error> {
        self.post(routes::REMINDERS.path(), input).await
    }

    pub async fn update_reminder(
        &self,
        id: &EntityId,
        input: &ReminderInput,
    ) -> Result<ApiResponse<Reminder>, Error> {
        self.put(routes::REMINDERS.child(id), input).await
    }

    pub async fn delete_reminder(&self, id: &EntityId) -> Result<ApiResponse<Value>, Error> {
        self.delete(routes::REMINDERS.child(id)).await
    }
}
