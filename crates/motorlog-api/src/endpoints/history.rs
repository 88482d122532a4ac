// Service history endpoints.

use serde_json::Value;

use crate::client::{ApiClient, ApiRequest};
use crate::entity_id::EntityId;
use crate::error::Error;
use crate::models::{ApiResponse, ServiceRecord, ServiceRecordInput};
use crate::routes;

impl ApiClient {
    /// Service records across all of the user's vehicles.
    pub async fn list_service_history(&self) -> Result<ApiResponse<Vec<ServiceRecord>>, Error> {
        self.get(routes::SERVICE_HISTORY.path()).await
    }

    /// Service records of a single vehicle.
    pub async fn list_vehicle_service_history(
        &self,
        vehicle_id: &EntityId,
    ) -> Result<ApiResponse<Vec<ServiceRecord>>, Error> {
        self.execute(ApiRequest::get(routes::SERVICE_HISTORY.path()).query("vehicle_id", vehicle_id))
            .await
    }

    pub async fn create_service_record(
        &self,
        input: &ServiceRecordInput,
    ) -> Result<ApiResponse<ServiceRecord>, Error> {
        self.post(routes::SERVICE_HISTORY.path(), input).await
    }

    pub async fn delete_service_record(&self, id: &EntityId) -> Result<ApiResponse<Value>, Error> {
        self.delete(routes::SERVICE_HISTORY.child(id)).await
    }
}
