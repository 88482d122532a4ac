use serde_json::Value;

use crate::client::ApiClient;
use crate::entity_id::EntityId;
use crate::error::Error;
use crate::models::{ApiResponse, Vehicle, VehicleInput};
use crate::routes;

impl ApiClient {
    pub async fn list_vehicles(&self) -> Result<ApiResponse<Vec<Vehicle>>, Error> {
        self.get(routes::VEHICLES.path()).await
    }

    pub async fn get_vehicle(&self, id: &EntityId) -> Result<ApiResponse<Vehicle>, Error> {
        self.get(routes::VEHICLES.child(id)).await
    }

    pub async fn create_vehicle(&self, input: &VehicleInput) -> Result<ApiResponse<Vehicle>, Error> {
        self.post(routes::VEHICLES.path(), input).await
    }

    pub async fn update_vehicle(
        &self,
        id: &EntityId,
        input: &VehicleInput,
    ) -> Result<ApiResponse<Vehicle>, Error> {
        self.put(routes::VEHICLES.child(id), input).await
    }

    pub async fn delete_vehicle(&self, id: &EntityId) -> Result<ApiResponse<Value>, Error> {
        self.delete(routes::VEHICLES.child(id)).await
    }
}
