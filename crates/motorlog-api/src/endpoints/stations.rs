use serde::Serialize;

use crate::client::{ApiClient, ApiRequest};
use crate::entity_id::EntityId;
use crate::error::Error;
use crate::models::{ApiResponse, ServiceStation};
use crate::routes;

impl ApiClient {
    /// Stations within `radius_km` of a point.
    pub async fn list_service_stations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: u32,
    ) -> Result<ApiResponse<Vec<ServiceStation>>, Error> {
        let request = ApiRequest::get(routes::SERVICE_STATIONS.path())
            .query("lat", latitude)
            .query("lng", longitude)
            .query("radius", radius_km);
        self.execute(request).await
    }

    /// Stations the user bookmarked.
    pub async fn list_user_stations(&self) -> Result<ApiResponse<Vec<ServiceStation>>, Error> {
        self.get(routes::USER_STATIONS.path()).await
    }

    pub async fn save_user_station(
        &self,
        station_id: &EntityId,
    ) -> Result<ApiResponse<ServiceStation>, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            station_id: &'a EntityId,
        }

        self.post(routes::USER_STATIONS.path(), &Body { station_id })
            .await
    }
}
